use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{
    NotificationChannel, NotificationStatus, NotificationType, SubscriptionStatus, TicketStatus,
    TierType, UserRole, UserStatus,
};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::user::get_profile,
        handlers::user::change_password,
        handlers::user::list_users,
        handlers::user::get_user,
        handlers::user::update_status,
        handlers::user::disconnect,
        handlers::tier::list_tiers,
        handlers::tier::get_tier,
        handlers::tier::create_tier,
        handlers::tier::update_tier,
        handlers::tier::delete_tier,
        handlers::subscription::purchase,
        handlers::subscription::list_subscriptions,
        handlers::subscription::get_subscription,
        handlers::loyalty::get_balance,
        handlers::loyalty::list_all,
        handlers::loyalty::list_redemptions,
        handlers::loyalty::redeem,
        handlers::feedback::create_feedback,
        handlers::feedback::list_feedbacks,
        handlers::feedback::respond_feedback,
        handlers::feedback::create_complaint,
        handlers::feedback::list_complaints,
        handlers::feedback::respond_complaint,
        handlers::notification::list_notifications,
        handlers::notification::unread_count,
        handlers::notification::mark_notification,
        handlers::notification::mark_all_read,
        handlers::communication::send,
    ),
    components(
        schemas(
            UserRole,
            UserStatus,
            TierType,
            SubscriptionStatus,
            TicketStatus,
            NotificationStatus,
            NotificationChannel,
            NotificationType,
            CreateUserRequest,
            LoginRequest,
            RefreshTokenRequest,
            ChangePasswordRequest,
            UpdateUserStatusRequest,
            UserResponse,
            AuthResponse,
            DisconnectResponse,
            CreateTierRequest,
            UpdateTierRequest,
            TierResponse,
            CreateSubscriptionRequest,
            SubscriptionResponse,
            PurchaseResponse,
            LoyaltyResponse,
            RedeemRequest,
            RedemptionResponse,
            RedeemResponse,
            CreateFeedbackRequest,
            CreateComplaintRequest,
            RespondRequest,
            FeedbackResponse,
            ComplaintResponse,
            UpdateNotificationRequest,
            NotificationResponse,
            BroadcastRequest,
            BroadcastResponse,
            CountResponse,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication API"),
        (name = "user", description = "User management API"),
        (name = "tier", description = "Subscription tier catalog API"),
        (name = "subscription", description = "Subscription lifecycle API"),
        (name = "loyalty", description = "Loyalty points API"),
        (name = "feedback", description = "Feedback API"),
        (name = "complaint", description = "Complaint API"),
        (name = "notification", description = "Notification inbox API"),
        (name = "communication", description = "Broadcast messaging API"),
    ),
    info(
        title = "Captive Portal Backend API",
        version = "1.0.0",
        description = "Hotspot and home internet portal REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_engine_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/subscriptions"));
        assert!(paths.contains_key("/loyalty/redeem"));
        assert!(paths.contains_key("/communications/send"));
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
