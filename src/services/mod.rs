pub mod auth_service;
pub mod communication_service;
pub mod feedback_service;
pub mod loyalty_service;
pub mod notification_service;
pub mod subscription_service;
pub mod tier_service;
pub mod user_service;

#[cfg(test)]
pub mod test_helpers;

pub use auth_service::AuthService;
pub use communication_service::CommunicationService;
pub use feedback_service::FeedbackService;
pub use loyalty_service::{LoyaltyService, points_for_purchase, points_for_redemption};
pub use notification_service::NotificationService;
pub use subscription_service::SubscriptionService;
pub use tier_service::TierService;
pub use user_service::UserService;
