use crate::middlewares::current_user;
use crate::models::*;
use crate::services::SubscriptionService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/subscriptions",
    tag = "subscription",
    request_body = CreateSubscriptionRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "购买成功", body = PurchaseResponse),
        (status = 403, description = "无权为其他用户购买"),
        (status = 404, description = "套餐或用户不存在")
    )
)]
pub async fn purchase(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    request: web::Json<CreateSubscriptionRequest>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match subscription_service
        .purchase(caller.id, request.into_inner())
        .await
    {
        Ok(resp) => Ok(HttpResponse::Created().json(json!({"success": true, "data": resp}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions",
    tag = "subscription",
    params(
        ("user_id" = Option<i32>, Query, description = "仅管理员可查询他人"),
        ("type" = Option<String>, Query, description = "hotspot / home_internet"),
        ("status" = Option<String>, Query, description = "active / expired"),
        ("page" = Option<u64>, Query, description = "页码"),
        ("page_size" = Option<u64>, Query, description = "每页数量")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "订阅列表"),
        (status = 403, description = "无权查看")
    )
)]
pub async fn list_subscriptions(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    query: web::Query<SubscriptionQuery>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match subscription_service.list(caller.id, &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": page}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions/{id}",
    tag = "subscription",
    params(("id" = i32, Path, description = "订阅 ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "订阅详情", body = SubscriptionResponse),
        (status = 404, description = "订阅不存在")
    )
)]
pub async fn get_subscription(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match subscription_service.get(caller.id, path.into_inner()).await {
        Ok(sub) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": sub}))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn subscription_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscriptions")
            .route("", web::post().to(purchase))
            .route("", web::get().to(list_subscriptions))
            .route("/{id}", web::get().to(get_subscription)),
    );
}
