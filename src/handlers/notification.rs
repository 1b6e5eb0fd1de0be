use crate::middlewares::current_user;
use crate::models::*;
use crate::services::NotificationService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/notifications",
    tag = "notification",
    params(
        ("status" = Option<String>, Query, description = "unread / read"),
        ("page" = Option<u64>, Query, description = "页码"),
        ("page_size" = Option<u64>, Query, description = "每页数量")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "通知列表，按时间倒序")
    )
)]
pub async fn list_notifications(
    notification_service: web::Data<NotificationService>,
    req: HttpRequest,
    query: web::Query<NotificationQuery>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match notification_service.list(caller.id, &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": page}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/notifications/unread-count",
    tag = "notification",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "未读数量", body = CountResponse)
    )
)]
pub async fn unread_count(
    notification_service: web::Data<NotificationService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match notification_service.unread_count(caller.id).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": resp}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/notifications/{id}",
    tag = "notification",
    params(("id" = i32, Path, description = "通知 ID")),
    request_body = UpdateNotificationRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "更新成功", body = NotificationResponse),
        (status = 400, description = "状态只能是 read / unread"),
        (status = 404, description = "通知不存在")
    )
)]
pub async fn mark_notification(
    notification_service: web::Data<NotificationService>,
    req: HttpRequest,
    path: web::Path<i32>,
    request: web::Json<UpdateNotificationRequest>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match notification_service
        .mark(caller.id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(resp) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": resp}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/notifications/read-all",
    tag = "notification",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "全部标记已读", body = CountResponse)
    )
)]
pub async fn mark_all_read(
    notification_service: web::Data<NotificationService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match notification_service.mark_all_read(caller.id).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": resp}))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn notification_config(cfg: &mut web::ServiceConfig) {
    // 固定路径需在 /{id} 之前注册
    cfg.service(
        web::scope("/notifications")
            .route("", web::get().to(list_notifications))
            .route("/unread-count", web::get().to(unread_count))
            .route("/read-all", web::patch().to(mark_all_read))
            .route("/{id}", web::patch().to(mark_notification)),
    );
}
