use crate::middlewares::current_user;
use crate::models::*;
use crate::services::CommunicationService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/communications/send",
    tag = "communication",
    request_body = BroadcastRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "发送成功", body = BroadcastResponse),
        (status = 400, description = "消息为空或 audience 无效"),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn send(
    communication_service: web::Data<CommunicationService>,
    req: HttpRequest,
    request: web::Json<BroadcastRequest>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match communication_service
        .broadcast(caller.id, request.into_inner())
        .await
    {
        Ok(resp) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": resp}))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn communication_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/communications").route("/send", web::post().to(send)));
}
