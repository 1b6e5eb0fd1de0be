use crate::middlewares::current_user;
use crate::models::*;
use crate::services::UserService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/users/me",
    tag = "user",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "获取个人资料成功", body = UserResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_profile(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match user_service.get_profile(caller.id).await {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": user}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/users/me/password",
    tag = "user",
    request_body = ChangePasswordRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "修改密码成功"),
        (status = 400, description = "原密码错误或新密码不合规"),
        (status = 401, description = "未授权")
    )
)]
pub async fn change_password(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    request: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match user_service
        .change_password(caller.id, request.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Password updated"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "user",
    params(
        ("role" = Option<String>, Query, description = "user / admin"),
        ("status" = Option<String>, Query, description = "active / inactive"),
        ("page" = Option<u64>, Query, description = "页码"),
        ("page_size" = Option<u64>, Query, description = "每页数量")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "用户列表"),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn list_users(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match user_service.list_users(caller.id, &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": page}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "user",
    params(("id" = i32, Path, description = "用户 ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "用户详情", body = UserResponse),
        (status = 403, description = "需要管理员权限"),
        (status = 404, description = "用户不存在")
    )
)]
pub async fn get_user(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match user_service.get_user(caller.id, path.into_inner()).await {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": user}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/users/{id}/status",
    tag = "user",
    params(("id" = i32, Path, description = "用户 ID")),
    request_body = UpdateUserStatusRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "状态已更新", body = UserResponse),
        (status = 403, description = "需要管理员权限"),
        (status = 404, description = "用户不存在")
    )
)]
pub async fn update_status(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<i32>,
    request: web::Json<UpdateUserStatusRequest>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match user_service
        .set_status(caller.id, path.into_inner(), request.status)
        .await
    {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": user}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/users/{id}/disconnect",
    tag = "user",
    params(("id" = i32, Path, description = "用户 ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "已断开", body = DisconnectResponse),
        (status = 403, description = "需要管理员权限"),
        (status = 404, description = "用户不存在")
    )
)]
pub async fn disconnect(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match user_service.disconnect(caller.id, path.into_inner()).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": resp}))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(list_users))
            .route("/me", web::get().to(get_profile))
            .route("/me/password", web::put().to(change_password))
            .route("/{id}", web::get().to(get_user))
            .route("/{id}/status", web::patch().to(update_status))
            .route("/{id}/disconnect", web::post().to(disconnect)),
    );
}
