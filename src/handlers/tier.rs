use crate::middlewares::current_user;
use crate::models::*;
use crate::services::TierService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/tiers",
    tag = "tier",
    params(("type" = Option<String>, Query, description = "hotspot / home_internet")),
    responses(
        (status = 200, description = "套餐列表", body = [TierResponse])
    )
)]
pub async fn list_tiers(
    tier_service: web::Data<TierService>,
    query: web::Query<TierQuery>,
) -> Result<HttpResponse> {
    match tier_service.list(&query).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": list}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/tiers/{id}",
    tag = "tier",
    params(("id" = i32, Path, description = "套餐 ID")),
    responses(
        (status = 200, description = "套餐详情", body = TierResponse),
        (status = 404, description = "套餐不存在")
    )
)]
pub async fn get_tier(
    tier_service: web::Data<TierService>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match tier_service.get(path.into_inner()).await {
        Ok(tier) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": tier}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/tiers",
    tag = "tier",
    request_body = CreateTierRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "创建成功", body = TierResponse),
        (status = 400, description = "请求参数错误"),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn create_tier(
    tier_service: web::Data<TierService>,
    req: HttpRequest,
    request: web::Json<CreateTierRequest>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match tier_service.create(caller.id, request.into_inner()).await {
        Ok(tier) => Ok(HttpResponse::Created().json(json!({"success": true, "data": tier}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/tiers/{id}",
    tag = "tier",
    params(("id" = i32, Path, description = "套餐 ID")),
    request_body = UpdateTierRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "更新成功", body = TierResponse),
        (status = 403, description = "需要管理员权限"),
        (status = 404, description = "套餐不存在")
    )
)]
pub async fn update_tier(
    tier_service: web::Data<TierService>,
    req: HttpRequest,
    path: web::Path<i32>,
    request: web::Json<UpdateTierRequest>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match tier_service
        .update(caller.id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(tier) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": tier}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/tiers/{id}",
    tag = "tier",
    params(("id" = i32, Path, description = "套餐 ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "删除成功"),
        (status = 403, description = "需要管理员权限"),
        (status = 404, description = "套餐不存在"),
        (status = 409, description = "套餐仍被订阅引用")
    )
)]
pub async fn delete_tier(
    tier_service: web::Data<TierService>,
    req: HttpRequest,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match tier_service.delete(caller.id, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Tier deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn tier_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tiers")
            .route("", web::get().to(list_tiers))
            .route("", web::post().to(create_tier))
            .route("/{id}", web::get().to(get_tier))
            .route("/{id}", web::patch().to(update_tier))
            .route("/{id}", web::delete().to(delete_tier)),
    );
}
