use crate::middlewares::current_user;
use crate::models::*;
use crate::services::LoyaltyService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/loyalty",
    tag = "loyalty",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "积分余额", body = LoyaltyResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_balance(
    loyalty_service: web::Data<LoyaltyService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match loyalty_service.get_balance(caller.id).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": resp}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/loyalty/all",
    tag = "loyalty",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("page_size" = Option<u64>, Query, description = "每页数量")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "全部积分账户"),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn list_all(
    loyalty_service: web::Data<LoyaltyService>,
    req: HttpRequest,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match loyalty_service.list_all(caller.id, &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": page}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/loyalty/redemptions",
    tag = "loyalty",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("page_size" = Option<u64>, Query, description = "每页数量")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "兑换记录")
    )
)]
pub async fn list_redemptions(
    loyalty_service: web::Data<LoyaltyService>,
    req: HttpRequest,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match loyalty_service.list_redemptions(caller.id, &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": page}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/loyalty/redeem",
    tag = "loyalty",
    request_body = RedeemRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "兑换成功", body = RedeemResponse),
        (status = 400, description = "积分不足"),
        (status = 404, description = "套餐不存在")
    )
)]
pub async fn redeem(
    loyalty_service: web::Data<LoyaltyService>,
    req: HttpRequest,
    request: web::Json<RedeemRequest>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match loyalty_service.redeem(caller.id, request.into_inner()).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": resp}))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn loyalty_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/loyalty")
            .route("", web::get().to(get_balance))
            .route("/all", web::get().to(list_all))
            .route("/redemptions", web::get().to(list_redemptions))
            .route("/redeem", web::post().to(redeem)),
    );
}
