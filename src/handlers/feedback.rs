use crate::middlewares::current_user;
use crate::models::*;
use crate::services::FeedbackService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/feedbacks",
    tag = "feedback",
    request_body = CreateFeedbackRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "提交成功", body = FeedbackResponse),
        (status = 400, description = "评分须在 1-5 之间"),
        (status = 404, description = "套餐不存在")
    )
)]
pub async fn create_feedback(
    feedback_service: web::Data<FeedbackService>,
    req: HttpRequest,
    request: web::Json<CreateFeedbackRequest>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match feedback_service
        .submit_feedback(caller.id, request.into_inner())
        .await
    {
        Ok(resp) => Ok(HttpResponse::Created().json(json!({"success": true, "data": resp}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/feedbacks",
    tag = "feedback",
    params(
        ("status" = Option<String>, Query, description = "pending / resolved"),
        ("page" = Option<u64>, Query, description = "页码"),
        ("page_size" = Option<u64>, Query, description = "每页数量")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "反馈列表；管理员可见全部")
    )
)]
pub async fn list_feedbacks(
    feedback_service: web::Data<FeedbackService>,
    req: HttpRequest,
    query: web::Query<TicketQuery>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match feedback_service.list_feedbacks(caller.id, &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": page}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/feedbacks/{id}",
    tag = "feedback",
    params(("id" = i32, Path, description = "反馈 ID")),
    request_body = RespondRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "回复成功", body = FeedbackResponse),
        (status = 400, description = "回复内容为空"),
        (status = 403, description = "需要管理员权限"),
        (status = 404, description = "反馈不存在")
    )
)]
pub async fn respond_feedback(
    feedback_service: web::Data<FeedbackService>,
    req: HttpRequest,
    path: web::Path<i32>,
    request: web::Json<RespondRequest>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match feedback_service
        .respond_feedback(caller.id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(resp) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": resp}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/complaints",
    tag = "complaint",
    request_body = CreateComplaintRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "提交成功", body = ComplaintResponse),
        (status = 400, description = "主题和描述不能为空")
    )
)]
pub async fn create_complaint(
    feedback_service: web::Data<FeedbackService>,
    req: HttpRequest,
    request: web::Json<CreateComplaintRequest>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match feedback_service
        .submit_complaint(caller.id, request.into_inner())
        .await
    {
        Ok(resp) => Ok(HttpResponse::Created().json(json!({"success": true, "data": resp}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/complaints",
    tag = "complaint",
    params(
        ("status" = Option<String>, Query, description = "pending / resolved"),
        ("page" = Option<u64>, Query, description = "页码"),
        ("page_size" = Option<u64>, Query, description = "每页数量")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "投诉列表；管理员可见全部")
    )
)]
pub async fn list_complaints(
    feedback_service: web::Data<FeedbackService>,
    req: HttpRequest,
    query: web::Query<TicketQuery>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match feedback_service.list_complaints(caller.id, &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": page}))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/complaints/{id}",
    tag = "complaint",
    params(("id" = i32, Path, description = "投诉 ID")),
    request_body = RespondRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "回复成功", body = ComplaintResponse),
        (status = 400, description = "回复内容为空"),
        (status = 403, description = "需要管理员权限"),
        (status = 404, description = "投诉不存在")
    )
)]
pub async fn respond_complaint(
    feedback_service: web::Data<FeedbackService>,
    req: HttpRequest,
    path: web::Path<i32>,
    request: web::Json<RespondRequest>,
) -> Result<HttpResponse> {
    let caller = match current_user(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    match feedback_service
        .respond_complaint(caller.id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(resp) => Ok(HttpResponse::Ok().json(json!({"success": true, "data": resp}))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn feedback_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/feedbacks")
            .route("", web::post().to(create_feedback))
            .route("", web::get().to(list_feedbacks))
            .route("/{id}", web::patch().to(respond_feedback)),
    );
}

pub fn complaint_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/complaints")
            .route("", web::post().to(create_complaint))
            .route("", web::get().to(list_complaints))
            .route("/{id}", web::patch().to(respond_complaint)),
    );
}
