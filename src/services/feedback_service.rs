use crate::entities::{
    NotificationChannel, NotificationType, TicketStatus, complaint_entity as complaints,
    feedback_entity as feedbacks, tier_entity as tiers,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::notification_service::create_notification;
use crate::services::user_service::{load_user, require_admin};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

fn validate_response(request: &RespondRequest) -> AppResult<String> {
    let text = request.admin_response.trim();
    if text.is_empty() {
        return Err(AppError::ValidationError(
            "Response text is required".to_string(),
        ));
    }
    Ok(text.to_string())
}

/// 反馈与投诉
#[derive(Clone)]
pub struct FeedbackService {
    pool: DatabaseConnection,
}

impl FeedbackService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn submit_feedback(
        &self,
        user_id: i32,
        request: CreateFeedbackRequest,
    ) -> AppResult<FeedbackResponse> {
        if !(1..=5).contains(&request.rating) {
            return Err(AppError::ValidationError(
                "Rating must be between 1 and 5".to_string(),
            ));
        }
        if let Some(tier_id) = request.tier_id {
            tiers::Entity::find_by_id(tier_id)
                .one(&self.pool)
                .await?
                .ok_or_else(|| AppError::NotFound("Subscription tier not found".to_string()))?;
        }

        let now = Utc::now();
        let comment = request
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        let model = feedbacks::ActiveModel {
            user_id: Set(user_id),
            tier_id: Set(request.tier_id),
            rating: Set(request.rating),
            comment: Set(comment),
            status: Set(TicketStatus::Pending),
            admin_response: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(model.into())
    }

    pub async fn list_feedbacks(
        &self,
        actor_id: i32,
        query: &TicketQuery,
    ) -> AppResult<PaginatedResponse<FeedbackResponse>> {
        let actor = load_user(&self.pool, actor_id).await?;
        let params = PaginationParams::new(query.page, query.page_size);

        let mut select = feedbacks::Entity::find();
        if !actor.is_admin() {
            select = select.filter(feedbacks::Column::UserId.eq(actor_id));
        }
        if let Some(status) = query.status {
            select = select.filter(feedbacks::Column::Status.eq(status));
        }

        let total = select.clone().count(&self.pool).await?;
        let items = select
            .order_by_desc(feedbacks::Column::CreatedAt)
            .order_by_desc(feedbacks::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(items, &params, total).map(FeedbackResponse::from))
    }

    /// 管理员回复反馈，并通知提交人
    pub async fn respond_feedback(
        &self,
        actor_id: i32,
        feedback_id: i32,
        request: RespondRequest,
    ) -> AppResult<FeedbackResponse> {
        let now = Utc::now();
        let txn = self.pool.begin().await?;
        require_admin(&txn, actor_id).await?;

        let feedback = feedbacks::Entity::find_by_id(feedback_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Feedback not found".to_string()))?;
        let text = validate_response(&request)?;
        let status = request.status.unwrap_or(TicketStatus::Resolved);

        let submitter = feedback.user_id;
        let mut am = feedback.into_active_model();
        am.admin_response = Set(Some(text.clone()));
        am.status = Set(status);
        am.updated_at = Set(now);
        let updated = am.update(&txn).await?;

        create_notification(
            &txn,
            submitter,
            &format!("Your feedback #{feedback_id} has been {status}: {text}"),
            NotificationChannel::InApp,
            NotificationType::Info,
            now,
        )
        .await?;

        txn.commit().await?;
        log::info!("Admin {actor_id} responded to feedback {feedback_id}");
        Ok(updated.into())
    }

    pub async fn submit_complaint(
        &self,
        user_id: i32,
        request: CreateComplaintRequest,
    ) -> AppResult<ComplaintResponse> {
        let subject = request.subject.trim();
        let description = request.description.trim();
        if subject.is_empty() || description.is_empty() {
            return Err(AppError::ValidationError(
                "Subject and description are required".to_string(),
            ));
        }

        let now = Utc::now();
        let model = complaints::ActiveModel {
            user_id: Set(user_id),
            subject: Set(subject.to_string()),
            description: Set(description.to_string()),
            status: Set(TicketStatus::Pending),
            admin_response: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(model.into())
    }

    pub async fn list_complaints(
        &self,
        actor_id: i32,
        query: &TicketQuery,
    ) -> AppResult<PaginatedResponse<ComplaintResponse>> {
        let actor = load_user(&self.pool, actor_id).await?;
        let params = PaginationParams::new(query.page, query.page_size);

        let mut select = complaints::Entity::find();
        if !actor.is_admin() {
            select = select.filter(complaints::Column::UserId.eq(actor_id));
        }
        if let Some(status) = query.status {
            select = select.filter(complaints::Column::Status.eq(status));
        }

        let total = select.clone().count(&self.pool).await?;
        let items = select
            .order_by_desc(complaints::Column::CreatedAt)
            .order_by_desc(complaints::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(items, &params, total).map(ComplaintResponse::from))
    }

    /// 管理员回复投诉，并通知提交人
    pub async fn respond_complaint(
        &self,
        actor_id: i32,
        complaint_id: i32,
        request: RespondRequest,
    ) -> AppResult<ComplaintResponse> {
        let now = Utc::now();
        let txn = self.pool.begin().await?;
        require_admin(&txn, actor_id).await?;

        let complaint = complaints::Entity::find_by_id(complaint_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Complaint not found".to_string()))?;
        let text = validate_response(&request)?;
        let status = request.status.unwrap_or(TicketStatus::Resolved);

        let submitter = complaint.user_id;
        let subject = complaint.subject.clone();
        let mut am = complaint.into_active_model();
        am.admin_response = Set(Some(text.clone()));
        am.status = Set(status);
        am.updated_at = Set(now);
        let updated = am.update(&txn).await?;

        create_notification(
            &txn,
            submitter,
            &format!("Your complaint \"{subject}\" has been {status}: {text}"),
            NotificationChannel::InApp,
            NotificationType::Info,
            now,
        )
        .await?;

        txn.commit().await?;
        log::info!("Admin {actor_id} responded to complaint {complaint_id}");
        Ok(updated.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_test_pool;
    use crate::entities::{UserRole, notification_entity as notifications};
    use crate::services::test_helpers::seed_user;

    #[tokio::test]
    async fn test_feedback_rating_bounds() {
        let pool = create_test_pool().await;
        let user = seed_user(&pool, "jane@mnet.com", UserRole::User).await;
        let service = FeedbackService::new(pool.clone());

        for rating in [0, 6] {
            let err = service
                .submit_feedback(
                    user.id,
                    CreateFeedbackRequest {
                        tier_id: None,
                        rating,
                        comment: None,
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)));
        }

        let err = service
            .submit_feedback(
                user.id,
                CreateFeedbackRequest {
                    tier_id: Some(42),
                    rating: 4,
                    comment: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_respond_feedback_notifies_submitter() {
        let pool = create_test_pool().await;
        let admin = seed_user(&pool, "admin@mnet.com", UserRole::Admin).await;
        let user = seed_user(&pool, "jane@mnet.com", UserRole::User).await;
        let service = FeedbackService::new(pool.clone());

        let feedback = service
            .submit_feedback(
                user.id,
                CreateFeedbackRequest {
                    tier_id: None,
                    rating: 2,
                    comment: Some("Too slow at night".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(feedback.status, TicketStatus::Pending);

        let resp = service
            .respond_feedback(
                admin.id,
                feedback.id,
                RespondRequest {
                    admin_response: "We upgraded the access point".into(),
                    status: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.status, TicketStatus::Resolved);
        assert_eq!(
            resp.admin_response.as_deref(),
            Some("We upgraded the access point")
        );

        let inbox = notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user.id))
            .all(&pool)
            .await
            .unwrap();
        assert_eq!(inbox.len(), 1);
        assert!(inbox[0].message.contains("We upgraded the access point"));
    }

    #[tokio::test]
    async fn test_non_admin_cannot_respond_to_complaint() {
        let pool = create_test_pool().await;
        let user = seed_user(&pool, "jane@mnet.com", UserRole::User).await;
        let service = FeedbackService::new(pool.clone());

        let complaint = service
            .submit_complaint(
                user.id,
                CreateComplaintRequest {
                    subject: "Outage".into(),
                    description: "No signal since morning".into(),
                },
            )
            .await
            .unwrap();

        let err = service
            .respond_complaint(
                user.id,
                complaint.id,
                RespondRequest {
                    admin_response: "fixed".into(),
                    status: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        let stored = complaints::Entity::find_by_id(complaint.id)
            .one(&pool)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, TicketStatus::Pending);
        assert!(stored.admin_response.is_none());
        let sent = notifications::Entity::find().count(&pool).await.unwrap();
        assert_eq!(sent, 0);
    }

    #[tokio::test]
    async fn test_respond_complaint_errors() {
        let pool = create_test_pool().await;
        let admin = seed_user(&pool, "admin@mnet.com", UserRole::Admin).await;
        let user = seed_user(&pool, "jane@mnet.com", UserRole::User).await;
        let service = FeedbackService::new(pool.clone());

        let err = service
            .respond_complaint(
                admin.id,
                404,
                RespondRequest {
                    admin_response: "ok".into(),
                    status: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let complaint = service
            .submit_complaint(
                user.id,
                CreateComplaintRequest {
                    subject: "Billing".into(),
                    description: "Charged twice".into(),
                },
            )
            .await
            .unwrap();
        let err = service
            .respond_complaint(
                admin.id,
                complaint.id,
                RespondRequest {
                    admin_response: "   ".into(),
                    status: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_users_see_only_their_tickets() {
        let pool = create_test_pool().await;
        let admin = seed_user(&pool, "admin@mnet.com", UserRole::Admin).await;
        let jane = seed_user(&pool, "jane@mnet.com", UserRole::User).await;
        let john = seed_user(&pool, "john@mnet.com", UserRole::User).await;
        let service = FeedbackService::new(pool.clone());

        for user_id in [jane.id, john.id] {
            service
                .submit_complaint(
                    user_id,
                    CreateComplaintRequest {
                        subject: "Slow".into(),
                        description: "Speed drops".into(),
                    },
                )
                .await
                .unwrap();
        }

        let mine = service
            .list_complaints(jane.id, &TicketQuery::default())
            .await
            .unwrap();
        assert_eq!(mine.total, 1);
        let all = service
            .list_complaints(admin.id, &TicketQuery::default())
            .await
            .unwrap();
        assert_eq!(all.total, 2);
    }
}
