use crate::entities::{
    NotificationChannel, NotificationStatus, NotificationType, notification_entity as notifications,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

/// 写一条未读通知
pub async fn create_notification<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    message: &str,
    channel: NotificationChannel,
    notification_type: NotificationType,
    now: DateTime<Utc>,
) -> AppResult<notifications::Model> {
    let model = notifications::ActiveModel {
        user_id: Set(user_id),
        message: Set(message.to_string()),
        channel: Set(channel),
        notification_type: Set(notification_type),
        status: Set(NotificationStatus::Unread),
        created_at: Set(now),
        read_at: Set(None),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(model)
}

#[derive(Clone)]
pub struct NotificationService {
    pool: DatabaseConnection,
}

impl NotificationService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        user_id: i32,
        query: &NotificationQuery,
    ) -> AppResult<PaginatedResponse<NotificationResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);
        let mut select =
            notifications::Entity::find().filter(notifications::Column::UserId.eq(user_id));
        if let Some(status) = query.status {
            select = select.filter(notifications::Column::Status.eq(status));
        }

        let total = select.clone().count(&self.pool).await?;
        let items = select
            .order_by_desc(notifications::Column::CreatedAt)
            .order_by_desc(notifications::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(items, &params, total).map(NotificationResponse::from))
    }

    /// 标记已读 / 未读，只能操作自己的通知
    pub async fn mark(
        &self,
        user_id: i32,
        notification_id: i32,
        request: UpdateNotificationRequest,
    ) -> AppResult<NotificationResponse> {
        let status: NotificationStatus = request
            .status
            .parse()
            .map_err(AppError::ValidationError)?;

        let notification = notifications::Entity::find_by_id(notification_id)
            .filter(notifications::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

        let read_at = match status {
            NotificationStatus::Read => Some(notification.read_at.unwrap_or_else(Utc::now)),
            NotificationStatus::Unread => None,
        };
        let mut am = notification.into_active_model();
        am.status = Set(status);
        am.read_at = Set(read_at);
        let updated = am.update(&self.pool).await?;
        Ok(updated.into())
    }

    pub async fn mark_all_read(&self, user_id: i32) -> AppResult<CountResponse> {
        let result = notifications::Entity::update_many()
            .col_expr(
                notifications::Column::Status,
                Expr::value(NotificationStatus::Read.to_string()),
            )
            .col_expr(notifications::Column::ReadAt, Expr::value(Utc::now()))
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::Status.eq(NotificationStatus::Unread))
            .exec(&self.pool)
            .await?;
        Ok(CountResponse {
            count: result.rows_affected,
        })
    }

    pub async fn unread_count(&self, user_id: i32) -> AppResult<CountResponse> {
        let count = notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::Status.eq(NotificationStatus::Unread))
            .count(&self.pool)
            .await?;
        Ok(CountResponse { count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_test_pool;
    use crate::entities::UserRole;
    use crate::services::test_helpers::seed_user;

    async fn notify(pool: &DatabaseConnection, user_id: i32, message: &str) -> notifications::Model {
        create_notification(
            pool,
            user_id,
            message,
            NotificationChannel::InApp,
            NotificationType::Info,
            Utc::now(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_mark_read_and_unread() {
        let pool = create_test_pool().await;
        let user = seed_user(&pool, "jane@mnet.com", UserRole::User).await;
        let n = notify(&pool, user.id, "hello").await;
        let service = NotificationService::new(pool.clone());

        let read = service
            .mark(user.id, n.id, UpdateNotificationRequest { status: "read".into() })
            .await
            .unwrap();
        assert_eq!(read.status, NotificationStatus::Read);
        assert!(read.read_at.is_some());

        let unread = service
            .mark(user.id, n.id, UpdateNotificationRequest { status: "unread".into() })
            .await
            .unwrap();
        assert_eq!(unread.status, NotificationStatus::Unread);
        assert!(unread.read_at.is_none());
    }

    #[tokio::test]
    async fn test_mark_rejects_bad_status_and_foreign_ids() {
        let pool = create_test_pool().await;
        let jane = seed_user(&pool, "jane@mnet.com", UserRole::User).await;
        let john = seed_user(&pool, "john@mnet.com", UserRole::User).await;
        let n = notify(&pool, jane.id, "hello").await;
        let service = NotificationService::new(pool.clone());

        let err = service
            .mark(jane.id, n.id, UpdateNotificationRequest { status: "archived".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let err = service
            .mark(john.id, n.id, UpdateNotificationRequest { status: "read".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_mark_all_read_and_unread_count() {
        let pool = create_test_pool().await;
        let jane = seed_user(&pool, "jane@mnet.com", UserRole::User).await;
        let john = seed_user(&pool, "john@mnet.com", UserRole::User).await;
        notify(&pool, jane.id, "one").await;
        notify(&pool, jane.id, "two").await;
        notify(&pool, john.id, "other").await;
        let service = NotificationService::new(pool.clone());

        assert_eq!(service.unread_count(jane.id).await.unwrap().count, 2);
        assert_eq!(service.mark_all_read(jane.id).await.unwrap().count, 2);
        assert_eq!(service.unread_count(jane.id).await.unwrap().count, 0);
        assert_eq!(service.unread_count(john.id).await.unwrap().count, 1);

        let page = service
            .list(
                jane.id,
                &NotificationQuery {
                    status: Some(NotificationStatus::Read),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.total, 2);
    }
}
