use crate::entities::{UserRole, UserStatus, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::notification_service::create_notification;
use crate::services::user_service::require_admin;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};

/// 群发对象
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    All,
    Active,
    Specific(Vec<i32>),
}

impl Audience {
    pub fn parse(value: &str, user_ids: Vec<i32>) -> AppResult<Self> {
        match value {
            "all" => Ok(Audience::All),
            "active" => Ok(Audience::Active),
            "specific" => {
                if user_ids.is_empty() {
                    return Err(AppError::ValidationError(
                        "user_ids is required for specific audience".to_string(),
                    ));
                }
                Ok(Audience::Specific(user_ids))
            }
            other => Err(AppError::InvalidAudience(other.to_string())),
        }
    }
}

#[derive(Clone)]
pub struct CommunicationService {
    pool: DatabaseConnection,
}

impl CommunicationService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 管理员群发通知，管理员账号本身不在收件人之列
    pub async fn broadcast(
        &self,
        actor_id: i32,
        request: BroadcastRequest,
    ) -> AppResult<BroadcastResponse> {
        let now = Utc::now();
        let txn = self.pool.begin().await?;
        require_admin(&txn, actor_id).await?;

        let message = request.message.trim().to_string();
        if message.is_empty() {
            return Err(AppError::ValidationError("Message is required".to_string()));
        }
        let audience = Audience::parse(&request.audience, request.user_ids)?;

        let mut select = users::Entity::find()
            .select_only()
            .column(users::Column::Id)
            .filter(users::Column::Role.ne(UserRole::Admin));
        select = match &audience {
            Audience::All => select,
            Audience::Active => select.filter(users::Column::Status.eq(UserStatus::Active)),
            Audience::Specific(ids) => select.filter(users::Column::Id.is_in(ids.clone())),
        };
        let recipients: Vec<i32> = select
            .order_by_asc(users::Column::Id)
            .into_tuple()
            .all(&txn)
            .await?;

        let channel = request.channel.unwrap_or_default();
        let notification_type = request.notification_type.unwrap_or_default();
        for user_id in &recipients {
            create_notification(&txn, *user_id, &message, channel, notification_type, now).await?;
        }

        txn.commit().await?;

        let sent = recipients.len() as u64;
        log::info!(
            "Admin {actor_id} broadcast to {sent} users (audience {})",
            request.audience
        );
        Ok(BroadcastResponse {
            sent,
            audience: request.audience,
        })
    }
}
