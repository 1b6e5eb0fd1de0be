use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{
    NotificationChannel, NotificationStatus, NotificationType, notification_entity as notifications,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct NotificationQuery {
    pub status: Option<NotificationStatus>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// status 以字符串接收，非法值返回 400
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateNotificationRequest {
    #[schema(example = "read")]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponse {
    pub id: i32,
    pub user_id: i32,
    pub message: String,
    pub channel: NotificationChannel,
    pub notification_type: NotificationType,
    pub status: NotificationStatus,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl From<notifications::Model> for NotificationResponse {
    fn from(m: notifications::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            message: m.message,
            channel: m.channel,
            notification_type: m.notification_type,
            status: m.status,
            created_at: m.created_at,
            read_at: m.read_at,
        }
    }
}

/// 群发请求；audience: all / active / specific
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BroadcastRequest {
    pub message: String,
    pub channel: Option<NotificationChannel>,
    #[schema(example = "all")]
    pub audience: String,
    #[serde(default)]
    pub user_ids: Vec<i32>,
    pub notification_type: Option<NotificationType>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BroadcastResponse {
    pub sent: u64,
    pub audience: String,
}
