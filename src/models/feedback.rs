use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{TicketStatus, complaint_entity as complaints, feedback_entity as feedbacks};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateFeedbackRequest {
    pub tier_id: Option<i32>,
    /// 1-5
    #[schema(example = 5)]
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateComplaintRequest {
    #[schema(example = "Slow connection speed")]
    pub subject: String,
    pub description: String,
}

/// 管理员回复（反馈 / 投诉通用）
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RespondRequest {
    pub admin_response: String,
    /// 默认 resolved
    pub status: Option<TicketStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct TicketQuery {
    pub status: Option<TicketStatus>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeedbackResponse {
    pub id: i32,
    pub user_id: i32,
    pub tier_id: Option<i32>,
    pub rating: i32,
    pub comment: Option<String>,
    pub status: TicketStatus,
    pub admin_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<feedbacks::Model> for FeedbackResponse {
    fn from(m: feedbacks::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            tier_id: m.tier_id,
            rating: m.rating,
            comment: m.comment,
            status: m.status,
            admin_response: m.admin_response,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ComplaintResponse {
    pub id: i32,
    pub user_id: i32,
    pub subject: String,
    pub description: String,
    pub status: TicketStatus,
    pub admin_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<complaints::Model> for ComplaintResponse {
    fn from(m: complaints::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            subject: m.subject,
            description: m.description,
            status: m.status,
            admin_response: m.admin_response,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
