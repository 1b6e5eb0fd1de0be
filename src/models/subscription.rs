use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{
    SubscriptionStatus, TierType, subscription_entity as subscriptions, tier_entity as tiers,
};
use crate::models::{LoyaltyResponse, TierResponse};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSubscriptionRequest {
    pub tier_id: i32,
    /// 仅管理员可为他人开通
    pub user_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionQuery {
    pub user_id: Option<i32>,
    #[serde(rename = "type")]
    pub tier_type: Option<TierType>,
    pub status: Option<SubscriptionStatus>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionResponse {
    pub id: i32,
    pub user_id: i32,
    pub tier_id: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: SubscriptionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<TierResponse>,
}

impl SubscriptionResponse {
    pub fn with_tier(sub: subscriptions::Model, tier: Option<tiers::Model>) -> Self {
        let mut resp = Self::from(sub);
        resp.tier = tier.map(TierResponse::from);
        resp
    }
}

impl From<subscriptions::Model> for SubscriptionResponse {
    fn from(s: subscriptions::Model) -> Self {
        Self {
            id: s.id,
            user_id: s.user_id,
            tier_id: s.tier_id,
            start_date: s.start_date,
            end_date: s.end_date,
            status: s.status,
            tier: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurchaseResponse {
    pub subscription: SubscriptionResponse,
    pub points_awarded: i64,
    pub loyalty: LoyaltyResponse,
}
