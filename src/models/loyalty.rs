use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{loyalty_point_entity as loyalty_points, redemption_entity as redemptions};
use crate::models::SubscriptionResponse;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoyaltyResponse {
    pub user_id: i32,
    pub points_earned: i64,
    pub points_redeemed: i64,
    pub balance: i64,
    pub last_updated: Option<DateTime<Utc>>,
}

impl LoyaltyResponse {
    /// 尚未产生积分记录的用户
    pub fn empty(user_id: i32) -> Self {
        Self {
            user_id,
            points_earned: 0,
            points_redeemed: 0,
            balance: 0,
            last_updated: None,
        }
    }
}

impl From<loyalty_points::Model> for LoyaltyResponse {
    fn from(m: loyalty_points::Model) -> Self {
        Self {
            user_id: m.user_id,
            points_earned: m.points_earned,
            points_redeemed: m.points_redeemed,
            balance: m.balance,
            last_updated: Some(m.last_updated),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RedeemRequest {
    pub tier_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RedemptionResponse {
    pub id: i32,
    pub points_used: i64,
    pub reward_type: String,
    pub tier_id: Option<i32>,
    pub subscription_id: Option<i32>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<redemptions::Model> for RedemptionResponse {
    fn from(m: redemptions::Model) -> Self {
        Self {
            id: m.id,
            points_used: m.points_used,
            reward_type: m.reward_type,
            tier_id: m.tier_id,
            subscription_id: m.subscription_id,
            description: m.description,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RedeemResponse {
    pub redemption: RedemptionResponse,
    pub subscription: SubscriptionResponse,
    pub loyalty: LoyaltyResponse,
}
