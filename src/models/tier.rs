use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{TierType, tier_entity as tiers};

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct TierQuery {
    /// hotspot / home_internet
    #[serde(rename = "type")]
    pub tier_type: Option<TierType>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTierRequest {
    #[schema(example = "1 Hour Plan")]
    pub name: String,
    #[schema(example = 10.0)]
    pub price: f64,
    /// 单位：小时
    #[schema(example = 1)]
    pub duration_days: i32,
    pub speed_limit: Option<i32>,
    pub data_limit: Option<i32>,
    pub description: Option<String>,
    pub tier_type: Option<TierType>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateTierRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub duration_days: Option<i32>,
    pub speed_limit: Option<i32>,
    pub data_limit: Option<i32>,
    pub description: Option<String>,
    pub tier_type: Option<TierType>,
}

impl UpdateTierRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.duration_days.is_none()
            && self.speed_limit.is_none()
            && self.data_limit.is_none()
            && self.description.is_none()
            && self.tier_type.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TierResponse {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub duration_days: i32,
    pub speed_limit: Option<i32>,
    pub data_limit: Option<i32>,
    pub description: Option<String>,
    pub tier_type: TierType,
    /// 购买可得积分
    pub points_earned: i64,
    /// 兑换所需积分
    pub points_required: i64,
    pub created_at: DateTime<Utc>,
}

impl From<tiers::Model> for TierResponse {
    fn from(t: tiers::Model) -> Self {
        Self {
            points_earned: crate::services::points_for_purchase(t.price),
            points_required: crate::services::points_for_redemption(t.price),
            id: t.id,
            name: t.name,
            price: t.price,
            duration_days: t.duration_days,
            speed_limit: t.speed_limit,
            data_limit: t.data_limit,
            description: t.description,
            tier_type: t.tier_type,
            created_at: t.created_at,
        }
    }
}
