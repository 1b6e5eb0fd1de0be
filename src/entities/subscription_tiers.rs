use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "snake_case")]
pub enum TierType {
    #[sea_orm(string_value = "hotspot")]
    Hotspot,
    #[sea_orm(string_value = "home_internet")]
    HomeInternet,
}

impl std::fmt::Display for TierType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TierType::Hotspot => write!(f, "hotspot"),
            TierType::HomeInternet => write!(f, "home_internet"),
        }
    }
}

/// 套餐目录
/// 说明:
/// - duration_days: 历史字段名，实际单位是小时
/// - speed_limit: Mbps；data_limit: MB
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "subscription_tiers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub duration_days: i32,
    pub speed_limit: Option<i32>,
    pub data_limit: Option<i32>,
    pub description: Option<String>,
    pub tier_type: TierType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// 套餐时长
    pub fn duration(&self) -> chrono::Duration {
        chrono::Duration::hours(self.duration_days as i64)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::subscriptions::Entity")]
    Subscriptions,
}

impl Related<super::subscriptions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscriptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
