use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

pub const REWARD_TYPE_SUBSCRIPTION: &str = "subscription";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "redemptions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub points_used: i64,
    pub reward_type: String,
    pub tier_id: Option<i32>,
    pub subscription_id: Option<i32>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
