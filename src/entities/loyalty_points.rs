use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 积分账户
/// 说明:
/// - points_earned: 累计获得（只增不减）
/// - points_redeemed: 累计兑换（只增不减）
/// - balance = points_earned - points_redeemed
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "loyalty_points")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub user_id: i32,
    pub points_earned: i64,
    pub points_redeemed: i64,
    pub balance: i64,
    pub last_updated: DateTime<Utc>,
}

impl Model {
    pub fn is_consistent(&self) -> bool {
        self.balance == self.points_earned - self.points_redeemed
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
