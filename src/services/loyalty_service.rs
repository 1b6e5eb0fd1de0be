use crate::entities::{
    loyalty_point_entity as loyalty_points, redemption_entity as redemptions,
    redemptions::REWARD_TYPE_SUBSCRIPTION, tier_entity as tiers,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::subscription_service::activate;
use crate::services::user_service::{lock_active_user, require_admin};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// 每消费 1 个货币单位获得的积分
pub const POINTS_PER_UNIT_SPENT: f64 = 10.0;
/// 兑换时每 1 个货币单位所需积分
pub const POINTS_PER_UNIT_REDEEMED: f64 = 70.0;

pub fn points_for_purchase(price: f64) -> i64 {
    (price * POINTS_PER_UNIT_SPENT).floor() as i64
}

pub fn points_for_redemption(price: f64) -> i64 {
    (price * POINTS_PER_UNIT_REDEEMED).floor() as i64
}

fn add_points(current: i64, delta: i64) -> AppResult<i64> {
    current
        .checked_add(delta)
        .ok_or_else(|| AppError::ValidationError("Loyalty points overflow".to_string()))
}

/// 购买后入账，账户不存在时创建；返回 (账户, 本次积分)
pub async fn earn<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    tier: &tiers::Model,
    now: DateTime<Utc>,
) -> AppResult<(loyalty_points::Model, i64)> {
    let award = points_for_purchase(tier.price);

    let existing = loyalty_points::Entity::find()
        .filter(loyalty_points::Column::UserId.eq(user_id))
        .one(conn)
        .await?;

    let account = match existing {
        Some(account) => {
            let (earned, balance) = (account.points_earned, account.balance);
            let mut am = account.into_active_model();
            am.points_earned = Set(add_points(earned, award)?);
            am.balance = Set(add_points(balance, award)?);
            am.last_updated = Set(now);
            am.update(conn).await?
        }
        None => {
            loyalty_points::ActiveModel {
                user_id: Set(user_id),
                points_earned: Set(award),
                points_redeemed: Set(0),
                balance: Set(award),
                last_updated: Set(now),
                ..Default::default()
            }
            .insert(conn)
            .await?
        }
    };

    log::info!(
        "User {user_id} earned {award} points for tier {}, balance {}",
        tier.id,
        account.balance
    );
    Ok((account, award))
}

#[derive(Clone)]
pub struct LoyaltyService {
    pool: DatabaseConnection,
}

impl LoyaltyService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn get_balance(&self, user_id: i32) -> AppResult<LoyaltyResponse> {
        let account = loyalty_points::Entity::find()
            .filter(loyalty_points::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?;
        Ok(account
            .map(LoyaltyResponse::from)
            .unwrap_or_else(|| LoyaltyResponse::empty(user_id)))
    }

    /// 全部积分账户（管理员）
    pub async fn list_all(
        &self,
        actor_id: i32,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<LoyaltyResponse>> {
        require_admin(&self.pool, actor_id).await?;

        let select = loyalty_points::Entity::find();
        let total = select.clone().count(&self.pool).await?;
        let items = select
            .order_by_desc(loyalty_points::Column::Balance)
            .order_by_asc(loyalty_points::Column::UserId)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(items, params, total).map(LoyaltyResponse::from))
    }

    pub async fn list_redemptions(
        &self,
        user_id: i32,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<RedemptionResponse>> {
        let select =
            redemptions::Entity::find().filter(redemptions::Column::UserId.eq(user_id));
        let total = select.clone().count(&self.pool).await?;
        let items = select
            .order_by_desc(redemptions::Column::CreatedAt)
            .order_by_desc(redemptions::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(items, params, total).map(RedemptionResponse::from))
    }

    pub async fn redeem(&self, user_id: i32, request: RedeemRequest) -> AppResult<RedeemResponse> {
        self.redeem_at(user_id, request, Utc::now()).await
    }

    /// 积分兑换订阅
    ///
    /// 逻辑:
    /// 1. 锁定用户行（停用账号拒绝）后读取余额
    /// 2. 余额不足直接返回，不产生任何写入
    /// 3. 开通订阅、扣减积分、写兑换记录
    /// 整个过程在同一事务内，任一步失败全部回滚
    pub async fn redeem_at(
        &self,
        user_id: i32,
        request: RedeemRequest,
        now: DateTime<Utc>,
    ) -> AppResult<RedeemResponse> {
        let txn = self.pool.begin().await?;

        lock_active_user(&txn, user_id).await?;

        let tier = tiers::Entity::find_by_id(request.tier_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription tier not found".to_string()))?;
        let required = points_for_redemption(tier.price);

        let account = loyalty_points::Entity::find()
            .filter(loyalty_points::Column::UserId.eq(user_id))
            .one(&txn)
            .await?;
        let available = account.as_ref().map(|a| a.balance).unwrap_or(0);
        let account = match account {
            Some(account) if account.balance >= required => account,
            _ => {
                return Err(AppError::InsufficientPoints {
                    required,
                    available,
                });
            }
        };

        let (subscription, tier) = activate(&txn, user_id, tier.id, now).await?;

        let (redeemed, balance) = (account.points_redeemed, account.balance);
        let mut am = account.into_active_model();
        am.points_redeemed = Set(add_points(redeemed, required)?);
        am.balance = Set(balance - required);
        am.last_updated = Set(now);
        let account = am.update(&txn).await?;

        let redemption = redemptions::ActiveModel {
            user_id: Set(user_id),
            points_used: Set(required),
            reward_type: Set(REWARD_TYPE_SUBSCRIPTION.to_string()),
            tier_id: Set(Some(tier.id)),
            subscription_id: Set(Some(subscription.id)),
            description: Set(Some(format!("Redeemed {required} points for {}", tier.name))),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        log::info!(
            "User {user_id} redeemed {required} points for tier {}, balance {}",
            tier.id,
            account.balance
        );
        Ok(RedeemResponse {
            redemption: redemption.into(),
            subscription: SubscriptionResponse::with_tier(subscription, Some(tier)),
            loyalty: account.into(),
        })
    }
}
