use crate::entities::{
    SubscriptionStatus, subscription_entity as subscriptions, tier_entity as tiers,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::loyalty_service::earn;
use crate::services::user_service::{load_user, lock_active_user, require_admin};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
};
use sea_orm::JoinType;
use std::collections::HashMap;

/// 惰性过期：把已过 end_date 仍为 active 的订阅置为 expired（保留原定 end_date）
///
/// user_id 为 None 时处理全部用户。
pub async fn expire_overdue<C: ConnectionTrait>(
    conn: &C,
    user_id: Option<i32>,
    now: DateTime<Utc>,
) -> AppResult<u64> {
    let mut select = subscriptions::Entity::find()
        .filter(subscriptions::Column::Status.eq(SubscriptionStatus::Active));
    if let Some(user_id) = user_id {
        select = select.filter(subscriptions::Column::UserId.eq(user_id));
    }

    // 时间比较放在内存里做，sqlite 的时间列是文本
    let overdue: Vec<_> = select
        .all(conn)
        .await?
        .into_iter()
        .filter(|s| s.is_overdue(now))
        .collect();

    let mut count = 0u64;
    for sub in overdue {
        let mut am = sub.into_active_model();
        am.status = Set(SubscriptionStatus::Expired);
        am.updated_at = Set(now);
        am.update(conn).await?;
        count += 1;
    }

    if count > 0 {
        log::info!("Expired {count} overdue subscriptions");
    }
    Ok(count)
}

/// 开通订阅
///
/// 1. 锁定用户行，同一用户的并发开通串行执行；停用账号直接拒绝
/// 2. 先做惰性过期
/// 3. 同 tier_type 的其他 active 订阅立即终止（end_date = now）
/// 4. 新订阅窗口为 [now, now + duration_days 小时)
pub async fn activate<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    tier_id: i32,
    now: DateTime<Utc>,
) -> AppResult<(subscriptions::Model, tiers::Model)> {
    lock_active_user(conn, user_id).await?;

    let tier = tiers::Entity::find_by_id(tier_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Subscription tier not found".to_string()))?;

    expire_overdue(conn, Some(user_id), now).await?;

    let same_type: Vec<subscriptions::Model> = subscriptions::Entity::find()
        .join(JoinType::InnerJoin, subscriptions::Relation::Tier.def())
        .filter(subscriptions::Column::UserId.eq(user_id))
        .filter(subscriptions::Column::Status.eq(SubscriptionStatus::Active))
        .filter(tiers::Column::TierType.eq(tier.tier_type))
        .all(conn)
        .await?;

    for sub in same_type {
        let replaced_id = sub.id;
        let mut am = sub.into_active_model();
        am.status = Set(SubscriptionStatus::Expired);
        am.end_date = Set(now);
        am.updated_at = Set(now);
        am.update(conn).await?;
        log::info!(
            "Subscription {replaced_id} of user {user_id} replaced by new {} plan",
            tier.tier_type
        );
    }

    let subscription = subscriptions::ActiveModel {
        user_id: Set(user_id),
        tier_id: Set(tier.id),
        start_date: Set(now),
        end_date: Set(now + tier.duration()),
        status: Set(SubscriptionStatus::Active),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    log::info!(
        "Activated subscription {} for user {user_id} on tier {} until {}",
        subscription.id,
        tier.id,
        subscription.end_date
    );
    Ok((subscription, tier))
}

#[derive(Clone)]
pub struct SubscriptionService {
    pool: DatabaseConnection,
}

impl SubscriptionService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 购买：开通订阅并发放积分，同一事务
    pub async fn purchase(
        &self,
        actor_id: i32,
        request: CreateSubscriptionRequest,
    ) -> AppResult<PurchaseResponse> {
        self.purchase_at(actor_id, request, Utc::now()).await
    }

    pub async fn purchase_at(
        &self,
        actor_id: i32,
        request: CreateSubscriptionRequest,
        now: DateTime<Utc>,
    ) -> AppResult<PurchaseResponse> {
        let txn = self.pool.begin().await?;

        let user_id = request.user_id.unwrap_or(actor_id);
        if user_id != actor_id {
            // 仅管理员可为他人开通
            require_admin(&txn, actor_id).await?;
        }

        let (subscription, tier) = activate(&txn, user_id, request.tier_id, now).await?;
        let (loyalty, points_awarded) = earn(&txn, user_id, &tier, now).await?;

        txn.commit().await?;

        Ok(PurchaseResponse {
            subscription: SubscriptionResponse::with_tier(subscription, Some(tier)),
            points_awarded,
            loyalty: loyalty.into(),
        })
    }

    pub async fn list(
        &self,
        actor_id: i32,
        query: &SubscriptionQuery,
    ) -> AppResult<PaginatedResponse<SubscriptionResponse>> {
        let now = Utc::now();
        let actor = load_user(&self.pool, actor_id).await?;

        // 普通用户只能看自己的
        let scope = if actor.is_admin() {
            query.user_id
        } else {
            if query.user_id.is_some_and(|id| id != actor_id) {
                return Err(AppError::Forbidden);
            }
            Some(actor_id)
        };

        expire_overdue(&self.pool, scope, now).await?;

        let params = PaginationParams::new(query.page, query.page_size);
        let mut select = subscriptions::Entity::find();
        if let Some(user_id) = scope {
            select = select.filter(subscriptions::Column::UserId.eq(user_id));
        }
        if let Some(status) = query.status {
            select = select.filter(subscriptions::Column::Status.eq(status));
        }
        if let Some(tier_type) = query.tier_type {
            select = select
                .join(JoinType::InnerJoin, subscriptions::Relation::Tier.def())
                .filter(tiers::Column::TierType.eq(tier_type));
        }

        let total = select.clone().count(&self.pool).await?;
        let items = select
            .order_by_desc(subscriptions::Column::StartDate)
            .order_by_desc(subscriptions::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        let tier_ids: Vec<i32> = items.iter().map(|s| s.tier_id).collect();
        let tier_map: HashMap<i32, tiers::Model> = tiers::Entity::find()
            .filter(tiers::Column::Id.is_in(tier_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        Ok(PaginatedResponse::new(items, &params, total).map(|s| {
            let tier = tier_map.get(&s.tier_id).cloned();
            SubscriptionResponse::with_tier(s, tier)
        }))
    }

    pub async fn get(&self, actor_id: i32, subscription_id: i32) -> AppResult<SubscriptionResponse> {
        let now = Utc::now();
        let actor = load_user(&self.pool, actor_id).await?;

        let (sub, tier) = subscriptions::Entity::find_by_id(subscription_id)
            .find_also_related(tiers::Entity)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription not found".to_string()))?;

        // 他人的订阅对普通用户不可见
        if sub.user_id != actor_id && !actor.is_admin() {
            return Err(AppError::NotFound("Subscription not found".to_string()));
        }

        let sub = if sub.is_overdue(now) {
            let mut am = sub.into_active_model();
            am.status = Set(SubscriptionStatus::Expired);
            am.updated_at = Set(now);
            am.update(&self.pool).await?
        } else {
            sub
        };

        Ok(SubscriptionResponse::with_tier(sub, tier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_test_pool;
    use crate::entities::{TierType, UserRole, loyalty_point_entity as loyalty_points};
    use crate::services::test_helpers::{seed_tier, seed_user};
    use crate::services::{LoyaltyService, UserService};
    use chrono::{Duration, SubsecRound};

    async fn active_of_type(
        pool: &DatabaseConnection,
        user_id: i32,
        tier_type: TierType,
    ) -> Vec<subscriptions::Model> {
        subscriptions::Entity::find()
            .join(JoinType::InnerJoin, subscriptions::Relation::Tier.def())
            .filter(subscriptions::Column::UserId.eq(user_id))
            .filter(subscriptions::Column::Status.eq(SubscriptionStatus::Active))
            .filter(tiers::Column::TierType.eq(tier_type))
            .all(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_activate_window_is_duration_in_hours() {
        let pool = create_test_pool().await;
        let user = seed_user(&pool, "jane@mnet.com", UserRole::User).await;
        let tier = seed_tier(&pool, "3 Hours", 25.0, 3, TierType::Hotspot).await;

        let now = Utc::now();
        let (sub, _) = activate(&pool, user.id, tier.id, now).await.unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.end_date - sub.start_date, Duration::hours(3));
    }

    #[tokio::test]
    async fn test_second_hotspot_purchase_replaces_first() {
        let pool = create_test_pool().await;
        let user = seed_user(&pool, "jane@mnet.com", UserRole::User).await;
        let a = seed_tier(&pool, "1 Hour", 10.0, 1, TierType::Hotspot).await;
        let b = seed_tier(&pool, "1 Day", 30.0, 24, TierType::Hotspot).await;
        let service = SubscriptionService::new(pool.clone());

        let now_a = Utc::now().trunc_subsecs(0);
        let first = service
            .purchase_at(
                user.id,
                CreateSubscriptionRequest {
                    tier_id: a.id,
                    user_id: None,
                },
                now_a,
            )
            .await
            .unwrap();

        let now_b = now_a + Duration::minutes(10);
        let second = service
            .purchase_at(
                user.id,
                CreateSubscriptionRequest {
                    tier_id: b.id,
                    user_id: None,
                },
                now_b,
            )
            .await
            .unwrap();

        let old = subscriptions::Entity::find_by_id(first.subscription.id)
            .one(&pool)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(old.status, SubscriptionStatus::Expired);
        assert_eq!(old.end_date, now_b);

        let active = active_of_type(&pool, user.id, TierType::Hotspot).await;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, second.subscription.id);
    }

    #[tokio::test]
    async fn test_tier_types_coexist() {
        let pool = create_test_pool().await;
        let user = seed_user(&pool, "jane@mnet.com", UserRole::User).await;
        let hotspot = seed_tier(&pool, "1 Hour", 10.0, 1, TierType::Hotspot).await;
        let home = seed_tier(&pool, "Home 30d", 50.0, 720, TierType::HomeInternet).await;

        let now = Utc::now();
        activate(&pool, user.id, hotspot.id, now).await.unwrap();
        activate(&pool, user.id, home.id, now).await.unwrap();

        assert_eq!(active_of_type(&pool, user.id, TierType::Hotspot).await.len(), 1);
        assert_eq!(
            active_of_type(&pool, user.id, TierType::HomeInternet).await.len(),
            1
        );
    }

    #[tokio::test]
    async fn test_purchase_awards_points() {
        let pool = create_test_pool().await;
        let user = seed_user(&pool, "jane@mnet.com", UserRole::User).await;
        let tier = seed_tier(&pool, "1 Hour", 10.0, 1, TierType::Hotspot).await;
        let service = SubscriptionService::new(pool.clone());

        let resp = service
            .purchase(
                user.id,
                CreateSubscriptionRequest {
                    tier_id: tier.id,
                    user_id: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.points_awarded, 100);
        assert_eq!(resp.loyalty.balance, 100);
        assert_eq!(resp.loyalty.points_earned, 100);
    }

    #[tokio::test]
    async fn test_purchase_unknown_tier_leaves_no_trace() {
        let pool = create_test_pool().await;
        let user = seed_user(&pool, "jane@mnet.com", UserRole::User).await;
        let service = SubscriptionService::new(pool.clone());

        let err = service
            .purchase(
                user.id,
                CreateSubscriptionRequest {
                    tier_id: 999,
                    user_id: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let ledger = loyalty_points::Entity::find().count(&pool).await.unwrap();
        assert_eq!(ledger, 0);
    }

    #[tokio::test]
    async fn test_disconnected_user_cannot_buy_again() {
        let pool = create_test_pool().await;
        let admin = seed_user(&pool, "admin@mnet.com", UserRole::Admin).await;
        let user = seed_user(&pool, "jane@mnet.com", UserRole::User).await;
        let tier = seed_tier(&pool, "1 Hour", 10.0, 1, TierType::Hotspot).await;
        let service = SubscriptionService::new(pool.clone());

        let request = || CreateSubscriptionRequest {
            tier_id: tier.id,
            user_id: None,
        };
        service.purchase(user.id, request()).await.unwrap();
        UserService::new(pool.clone())
            .disconnect(admin.id, user.id)
            .await
            .unwrap();

        let err = service.purchase(user.id, request()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        let err = service
            .purchase(
                admin.id,
                CreateSubscriptionRequest {
                    tier_id: tier.id,
                    user_id: Some(user.id),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        let err = LoyaltyService::new(pool.clone())
            .redeem(user.id, RedeemRequest { tier_id: tier.id })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        assert!(active_of_type(&pool, user.id, TierType::Hotspot).await.is_empty());
        let ledger = loyalty_points::Entity::find().one(&pool).await.unwrap().unwrap();
        assert_eq!(ledger.balance, 100);
    }

    #[tokio::test]
    async fn test_purchase_for_other_user_requires_admin() {
        let pool = create_test_pool().await;
        let admin = seed_user(&pool, "admin@mnet.com", UserRole::Admin).await;
        let jane = seed_user(&pool, "jane@mnet.com", UserRole::User).await;
        let john = seed_user(&pool, "john@mnet.com", UserRole::User).await;
        let tier = seed_tier(&pool, "1 Hour", 10.0, 1, TierType::Hotspot).await;
        let service = SubscriptionService::new(pool.clone());

        let err = service
            .purchase(
                jane.id,
                CreateSubscriptionRequest {
                    tier_id: tier.id,
                    user_id: Some(john.id),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        let resp = service
            .purchase(
                admin.id,
                CreateSubscriptionRequest {
                    tier_id: tier.id,
                    user_id: Some(john.id),
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.subscription.user_id, john.id);
    }

    #[tokio::test]
    async fn test_read_after_end_date_reports_expired() {
        let pool = create_test_pool().await;
        let user = seed_user(&pool, "jane@mnet.com", UserRole::User).await;
        let tier = seed_tier(&pool, "1 Hour", 10.0, 1, TierType::Hotspot).await;
        let service = SubscriptionService::new(pool.clone());

        // 两小时前开通的 1 小时套餐
        let past = Utc::now() - Duration::hours(2);
        let (sub, _) = activate(&pool, user.id, tier.id, past).await.unwrap();

        let fetched = service.get(user.id, sub.id).await.unwrap();
        assert_eq!(fetched.status, SubscriptionStatus::Expired);
        assert_eq!(fetched.end_date, sub.end_date);

        let page = service
            .list(
                user.id,
                &SubscriptionQuery {
                    status: Some(SubscriptionStatus::Active),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_users_only_see_their_own_subscriptions() {
        let pool = create_test_pool().await;
        let admin = seed_user(&pool, "admin@mnet.com", UserRole::Admin).await;
        let jane = seed_user(&pool, "jane@mnet.com", UserRole::User).await;
        let john = seed_user(&pool, "john@mnet.com", UserRole::User).await;
        let tier = seed_tier(&pool, "1 Hour", 10.0, 1, TierType::Hotspot).await;
        let now = Utc::now();
        let (jane_sub, _) = activate(&pool, jane.id, tier.id, now).await.unwrap();
        activate(&pool, john.id, tier.id, now).await.unwrap();
        let service = SubscriptionService::new(pool.clone());

        let page = service
            .list(jane.id, &SubscriptionQuery::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert!(page.data[0].tier.is_some());

        let err = service
            .list(
                jane.id,
                &SubscriptionQuery {
                    user_id: Some(john.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        let err = service.get(john.id, jane_sub.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let page = service
            .list(
                admin.id,
                &SubscriptionQuery {
                    tier_type: Some(TierType::Hotspot),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.total, 2);
    }
}
