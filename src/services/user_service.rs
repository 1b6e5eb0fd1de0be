use crate::entities::{
    SubscriptionStatus, UserStatus, subscription_entity as subscriptions, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{hash_password, validate_password, verify_password};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// 读取调用方账号
pub async fn load_user<C: ConnectionTrait>(conn: &C, user_id: i32) -> AppResult<users::Model> {
    users::Entity::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// 角色以库中记录为准，不信任 token 里的 role
pub async fn require_admin<C: ConnectionTrait>(conn: &C, user_id: i32) -> AppResult<users::Model> {
    let user = users::Entity::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or(AppError::Forbidden)?;
    if !user.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(user)
}

/// 锁定用户行；停用账号不能再开通订阅
pub async fn lock_active_user<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> AppResult<users::Model> {
    let user = users::Entity::find_by_id(user_id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    if user.status == UserStatus::Inactive {
        log::warn!("Rejected activation for inactive user {user_id}");
        return Err(AppError::Forbidden);
    }
    Ok(user)
}

/// 将用户所有 active 订阅立即终止（end_date = now）
pub async fn expire_all_active<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    now: DateTime<Utc>,
) -> AppResult<u64> {
    let active = subscriptions::Entity::find()
        .filter(subscriptions::Column::UserId.eq(user_id))
        .filter(subscriptions::Column::Status.eq(SubscriptionStatus::Active))
        .all(conn)
        .await?;

    let mut expired = 0u64;
    for sub in active {
        // 已过期的保留原定 end_date
        let end_date = if sub.end_date < now { sub.end_date } else { now };
        let mut am = sub.into_active_model();
        am.status = Set(SubscriptionStatus::Expired);
        am.end_date = Set(end_date);
        am.updated_at = Set(now);
        am.update(conn).await?;
        expired += 1;
    }
    Ok(expired)
}

#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
}

impl UserService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn get_profile(&self, user_id: i32) -> AppResult<UserResponse> {
        let user = load_user(&self.pool, user_id).await?;
        Ok(user.into())
    }

    pub async fn change_password(
        &self,
        user_id: i32,
        request: ChangePasswordRequest,
    ) -> AppResult<()> {
        let user = load_user(&self.pool, user_id).await?;
        if !verify_password(&request.current_password, &user.password_hash)? {
            return Err(AppError::ValidationError(
                "Current password is incorrect".to_string(),
            ));
        }
        validate_password(&request.new_password)?;

        let mut am = user.into_active_model();
        am.password_hash = Set(hash_password(&request.new_password)?);
        am.updated_at = Set(Utc::now());
        am.update(&self.pool).await?;

        log::info!("User {user_id} changed password");
        Ok(())
    }

    pub async fn list_users(
        &self,
        actor_id: i32,
        query: &UserQuery,
    ) -> AppResult<PaginatedResponse<UserResponse>> {
        require_admin(&self.pool, actor_id).await?;

        let params = PaginationParams::new(query.page, query.page_size);
        let mut select = users::Entity::find();
        if let Some(role) = query.role {
            select = select.filter(users::Column::Role.eq(role));
        }
        if let Some(status) = query.status {
            select = select.filter(users::Column::Status.eq(status));
        }

        let total = select.clone().count(&self.pool).await?;
        let items = select
            .order_by_asc(users::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(items, &params, total).map(UserResponse::from))
    }

    pub async fn get_user(&self, actor_id: i32, user_id: i32) -> AppResult<UserResponse> {
        require_admin(&self.pool, actor_id).await?;
        let user = load_user(&self.pool, user_id).await?;
        Ok(user.into())
    }

    pub async fn set_status(
        &self,
        actor_id: i32,
        user_id: i32,
        status: UserStatus,
    ) -> AppResult<UserResponse> {
        require_admin(&self.pool, actor_id).await?;
        let user = load_user(&self.pool, user_id).await?;
        if user.status == status {
            return Ok(user.into());
        }

        let mut am = user.into_active_model();
        am.status = Set(status);
        am.updated_at = Set(Utc::now());
        let updated = am.update(&self.pool).await?;

        log::info!("Admin {actor_id} set user {user_id} status to {status}");
        Ok(updated.into())
    }

    /// 断开用户：账号置为 inactive 并终止全部有效订阅
    pub async fn disconnect(&self, actor_id: i32, user_id: i32) -> AppResult<DisconnectResponse> {
        let now = Utc::now();
        let txn = self.pool.begin().await?;
        require_admin(&txn, actor_id).await?;

        let user = users::Entity::find_by_id(user_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let expired_subscriptions = expire_all_active(&txn, user_id, now).await?;

        let mut am = user.into_active_model();
        am.status = Set(UserStatus::Inactive);
        am.updated_at = Set(now);
        let updated = am.update(&txn).await?;

        txn.commit().await?;

        log::info!(
            "Admin {actor_id} disconnected user {user_id}, {expired_subscriptions} subscriptions expired"
        );
        Ok(DisconnectResponse {
            user: updated.into(),
            expired_subscriptions,
        })
    }
}
