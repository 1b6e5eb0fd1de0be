use crate::entities::{TierType, subscription_entity as subscriptions, tier_entity as tiers};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::user_service::require_admin;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

/// 套餐价格上限，保证积分换算不溢出
pub const MAX_TIER_PRICE: f64 = 1_000_000_000.0;

fn validate_tier(name: &str, price: f64, duration_days: i32) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::ValidationError("Tier name is required".to_string()));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::ValidationError(
            "Price must be zero or positive".to_string(),
        ));
    }
    if price > MAX_TIER_PRICE {
        return Err(AppError::ValidationError(format!(
            "Price must not exceed {MAX_TIER_PRICE}"
        )));
    }
    if duration_days <= 0 {
        return Err(AppError::ValidationError(
            "Duration must be positive".to_string(),
        ));
    }
    Ok(())
}

/// 套餐目录
#[derive(Clone)]
pub struct TierService {
    pool: DatabaseConnection,
}

impl TierService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: &TierQuery) -> AppResult<Vec<TierResponse>> {
        let mut select = tiers::Entity::find();
        if let Some(tier_type) = query.tier_type {
            select = select.filter(tiers::Column::TierType.eq(tier_type));
        }
        let list = select
            .order_by_asc(tiers::Column::Price)
            .order_by_asc(tiers::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn get(&self, tier_id: i32) -> AppResult<TierResponse> {
        let tier = self.find(tier_id).await?;
        Ok(tier.into())
    }

    pub async fn create(&self, actor_id: i32, request: CreateTierRequest) -> AppResult<TierResponse> {
        require_admin(&self.pool, actor_id).await?;
        validate_tier(&request.name, request.price, request.duration_days)?;

        let now = Utc::now();
        let tier = tiers::ActiveModel {
            name: Set(request.name.trim().to_string()),
            price: Set(request.price),
            duration_days: Set(request.duration_days),
            speed_limit: Set(request.speed_limit),
            data_limit: Set(request.data_limit),
            description: Set(request.description),
            tier_type: Set(request.tier_type.unwrap_or(TierType::Hotspot)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Admin {actor_id} created tier {} ({})", tier.id, tier.name);
        Ok(tier.into())
    }

    pub async fn update(
        &self,
        actor_id: i32,
        tier_id: i32,
        request: UpdateTierRequest,
    ) -> AppResult<TierResponse> {
        require_admin(&self.pool, actor_id).await?;
        let tier = self.find(tier_id).await?;
        if request.is_empty() {
            return Ok(tier.into());
        }

        let name = request.name.clone().unwrap_or_else(|| tier.name.clone());
        let price = request.price.unwrap_or(tier.price);
        let duration_days = request.duration_days.unwrap_or(tier.duration_days);
        validate_tier(&name, price, duration_days)?;

        let mut am = tier.into_active_model();
        am.name = Set(name.trim().to_string());
        am.price = Set(price);
        am.duration_days = Set(duration_days);
        if let Some(v) = request.speed_limit {
            am.speed_limit = Set(Some(v));
        }
        if let Some(v) = request.data_limit {
            am.data_limit = Set(Some(v));
        }
        if let Some(v) = request.description {
            am.description = Set(Some(v));
        }
        if let Some(v) = request.tier_type {
            am.tier_type = Set(v);
        }
        am.updated_at = Set(Utc::now());
        let updated = am.update(&self.pool).await?;

        log::info!("Admin {actor_id} updated tier {tier_id}");
        Ok(updated.into())
    }

    pub async fn delete(&self, actor_id: i32, tier_id: i32) -> AppResult<()> {
        require_admin(&self.pool, actor_id).await?;
        let tier = self.find(tier_id).await?;

        // 有订阅引用的套餐不能删除
        let in_use = subscriptions::Entity::find()
            .filter(subscriptions::Column::TierId.eq(tier_id))
            .count(&self.pool)
            .await?;
        if in_use > 0 {
            return Err(AppError::Conflict(format!(
                "Tier is referenced by {in_use} subscriptions"
            )));
        }

        tier.delete(&self.pool).await?;
        log::info!("Admin {actor_id} deleted tier {tier_id}");
        Ok(())
    }

    async fn find(&self, tier_id: i32) -> AppResult<tiers::Model> {
        tiers::Entity::find_by_id(tier_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription tier not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_test_pool;
    use crate::entities::UserRole;
    use crate::services::subscription_service::activate;
    use crate::services::test_helpers::{seed_tier, seed_user};

    fn create_request(name: &str, price: f64, hours: i32) -> CreateTierRequest {
        CreateTierRequest {
            name: name.into(),
            price,
            duration_days: hours,
            speed_limit: Some(5),
            data_limit: None,
            description: None,
            tier_type: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_filter_by_type() {
        let pool = create_test_pool().await;
        let admin = seed_user(&pool, "admin@mnet.com", UserRole::Admin).await;
        let service = TierService::new(pool.clone());

        let created = service
            .create(admin.id, create_request("1 Hour", 10.0, 1))
            .await
            .unwrap();
        assert_eq!(created.tier_type, TierType::Hotspot);
        assert_eq!(created.points_earned, 100);
        assert_eq!(created.points_required, 700);

        seed_tier(&pool, "Home 30d", 50.0, 720, TierType::HomeInternet).await;

        let home = service
            .list(&TierQuery {
                tier_type: Some(TierType::HomeInternet),
            })
            .await
            .unwrap();
        assert_eq!(home.len(), 1);
        assert_eq!(service.list(&TierQuery::default()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_validation() {
        let pool = create_test_pool().await;
        let admin = seed_user(&pool, "admin@mnet.com", UserRole::Admin).await;
        let service = TierService::new(pool.clone());

        for req in [
            create_request(" ", 10.0, 1),
            create_request("Bad price", -1.0, 1),
            create_request("Bad duration", 10.0, 0),
            create_request("Too expensive", 1e18, 1),
        ] {
            let err = service.create(admin.id, req).await.unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)));
        }
    }

    #[tokio::test]
    async fn test_non_admin_mutations_are_forbidden() {
        let pool = create_test_pool().await;
        let user = seed_user(&pool, "jane@mnet.com", UserRole::User).await;
        let tier = seed_tier(&pool, "1 Hour", 10.0, 1, TierType::Hotspot).await;
        let service = TierService::new(pool.clone());

        let err = service
            .create(user.id, create_request("Free", 0.0, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        let err = service.delete(user.id, tier.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        assert_eq!(service.list(&TierQuery::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_partial_update() {
        let pool = create_test_pool().await;
        let admin = seed_user(&pool, "admin@mnet.com", UserRole::Admin).await;
        let tier = seed_tier(&pool, "1 Hour", 10.0, 1, TierType::Hotspot).await;
        let service = TierService::new(pool.clone());

        let updated = service
            .update(
                admin.id,
                tier.id,
                UpdateTierRequest {
                    price: Some(12.5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.price, 12.5);
        assert_eq!(updated.name, "1 Hour");
        assert_eq!(updated.duration_days, 1);

        let err = service
            .update(
                admin.id,
                tier.id,
                UpdateTierRequest {
                    duration_days: Some(-3),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_delete_referenced_tier_conflicts() {
        let pool = create_test_pool().await;
        let admin = seed_user(&pool, "admin@mnet.com", UserRole::Admin).await;
        let tier = seed_tier(&pool, "1 Hour", 10.0, 1, TierType::Hotspot).await;
        let unused = seed_tier(&pool, "2 Hours", 18.0, 2, TierType::Hotspot).await;
        activate(&pool, admin.id, tier.id, Utc::now()).await.unwrap();
        let service = TierService::new(pool.clone());

        let err = service.delete(admin.id, tier.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        service.delete(admin.id, unused.id).await.unwrap();
        let err = service.get(unused.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
