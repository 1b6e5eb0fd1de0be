use crate::entities::{TierType, UserRole, UserStatus, tier_entity as tiers, user_entity as users};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

pub const TEST_PASSWORD: &str = "password123";

pub async fn seed_user(pool: &DatabaseConnection, email: &str, role: UserRole) -> users::Model {
    let now = Utc::now();
    // 低 cost 加快测试
    let password_hash = bcrypt::hash(TEST_PASSWORD, 4).unwrap();
    users::ActiveModel {
        name: Set(email.split('@').next().unwrap_or(email).to_string()),
        email: Set(email.to_string()),
        phone_number: Set(None),
        password_hash: Set(password_hash),
        role: Set(role),
        status: Set(UserStatus::Active),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(pool)
    .await
    .unwrap()
}

pub async fn seed_tier(
    pool: &DatabaseConnection,
    name: &str,
    price: f64,
    hours: i32,
    tier_type: TierType,
) -> tiers::Model {
    let now = Utc::now();
    tiers::ActiveModel {
        name: Set(name.to_string()),
        price: Set(price),
        duration_days: Set(hours),
        speed_limit: Set(Some(10)),
        data_limit: Set(None),
        description: Set(None),
        tier_type: Set(tier_type),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(pool)
    .await
    .unwrap()
}
