pub use sea_orm_migration::prelude::*;

mod m20250901_000001_create_users_and_tiers;
mod m20250901_000002_create_subscriptions_and_loyalty;
mod m20250902_000001_create_feedback_and_notifications;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_users_and_tiers::Migration),
            Box::new(m20250901_000002_create_subscriptions_and_loyalty::Migration),
            Box::new(m20250902_000001_create_feedback_and_notifications::Migration),
        ]
    }
}
