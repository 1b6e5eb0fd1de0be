use sea_orm_migration::prelude::*;

use crate::m20250901_000001_create_users_and_tiers::{SubscriptionTiers, Users};

#[derive(DeriveIden)]
enum Subscriptions {
    Table,
    Id,
    UserId,
    TierId,
    StartDate,
    EndDate,
    Status,
    CreatedAt,
    UpdatedAt,
}

/// 积分账户：每个用户一行，balance = points_earned - points_redeemed
#[derive(DeriveIden)]
enum LoyaltyPoints {
    Table,
    Id,
    UserId,
    PointsEarned,
    PointsRedeemed,
    Balance,
    LastUpdated,
}

/// 积分兑换流水（只追加）
#[derive(DeriveIden)]
enum Redemptions {
    Table,
    Id,
    UserId,
    PointsUsed,
    RewardType,
    TierId,
    SubscriptionId,
    Description,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Subscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subscriptions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subscriptions::UserId).integer().not_null())
                    .col(ColumnDef::new(Subscriptions::TierId).integer().not_null())
                    .col(
                        ColumnDef::new(Subscriptions::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::EndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscriptions_user")
                            .from(Subscriptions::Table, Subscriptions::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscriptions_tier")
                            .from(Subscriptions::Table, Subscriptions::TierId)
                            .to(SubscriptionTiers::Table, SubscriptionTiers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 按用户 + 状态查询（惰性过期、切换套餐）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_subscriptions_user_status")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::UserId)
                    .col(Subscriptions::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LoyaltyPoints::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LoyaltyPoints::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LoyaltyPoints::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(LoyaltyPoints::PointsEarned)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LoyaltyPoints::PointsRedeemed)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LoyaltyPoints::Balance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LoyaltyPoints::LastUpdated)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_loyalty_points_user")
                            .from(LoyaltyPoints::Table, LoyaltyPoints::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 一个用户一条积分记录
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_loyalty_points_user_unique")
                    .table(LoyaltyPoints::Table)
                    .col(LoyaltyPoints::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Redemptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Redemptions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Redemptions::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(Redemptions::PointsUsed)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Redemptions::RewardType)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Redemptions::TierId).integer().null())
                    .col(ColumnDef::new(Redemptions::SubscriptionId).integer().null())
                    .col(ColumnDef::new(Redemptions::Description).text().null())
                    .col(
                        ColumnDef::new(Redemptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_redemptions_user")
                            .from(Redemptions::Table, Redemptions::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_redemptions_user")
                    .table(Redemptions::Table)
                    .col(Redemptions::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 删除顺序：兑换流水 -> 积分 -> 订阅
        manager
            .drop_table(Table::drop().if_exists().table(Redemptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(LoyaltyPoints::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Subscriptions::Table).to_owned())
            .await?;
        Ok(())
    }
}
