use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
pub enum Users {
    Table,
    Id,
    Name,
    Email,
    PhoneNumber,
    PasswordHash,
    Role,
    Status,
    CreatedAt,
    UpdatedAt,
}

/// 套餐目录。duration_days 实际存储的是小时数
#[derive(DeriveIden)]
pub enum SubscriptionTiers {
    Table,
    Id,
    Name,
    Price,
    DurationDays,
    SpeedLimit,
    DataLimit,
    Description,
    TierType,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string_len(120).not_null())
                    .col(ColumnDef::new(Users::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Users::PhoneNumber).string_len(32).null())
                    .col(ColumnDef::new(Users::PasswordHash).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string_len(16)
                            .not_null()
                            .default("user"),
                    )
                    .col(
                        ColumnDef::new(Users::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 邮箱唯一
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_email_unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SubscriptionTiers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubscriptionTiers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionTiers::Name)
                            .string_len(120)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SubscriptionTiers::Price).double().not_null())
                    .col(
                        ColumnDef::new(SubscriptionTiers::DurationDays)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SubscriptionTiers::SpeedLimit).integer().null())
                    .col(ColumnDef::new(SubscriptionTiers::DataLimit).integer().null())
                    .col(ColumnDef::new(SubscriptionTiers::Description).text().null())
                    .col(
                        ColumnDef::new(SubscriptionTiers::TierType)
                            .string_len(20)
                            .not_null()
                            .default("hotspot"),
                    )
                    .col(
                        ColumnDef::new(SubscriptionTiers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SubscriptionTiers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_subscription_tiers_type")
                    .table(SubscriptionTiers::Table)
                    .col(SubscriptionTiers::TierType)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(SubscriptionTiers::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
