//! Create `islamic_profile` table, one row per user.
//!
//! Created atomically with its user at registration; goal/supplication lists
//! and prayer timings are stored as JSON.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IslamicProfile::Table)
                    .if_not_exists()
                    .col(uuid(IslamicProfile::Id).primary_key())
                    .col(uuid(IslamicProfile::UserId).unique_key().not_null())
                    .col(string_len_null(IslamicProfile::IslamicName, 255))
                    .col(json_null(IslamicProfile::PrayerTimings))
                    .col(json(IslamicProfile::IslamicGoals).not_null())
                    .col(json(IslamicProfile::FavoriteSupplications).not_null())
                    .col(integer(IslamicProfile::BehaviorScore).not_null().default(0))
                    .col(integer(IslamicProfile::SelfDevelopmentScore).not_null().default(0))
                    .col(integer(IslamicProfile::AmalScore).not_null().default(0))
                    .col(double(IslamicProfile::OverallRating).not_null().default(0.0))
                    .col(integer(IslamicProfile::TotalAmalCompleted).not_null().default(0))
                    .col(integer(IslamicProfile::CurrentStreak).not_null().default(0))
                    .col(integer(IslamicProfile::LongestStreak).not_null().default(0))
                    .col(timestamp_with_time_zone(IslamicProfile::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(IslamicProfile::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_islamic_profile_user")
                            .from(IslamicProfile::Table, IslamicProfile::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IslamicProfile::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum IslamicProfile {
    Table,
    Id,
    UserId,
    IslamicName,
    PrayerTimings,
    IslamicGoals,
    FavoriteSupplications,
    BehaviorScore,
    SelfDevelopmentScore,
    AmalScore,
    OverallRating,
    TotalAmalCompleted,
    CurrentStreak,
    LongestStreak,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
