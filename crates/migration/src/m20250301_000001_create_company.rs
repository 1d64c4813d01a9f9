//! Create `company` table.
//!
//! Companies own institutes and employ users; deactivation is a soft delete
//! via `is_active`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Company::Table)
                    .if_not_exists()
                    .col(uuid(Company::Id).primary_key())
                    .col(string_len(Company::Name, 255).not_null())
                    .col(text_null(Company::Description))
                    .col(string_len_null(Company::Address, 512))
                    .col(string_len_null(Company::Phone, 32))
                    .col(string_len_null(Company::Email, 255))
                    .col(boolean(Company::IsActive).not_null().default(true))
                    .col(timestamp_with_time_zone(Company::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Company::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Company::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Company { Table, Id, Name, Description, Address, Phone, Email, IsActive, CreatedAt, UpdatedAt }
