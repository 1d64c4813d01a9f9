//! Create `institute` table with FK to `company`.
//!
//! `institute_type` and `gender` are stored as closed string enums validated
//! in the models crate.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Institute::Table)
                    .if_not_exists()
                    .col(uuid(Institute::Id).primary_key())
                    .col(string_len(Institute::Name, 255).not_null())
                    .col(string_len(Institute::InstituteType, 32).not_null())
                    .col(string_len(Institute::Gender, 16).not_null())
                    .col(text_null(Institute::Description))
                    .col(string_len_null(Institute::Address, 512))
                    .col(uuid(Institute::CompanyId).not_null())
                    .col(timestamp_with_time_zone(Institute::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Institute::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_institute_company")
                            .from(Institute::Table, Institute::CompanyId)
                            .to(Company::Table, Company::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Institute::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Institute { Table, Id, Name, InstituteType, Gender, Description, Address, CompanyId, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Company { Table, Id }
