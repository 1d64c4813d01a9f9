//! Create `user` table with optional FKs to `company` and `institute`.
//!
//! Stores the credential record: unique email, unique optional phone and the
//! salted password hash. Deactivation is a soft delete via `is_active`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(string_len(User::Email, 255).unique_key().not_null())
                    // Explicitly define nullable unique phone to avoid conflicting NULL/NOT NULL
                    .col(
                        ColumnDef::new(User::Phone)
                            .string_len(32)
                            .null()
                            .unique_key(),
                    )
                    .col(string_len(User::PasswordHash, 255).not_null())
                    .col(string_len(User::FirstName, 128).not_null())
                    .col(string_len(User::LastName, 128).not_null())
                    .col(date_null(User::DateOfBirth))
                    .col(string_len(User::Gender, 16).not_null())
                    .col(string_len(User::Role, 32).not_null())
                    .col(string_len(User::UserType, 32).not_null())
                    .col(uuid_null(User::CompanyId))
                    .col(uuid_null(User::InstituteId))
                    .col(string_len_null(User::ProfileImage, 512))
                    .col(boolean(User::IsActive).not_null().default(true))
                    .col(timestamp_with_time_zone(User::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(User::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_company")
                            .from(User::Table, User::CompanyId)
                            .to(Company::Table, Company::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_institute")
                            .from(User::Table, User::InstituteId)
                            .to(Institute::Table, Institute::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(User::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
    Email,
    Phone,
    PasswordHash,
    FirstName,
    LastName,
    DateOfBirth,
    Gender,
    Role,
    UserType,
    CompanyId,
    InstituteId,
    ProfileImage,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Company { Table, Id }

#[derive(DeriveIden)]
enum Institute { Table, Id }
