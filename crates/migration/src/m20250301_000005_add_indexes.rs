use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // User: FK lookups by company and institute
        manager
            .create_index(
                Index::create()
                    .name("idx_user_company")
                    .table(User::Table)
                    .col(User::CompanyId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_user_institute")
                    .table(User::Table)
                    .col(User::InstituteId)
                    .to_owned(),
            )
            .await?;

        // Institute: FK lookup by company
        manager
            .create_index(
                Index::create()
                    .name("idx_institute_company")
                    .table(Institute::Table)
                    .col(Institute::CompanyId)
                    .to_owned(),
            )
            .await?;

        // Listing default sort is newest-first
        manager
            .create_index(
                Index::create()
                    .name("idx_company_created_at")
                    .table(Company::Table)
                    .col(Company::CreatedAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_institute_created_at")
                    .table(Institute::Table)
                    .col(Institute::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_user_company").table(User::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_user_institute").table(User::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_institute_company").table(Institute::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_company_created_at").table(Company::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_institute_created_at").table(Institute::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum User { Table, CompanyId, InstituteId }

#[derive(DeriveIden)]
enum Institute { Table, CompanyId, CreatedAt }

#[derive(DeriveIden)]
enum Company { Table, CreatedAt }
