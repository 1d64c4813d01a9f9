//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_company;
mod m20250301_000002_create_institute;
mod m20250301_000003_create_user;
mod m20250301_000004_create_islamic_profile;
mod m20250301_000005_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_company::Migration),
            Box::new(m20250301_000002_create_institute::Migration),
            Box::new(m20250301_000003_create_user::Migration),
            Box::new(m20250301_000004_create_islamic_profile::Migration),
            // Indexes should always be applied last
            Box::new(m20250301_000005_add_indexes::Migration),
        ]
    }
}
