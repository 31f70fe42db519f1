pub use sea_orm_migration::prelude::*;

mod m20240301_000001_sales_init;
mod m20240315_000002_account_organization;
mod m20240320_000003_magento_addresses;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_sales_init::Migration),
            Box::new(m20240315_000002_account_organization::Migration),
            Box::new(m20240320_000003_magento_addresses::Migration),
        ]
    }
}
