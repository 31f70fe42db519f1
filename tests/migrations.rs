use anyhow::{Context, Result};
use crm_tests::{Postgres, query_one};
use entity::entity_ownership;
use migration::{Migrator, MigratorTrait};
use products_crm::{
    EnumDefaultLookup, EnumValue, ProbabilityLookup,
    opportunity::{OPPORTUNITY_CLASS, STATUS_FIELD},
    store::{load_enum_catalog, load_probability_table},
};
use sea_orm::EntityTrait;
use testcontainers::clients::Cli;

const ORGANIZATION_COLUMN: &str = "SELECT is_nullable::text AS is_nullable FROM information_schema.columns \
     WHERE table_name = 'account' AND column_name = 'organization_id'";
const ORGANIZATION_FK: &str = "SELECT update_rule::text AS update_rule, delete_rule::text AS delete_rule \
     FROM information_schema.referential_constraints \
     WHERE constraint_name = 'fk_account_organization'";

#[tokio::test]
async fn account_organization_migration_round_trips() -> Result<()> {
    let docker = Cli::default();
    let postgres = Postgres::start(&docker);
    let db = postgres.connect().await?;

    Migrator::up(&db, None).await?;

    let column = query_one(&db, ORGANIZATION_COLUMN)
        .await?
        .context("account.organization_id missing")?;
    assert_eq!(column.try_get::<String>("", "is_nullable")?, "YES");

    let fk = query_one(&db, ORGANIZATION_FK)
        .await?
        .context("fk_account_organization missing")?;
    assert_eq!(fk.try_get::<String>("", "delete_rule")?, "SET NULL");
    assert_eq!(fk.try_get::<String>("", "update_rule")?, "NO ACTION");

    let ownership = entity_ownership::Entity::find_by_id("crm.account")
        .one(&db)
        .await?
        .context("account ownership row missing")?;
    assert_eq!(ownership.owner_type, "USER");
    assert_eq!(ownership.organization_field_name.as_deref(), Some("organization"));
    assert_eq!(
        ownership.organization_column_name.as_deref(),
        Some("organization_id")
    );

    // magento addresses, then the account organization
    Migrator::down(&db, Some(2)).await?;
    assert!(query_one(&db, ORGANIZATION_COLUMN).await?.is_none());
    assert!(query_one(&db, ORGANIZATION_FK).await?.is_none());
    let ownership = entity_ownership::Entity::find_by_id("crm.account")
        .one(&db)
        .await?
        .context("account ownership row missing after rollback")?;
    assert_eq!(ownership.organization_field_name, None);
    assert_eq!(ownership.organization_column_name, None);

    Migrator::up(&db, None).await?;
    assert!(query_one(&db, ORGANIZATION_FK).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn seeded_statuses_drive_the_lookups() -> Result<()> {
    let docker = Cli::default();
    let postgres = Postgres::start(&docker);
    let db = postgres.connect().await?;
    Migrator::up(&db, None).await?;

    let catalog = load_enum_catalog(&db).await?;
    let code = catalog
        .enum_code(OPPORTUNITY_CLASS, STATUS_FIELD)?
        .context("status binding missing")?;
    let defaults = catalog.default_values(&code)?;
    let default = defaults.first().context("no default status")?;
    assert_eq!(default.id(), "in_progress");
    assert_eq!(defaults.len(), 1);

    let probabilities = load_probability_table(&db).await?;
    assert_eq!(probabilities.get(default)?, Some(0.1));
    let won = EnumValue::new("won", "Closed Won", 0, false);
    assert_eq!(probabilities.get(&won)?, Some(1.0));
    let lost = EnumValue::new("lost", "Closed Lost", 0, false);
    assert_eq!(probabilities.get(&lost)?, Some(0.0));
    Ok(())
}
