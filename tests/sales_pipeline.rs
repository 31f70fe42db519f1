use anyhow::{Context, Result};
use chrono::Utc;
use crm_tests::{Postgres, exec};
use entity::{account, contact_account, organization};
use migration::{Migrator, MigratorTrait};
use products_crm::{
    Contact, Customer, FormLifecycle, Opportunity, OpportunityFormCoordinator,
    OpportunityRelationsBuilder,
    store::{find_opportunity, load_enum_catalog, load_probability_table, save_opportunity},
};
use sea_orm::{ActiveValue::Set, EntityTrait, PaginatorTrait};
use testcontainers::clients::Cli;
use uuid::Uuid;

#[tokio::test]
async fn submitted_opportunity_persists_relations_and_survives_org_removal() -> Result<()> {
    let docker = Cli::default();
    let postgres = Postgres::start(&docker);
    let db = postgres.connect().await?;
    Migrator::up(&db, None).await?;

    let org_id = Uuid::new_v4();
    organization::Entity::insert(organization::ActiveModel {
        id: Set(org_id),
        name: Set("Northwind".into()),
        created_at: Set(Utc::now().into()),
    })
    .exec_without_returning(&db)
    .await?;

    let catalog = load_enum_catalog(&db).await?;
    let probabilities = load_probability_table(&db).await?;
    let coordinator =
        OpportunityFormCoordinator::new(&probabilities, &catalog, OpportunityRelationsBuilder);

    let mut opportunity = Opportunity {
        organization_id: Some(org_id),
        ..Opportunity::new("Fleet tracking")
    };
    coordinator.prepare(Some(&mut opportunity))?;
    assert_eq!(opportunity.probability, Some(0.1));

    opportunity.customer = Some(Customer {
        name: "Contoso".into(),
        ..Customer::default()
    });
    opportunity.contact = Some(Contact {
        first_name: "Grace".into(),
        last_name: Some("Hopper".into()),
        ..Contact::default()
    });
    coordinator.finalize(&mut opportunity)?;
    let id = save_opportunity(&db, &mut opportunity).await?;

    // a second submit must not duplicate the contact link
    coordinator.finalize(&mut opportunity)?;
    save_opportunity(&db, &mut opportunity).await?;
    assert_eq!(contact_account::Entity::find().count(&db).await?, 1);

    let stored = find_opportunity(&db, &catalog, id)
        .await?
        .context("opportunity missing")?;
    let customer = stored.customer.context("customer missing")?;
    assert_eq!(customer.organization_id, Some(org_id));
    let account_id = customer
        .account
        .and_then(|account| account.id)
        .context("account missing")?;

    exec(&db, &format!("DELETE FROM organization WHERE id = '{org_id}'")).await?;
    let account = account::Entity::find_by_id(account_id)
        .one(&db)
        .await?
        .context("account removed with its organization")?;
    assert_eq!(account.organization_id, None);
    Ok(())
}
