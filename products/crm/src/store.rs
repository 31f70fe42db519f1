//! sea-orm persistence for the sales slice: loads the request-scoped lookup
//! snapshots and reads/writes opportunities with their customer and contact.

use chrono::Utc;
use entity::{
    account, address_type, b2b_customer, contact, contact_account, enum_binding, enum_value,
    magento_address, opportunity, opportunity_status_probability,
};
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Set, Unchanged},
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, ModelTrait,
    QueryOrder, TransactionTrait,
    prelude::DateTimeWithTimeZone,
    sea_query::OnConflict,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    enum_value::{EnumCatalog, EnumCode, EnumValue},
    error::{SalesError, SalesResult},
    magento::MagentoAddress,
    opportunity::{AccountRef, Contact, Customer, Opportunity, status_enum_code},
    probability::ProbabilityTable,
};

pub async fn load_probability_table<C: ConnectionTrait>(
    db: &C,
) -> SalesResult<ProbabilityTable> {
    let rows = opportunity_status_probability::Entity::find().all(db).await?;
    let mut table = ProbabilityTable::new();
    for row in rows {
        table.insert(row.status_id, row.probability)?;
    }
    Ok(table)
}

pub async fn load_enum_catalog<C: ConnectionTrait>(db: &C) -> SalesResult<EnumCatalog> {
    let mut catalog = EnumCatalog::new();
    for binding in enum_binding::Entity::find().all(db).await? {
        catalog.bind(
            binding.entity_class,
            binding.field_name,
            EnumCode::new(binding.enum_code),
        );
    }
    let values = enum_value::Entity::find()
        .order_by_asc(enum_value::Column::Code)
        .order_by_asc(enum_value::Column::Priority)
        .all(db)
        .await?;
    for value in values {
        catalog.insert_value(
            EnumCode::new(value.code),
            EnumValue::new(value.id, value.name, value.priority, value.is_default),
        );
    }
    Ok(catalog)
}

/// Loads an opportunity with its customer (and account) and contact (and
/// accounts). The status is resolved against `catalog`.
#[instrument(skip(db, catalog))]
pub async fn find_opportunity<C: ConnectionTrait>(
    db: &C,
    catalog: &EnumCatalog,
    id: Uuid,
) -> SalesResult<Option<Opportunity>> {
    let Some(model) = opportunity::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    let status = match model.status_id.as_deref() {
        Some(status_id) => Some(catalog.find(&status_enum_code(), status_id)?),
        None => None,
    };

    let customer = match model.customer_id {
        Some(customer_id) => find_customer(db, customer_id).await?,
        None => None,
    };

    let contact = match model.contact_id {
        Some(contact_id) => find_contact(db, contact_id).await?,
        None => None,
    };

    Ok(Some(Opportunity {
        id: Some(model.id),
        name: model.name,
        status,
        probability: model.probability,
        close_reason: model.close_reason_name,
        contact,
        customer,
        data_channel_id: model.data_channel_id,
        organization_id: model.organization_id,
        owner_id: model.owner_id,
        close_date: model.close_date,
        budget_amount_cents: model.budget_amount_cents,
        close_revenue_cents: model.close_revenue_cents,
        customer_need: model.customer_need,
        proposed_solution: model.proposed_solution,
        notes: model.notes,
    }))
}

/// Loads a customer with its account.
pub async fn find_customer<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> SalesResult<Option<Customer>> {
    let Some(model) = b2b_customer::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    let account = match model.account_id {
        Some(account_id) => account::Entity::find_by_id(account_id)
            .one(db)
            .await?
            .map(account_ref),
        None => None,
    };
    Ok(Some(Customer {
        id: Some(model.id),
        name: model.name,
        account,
        data_channel_id: model.data_channel_id,
        organization_id: model.organization_id,
        owner_id: model.owner_id,
    }))
}

pub async fn find_contact<C: ConnectionTrait>(db: &C, id: Uuid) -> SalesResult<Option<Contact>> {
    let Some(model) = contact::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    let accounts = model
        .find_related(account::Entity)
        .order_by_asc(account::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(account_ref)
        .collect();
    Ok(Some(Contact {
        id: Some(model.id),
        first_name: model.first_name,
        last_name: model.last_name,
        accounts,
    }))
}

fn account_ref(model: account::Model) -> AccountRef {
    AccountRef {
        id: Some(model.id),
        name: model.name,
        organization_id: model.organization_id,
    }
}

/// Persists the opportunity and everything the relation builder attached to
/// it in one transaction. Identities assigned on insert are written back.
#[instrument(skip_all, fields(opportunity = ?opportunity.id))]
pub async fn save_opportunity(
    db: &DatabaseConnection,
    opportunity: &mut Opportunity,
) -> SalesResult<Uuid> {
    let txn = db.begin().await?;
    let now: DateTimeWithTimeZone = Utc::now().into();

    let mut customer_account = None;
    if let Some(customer) = opportunity.customer.as_mut() {
        if let Some(account) = customer.account.as_mut() {
            persist_account(&txn, account, now).await?;
            customer_account = Some(account.clone());
        }
        persist_customer(&txn, customer, now).await?;
    }

    if let Some(contact) = opportunity.contact.as_mut() {
        for account in contact.accounts.iter_mut() {
            let shared = customer_account
                .as_ref()
                .filter(|saved| account.id.is_none() && saved.name == account.name);
            if let Some(saved) = shared {
                account.id = saved.id;
            }
            persist_account(&txn, account, now).await?;
        }
        persist_contact(&txn, contact, now).await?;
    }

    let id = persist_opportunity(&txn, opportunity, now).await?;
    txn.commit().await?;
    info!(opportunity = %id, "opportunity saved");
    Ok(id)
}

async fn persist_account(
    txn: &DatabaseTransaction,
    account: &mut AccountRef,
    now: DateTimeWithTimeZone,
) -> SalesResult<()> {
    if account.id.is_some() {
        return Ok(());
    }
    let id = Uuid::new_v4();
    let active = account::ActiveModel {
        id: Set(id),
        name: Set(account.name.clone()),
        organization_id: Set(account.organization_id),
        owner_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    account::Entity::insert(active)
        .exec_without_returning(txn)
        .await?;
    account.id = Some(id);
    Ok(())
}

async fn persist_customer(
    txn: &DatabaseTransaction,
    customer: &mut Customer,
    now: DateTimeWithTimeZone,
) -> SalesResult<()> {
    let account_id = customer.account.as_ref().and_then(|account| account.id);
    let mut active = b2b_customer::ActiveModel {
        id: NotSet,
        name: Set(customer.name.clone()),
        account_id: Set(account_id),
        data_channel_id: Set(customer.data_channel_id),
        organization_id: Set(customer.organization_id),
        owner_id: Set(customer.owner_id),
        created_at: NotSet,
        updated_at: Set(now),
    };
    match customer.id {
        Some(id) => {
            active.id = Unchanged(id);
            active.update(txn).await?;
        }
        None => {
            let id = Uuid::new_v4();
            active.id = Set(id);
            active.created_at = Set(now);
            b2b_customer::Entity::insert(active)
                .exec_without_returning(txn)
                .await?;
            customer.id = Some(id);
        }
    }
    Ok(())
}

async fn persist_contact(
    txn: &DatabaseTransaction,
    contact: &mut Contact,
    now: DateTimeWithTimeZone,
) -> SalesResult<()> {
    let mut active = contact::ActiveModel {
        id: NotSet,
        first_name: Set(contact.first_name.clone()),
        last_name: Set(contact.last_name.clone()),
        email: NotSet,
        created_at: NotSet,
        updated_at: Set(now),
    };
    let contact_id = match contact.id {
        Some(id) => {
            active.id = Unchanged(id);
            active.update(txn).await?;
            id
        }
        None => {
            let id = Uuid::new_v4();
            active.id = Set(id);
            active.email = Set(None);
            active.created_at = Set(now);
            contact::Entity::insert(active)
                .exec_without_returning(txn)
                .await?;
            contact.id = Some(id);
            id
        }
    };

    let links: Vec<contact_account::ActiveModel> = contact
        .accounts
        .iter()
        .filter_map(|account| account.id)
        .map(|account_id| contact_account::ActiveModel {
            contact_id: Set(contact_id),
            account_id: Set(account_id),
        })
        .collect();
    if !links.is_empty() {
        contact_account::Entity::insert_many(links)
            .on_conflict(
                OnConflict::columns([
                    contact_account::Column::ContactId,
                    contact_account::Column::AccountId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(txn)
            .await?;
    }
    Ok(())
}

async fn persist_opportunity(
    txn: &DatabaseTransaction,
    opportunity: &mut Opportunity,
    now: DateTimeWithTimeZone,
) -> SalesResult<Uuid> {
    let mut active = opportunity::ActiveModel {
        id: NotSet,
        name: Set(opportunity.name.clone()),
        status_id: Set(opportunity.status.as_ref().map(|status| status.id().to_string())),
        probability: Set(opportunity.probability),
        close_reason_name: Set(opportunity.close_reason.clone()),
        contact_id: Set(opportunity.contact.as_ref().and_then(|contact| contact.id)),
        customer_id: Set(opportunity.customer.as_ref().and_then(|customer| customer.id)),
        data_channel_id: Set(opportunity.data_channel_id),
        organization_id: Set(opportunity.organization_id),
        owner_id: Set(opportunity.owner_id),
        close_date: Set(opportunity.close_date),
        budget_amount_cents: Set(opportunity.budget_amount_cents),
        close_revenue_cents: Set(opportunity.close_revenue_cents),
        customer_need: Set(opportunity.customer_need.clone()),
        proposed_solution: Set(opportunity.proposed_solution.clone()),
        notes: Set(opportunity.notes.clone()),
        created_at: NotSet,
        updated_at: Set(now),
    };
    match opportunity.id {
        Some(id) => {
            let exists = opportunity::Entity::find_by_id(id).one(txn).await?.is_some();
            if !exists {
                return Err(SalesError::NotFound {
                    entity: "opportunity",
                    id,
                });
            }
            active.id = Unchanged(id);
            active.update(txn).await?;
            Ok(id)
        }
        None => {
            let id = Uuid::new_v4();
            active.id = Set(id);
            active.created_at = Set(now);
            opportunity::Entity::insert(active)
                .exec_without_returning(txn)
                .await?;
            opportunity.id = Some(id);
            Ok(id)
        }
    }
}

/// Loads a Magento customer address with its type names, sorted.
pub async fn load_magento_address<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> SalesResult<Option<MagentoAddress>> {
    let Some(model) = magento_address::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    let types = model
        .find_related(address_type::Entity)
        .order_by_asc(address_type::Column::Name)
        .all(db)
        .await?;

    let mut address = MagentoAddress::default();
    address.id = Some(model.id);
    address.label = model.label;
    address.street = model.street;
    address.city = model.city;
    address.postal_code = model.postal_code;
    address.country_code = model.country_code;
    address.primary = model.is_primary;
    address.set_owner(model.owner_id);
    for address_type in types {
        address.add_type(address_type.name);
    }
    Ok(Some(address))
}
