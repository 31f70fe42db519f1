//! GraphQL shapes for the opportunity form and the binding of submitted input
//! onto domain records.

use async_graphql::{InputObject, Json, MaybeUndefined, SimpleObject};
use chrono::NaiveDate;
use platform_api::ApiError;
use products_crm::{
    AccountRef, Contact, Customer, EnumCatalog, EnumValue, FieldSpec, MagentoAddress, Opportunity,
    SalesError, Widget,
    opportunity::status_enum_code,
    store::{find_contact, find_customer},
};
use sea_orm::ConnectionTrait;
use uuid::Uuid;

/// Maps domain failures onto the GraphQL error vocabulary.
pub fn api_error(err: SalesError) -> ApiError {
    match err {
        SalesError::NotFound { entity, .. } => ApiError::NotFound(entity),
        SalesError::UnknownStatus { .. }
        | SalesError::ProbabilityOutOfRange { .. }
        | SalesError::Relation(_) => ApiError::invalid(err.to_string()),
        SalesError::UnknownEnumCode(_) | SalesError::Db(_) => ApiError::internal(err.into()),
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub required: bool,
    pub not_null: bool,
    pub widget: Json<Widget>,
}

impl From<&FieldSpec> for FormField {
    fn from(field: &FieldSpec) -> Self {
        Self {
            name: field.name.to_string(),
            label: field.label.to_string(),
            required: field.required,
            not_null: field.not_null,
            widget: Json(field.widget),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct OpportunityForm {
    pub name: String,
    pub fields: Vec<FormField>,
    pub data: OpportunityNode,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct StatusNode {
    pub id: String,
    pub name: String,
    pub priority: i32,
    pub is_default: bool,
}

impl From<EnumValue> for StatusNode {
    fn from(value: EnumValue) -> Self {
        Self {
            id: value.id().to_string(),
            name: value.name().to_string(),
            priority: value.priority(),
            is_default: value.is_default(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct AccountNode {
    pub id: Option<Uuid>,
    pub name: String,
}

impl From<AccountRef> for AccountNode {
    fn from(account: AccountRef) -> Self {
        Self {
            id: account.id,
            name: account.name,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct CustomerNode {
    pub id: Option<Uuid>,
    pub name: String,
    pub account: Option<AccountNode>,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct ContactNode {
    pub id: Option<Uuid>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub accounts: Vec<AccountNode>,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct OpportunityNode {
    pub id: Option<Uuid>,
    pub name: String,
    pub status: Option<StatusNode>,
    pub probability: Option<f64>,
    pub close_reason: Option<String>,
    pub customer: Option<CustomerNode>,
    pub contact: Option<ContactNode>,
    pub data_channel_id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    pub close_date: Option<NaiveDate>,
    pub budget_amount_cents: Option<i64>,
    pub close_revenue_cents: Option<i64>,
    pub customer_need: Option<String>,
    pub proposed_solution: Option<String>,
    pub notes: Option<String>,
}

impl From<Opportunity> for OpportunityNode {
    fn from(opportunity: Opportunity) -> Self {
        Self {
            id: opportunity.id,
            name: opportunity.name,
            status: opportunity.status.map(StatusNode::from),
            probability: opportunity.probability,
            close_reason: opportunity.close_reason,
            customer: opportunity.customer.map(|customer| CustomerNode {
                id: customer.id,
                name: customer.name,
                account: customer.account.map(AccountNode::from),
            }),
            contact: opportunity.contact.map(|contact| ContactNode {
                id: contact.id,
                first_name: contact.first_name,
                last_name: contact.last_name,
                accounts: contact.accounts.into_iter().map(AccountNode::from).collect(),
            }),
            data_channel_id: opportunity.data_channel_id,
            organization_id: opportunity.organization_id,
            owner_id: opportunity.owner_id,
            close_date: opportunity.close_date,
            budget_amount_cents: opportunity.budget_amount_cents,
            close_revenue_cents: opportunity.close_revenue_cents,
            customer_need: opportunity.customer_need,
            proposed_solution: opportunity.proposed_solution,
            notes: opportunity.notes,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct MagentoAddressNode {
    pub id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    pub label: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country_code: Option<String>,
    pub primary: bool,
    /// Null when the address carries no type.
    pub types: Option<Vec<String>>,
}

impl From<MagentoAddress> for MagentoAddressNode {
    fn from(address: MagentoAddress) -> Self {
        let types = (!address.types().is_empty()).then(|| address.types().to_vec());
        Self {
            owner_id: address.owner(),
            types,
            id: address.id,
            label: address.label,
            street: address.street,
            city: address.city,
            postal_code: address.postal_code,
            country_code: address.country_code,
            primary: address.primary,
        }
    }
}

/// Either an existing record by id or a new one by name.
#[derive(Clone, Debug, InputObject)]
pub struct CustomerInput {
    pub id: Option<Uuid>,
    pub name: Option<String>,
}

#[derive(Clone, Debug, InputObject)]
pub struct ContactInput {
    pub id: Option<Uuid>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Clone, Debug, InputObject)]
pub struct OpportunityInput {
    pub id: Option<Uuid>,
    pub name: String,
    pub status_id: Option<String>,
    /// Omitted keeps the stored value; an explicit `null` clears it.
    pub probability: MaybeUndefined<f64>,
    pub close_reason: Option<String>,
    pub customer: Option<CustomerInput>,
    pub contact: Option<ContactInput>,
    pub data_channel_id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    pub close_date: Option<NaiveDate>,
    pub budget_amount_cents: Option<i64>,
    pub close_revenue_cents: Option<i64>,
    pub customer_need: Option<String>,
    pub proposed_solution: Option<String>,
    pub notes: Option<String>,
}

impl OpportunityInput {
    /// Copies submitted values onto `opportunity`. A probability left out of
    /// the input keeps whatever the record already holds; `null` clears it.
    pub async fn bind<C: ConnectionTrait>(
        self,
        db: &C,
        catalog: &EnumCatalog,
        opportunity: &mut Opportunity,
    ) -> Result<(), ApiError> {
        match self.probability {
            MaybeUndefined::Undefined => {}
            MaybeUndefined::Null => opportunity.probability = None,
            MaybeUndefined::Value(probability) => {
                if !(0.0..=1.0).contains(&probability) {
                    return Err(ApiError::invalid("probability must be within 0..=1"));
                }
                opportunity.probability = Some(probability);
            }
        }
        opportunity.status = match self.status_id.as_deref() {
            Some(status_id) => Some(
                catalog
                    .find(&status_enum_code(), status_id)
                    .map_err(api_error)?,
            ),
            None => None,
        };
        opportunity.customer = match self.customer {
            Some(input) => Some(bind_customer(db, input).await?),
            None => None,
        };
        opportunity.contact = match self.contact {
            Some(input) => Some(bind_contact(db, input).await?),
            None => None,
        };
        opportunity.name = self.name;
        opportunity.close_reason = self.close_reason;
        opportunity.data_channel_id = self.data_channel_id;
        opportunity.organization_id = self.organization_id;
        opportunity.owner_id = self.owner_id;
        opportunity.close_date = self.close_date;
        opportunity.budget_amount_cents = self.budget_amount_cents;
        opportunity.close_revenue_cents = self.close_revenue_cents;
        opportunity.customer_need = self.customer_need;
        opportunity.proposed_solution = self.proposed_solution;
        opportunity.notes = self.notes;
        Ok(())
    }
}

async fn bind_customer<C: ConnectionTrait>(
    db: &C,
    input: CustomerInput,
) -> Result<Customer, ApiError> {
    match input.id {
        Some(id) => {
            let mut customer = find_customer(db, id)
                .await
                .map_err(api_error)?
                .ok_or(ApiError::NotFound("customer"))?;
            if let Some(name) = input.name {
                customer.name = name;
            }
            Ok(customer)
        }
        None => {
            let name = input
                .name
                .filter(|name| !name.trim().is_empty())
                .ok_or_else(|| ApiError::invalid("new customer needs a name"))?;
            Ok(Customer {
                name,
                ..Customer::default()
            })
        }
    }
}

async fn bind_contact<C: ConnectionTrait>(db: &C, input: ContactInput) -> Result<Contact, ApiError> {
    match input.id {
        Some(id) => {
            let mut contact = find_contact(db, id)
                .await
                .map_err(api_error)?
                .ok_or(ApiError::NotFound("contact"))?;
            if let Some(first_name) = input.first_name {
                contact.first_name = first_name;
            }
            if input.last_name.is_some() {
                contact.last_name = input.last_name;
            }
            Ok(contact)
        }
        None => {
            let first_name = input
                .first_name
                .filter(|name| !name.trim().is_empty())
                .ok_or_else(|| ApiError::invalid("new contact needs a first name"))?;
            Ok(Contact {
                first_name,
                last_name: input.last_name,
                ..Contact::default()
            })
        }
    }
}
