use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enum_value::{EnumCode, EnumValue};

/// Entity class name used for enum bindings and ownership metadata.
pub const OPPORTUNITY_CLASS: &str = "crm.sales.opportunity";
pub const STATUS_FIELD: &str = "status";
pub const STATUS_ENUM_CODE: &str = "opportunity_status";

pub fn status_enum_code() -> EnumCode {
    EnumCode::new(STATUS_ENUM_CODE)
}

/// A sales-pipeline record tracking a potential deal.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    /// Present only once persisted.
    pub id: Option<Uuid>,
    pub name: String,
    pub status: Option<EnumValue>,
    /// Fraction in `0.0..=1.0`.
    pub probability: Option<f64>,
    pub close_reason: Option<String>,
    pub contact: Option<Contact>,
    pub customer: Option<Customer>,
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

impl Opportunity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }
}

/// Business customer the opportunity is negotiated with.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Option<Uuid>,
    pub name: String,
    pub account: Option<AccountRef>,
    pub data_channel_id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: Option<Uuid>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub accounts: Vec<AccountRef>,
}

impl Contact {
    pub fn has_account(&self, account: &AccountRef) -> bool {
        self.accounts.iter().any(|existing| existing.same_as(account))
    }
}

/// An account, either persisted or pending creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    pub id: Option<Uuid>,
    pub name: String,
    pub organization_id: Option<Uuid>,
}

impl AccountRef {
    /// Persisted accounts compare by id; pending ones by name.
    pub fn same_as(&self, other: &AccountRef) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.name == other.name,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_opportunity_has_no_identity() {
        let opportunity = Opportunity::new("Renewal");
        assert!(opportunity.is_new());
        assert!(opportunity.probability.is_none());
    }

    #[test]
    fn accounts_match_by_id_once_persisted() {
        let id = Uuid::new_v4();
        let stored = AccountRef {
            id: Some(id),
            name: "ACME".into(),
            organization_id: None,
        };
        let renamed = AccountRef {
            name: "ACME Holdings".into(),
            ..stored.clone()
        };
        let pending = AccountRef {
            id: None,
            ..stored.clone()
        };
        assert!(stored.same_as(&renamed));
        assert!(!stored.same_as(&pending));
        assert!(pending.same_as(&pending.clone()));
    }
}
