//! Sales slice of the CRM: opportunities, their pipeline status enumeration,
//! and the form pipeline that defaults probabilities before display and
//! synchronizes relations after submission.

pub mod coordinator;
pub mod enum_value;
pub mod error;
pub mod form;
pub mod magento;
pub mod opportunity;
pub mod probability;
pub mod relations;
pub mod store;

pub use coordinator::{FormLifecycle, OpportunityFormCoordinator};
pub use enum_value::{EnumCatalog, EnumCode, EnumDefaultLookup, EnumValue, EnumValues};
pub use error::{SalesError, SalesResult};
pub use form::{FieldSpec, FormDefinition, Widget, opportunity_form};
pub use magento::MagentoAddress;
pub use opportunity::{AccountRef, Contact, Customer, Opportunity};
pub use probability::{ProbabilityLookup, ProbabilityTable};
pub use relations::{OpportunityRelationsBuilder, RelationBuilder};
