//! sea-orm entity mappings for the CRM sales schema.

pub mod account;
pub mod address_type;
pub mod b2b_customer;
pub mod contact;
pub mod contact_account;
pub mod data_channel;
pub mod entity_ownership;
pub mod enum_binding;
pub mod enum_value;
pub mod magento_address;
pub mod magento_address_type;
pub mod magento_customer;
pub mod opportunity;
pub mod opportunity_close_reason;
pub mod opportunity_status_probability;
pub mod organization;
