use tracing::debug;

use crate::{
    error::{SalesError, SalesResult},
    opportunity::{AccountRef, Opportunity},
};

/// Derives or synchronizes records associated with an opportunity from its
/// current field values.
pub trait RelationBuilder {
    fn build_all(&self, opportunity: &mut Opportunity) -> SalesResult<()>;
}

impl<T: RelationBuilder + ?Sized> RelationBuilder for &T {
    fn build_all(&self, opportunity: &mut Opportunity) -> SalesResult<()> {
        (**self).build_all(opportunity)
    }
}

/// Keeps the customer and contact consistent with the opportunity: the
/// customer inherits channel, organization and owner when it has none, gets an
/// account named after itself when missing, and the contact joins that account.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpportunityRelationsBuilder;

impl OpportunityRelationsBuilder {
    /// Fails when an account has to be created for a customer without a name.
    pub fn build_customer(&self, opportunity: &mut Opportunity) -> SalesResult<()> {
        let data_channel_id = opportunity.data_channel_id;
        let organization_id = opportunity.organization_id;
        let owner_id = opportunity.owner_id;
        let Some(customer) = opportunity.customer.as_mut() else {
            return Ok(());
        };

        if customer.data_channel_id.is_none() {
            customer.data_channel_id = data_channel_id;
        }
        if customer.organization_id.is_none() {
            customer.organization_id = organization_id;
        }
        if customer.owner_id.is_none() {
            customer.owner_id = owner_id;
        }
        if customer.account.is_none() {
            if customer.name.trim().is_empty() {
                return Err(SalesError::Relation(
                    "customer without a name cannot get an account".into(),
                ));
            }
            debug!(customer = %customer.name, "creating account for customer");
            customer.account = Some(AccountRef {
                id: None,
                name: customer.name.clone(),
                organization_id: customer.organization_id,
            });
        }
        Ok(())
    }

    pub fn build_account(&self, opportunity: &mut Opportunity) {
        let Some(account) = opportunity
            .customer
            .as_ref()
            .and_then(|customer| customer.account.clone())
        else {
            return;
        };
        let Some(contact) = opportunity.contact.as_mut() else {
            return;
        };
        if !contact.has_account(&account) {
            debug!(account = %account.name, "linking contact to customer account");
            contact.accounts.push(account);
        }
    }
}

impl RelationBuilder for OpportunityRelationsBuilder {
    fn build_all(&self, opportunity: &mut Opportunity) -> SalesResult<()> {
        self.build_customer(opportunity)?;
        self.build_account(opportunity);
        Ok(())
    }
}
