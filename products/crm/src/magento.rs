use serde::{Serialize, Serializer};
use uuid::Uuid;

/// Postal address of a Magento customer, tagged with address types such as
/// `billing` or `shipping`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MagentoAddress {
    pub id: Option<Uuid>,
    #[serde(skip)]
    owner: Option<Uuid>,
    pub label: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country_code: Option<String>,
    pub primary: bool,
    /// Exposed as a nillable string list: no types serializes as `null`.
    #[serde(serialize_with = "nillable_list")]
    types: Vec<String>,
}

impl MagentoAddress {
    pub fn set_owner(&mut self, owner: Option<Uuid>) {
        self.owner = owner;
    }

    pub fn owner(&self) -> Option<Uuid> {
        self.owner
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.types.iter().any(|existing| existing == name)
    }

    pub fn add_type(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.has_type(&name) {
            self.types.push(name);
        }
    }

    pub fn remove_type(&mut self, name: &str) {
        self.types.retain(|existing| existing != name);
    }
}

fn nillable_list<S: Serializer>(values: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    if values.is_empty() {
        serializer.serialize_none()
    } else {
        serializer.collect_seq(values)
    }
}
