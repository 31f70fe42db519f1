//! Data-driven enumerations: values live in storage, not in Rust enums, so
//! that administrators can add pipeline stages without a release.

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

use crate::error::{SalesError, SalesResult};

/// Identifies an enumeration, e.g. `opportunity_status`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnumCode(String);

impl EnumCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnumCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One immutable member of an enumeration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    id: String,
    name: String,
    priority: i32,
    is_default: bool,
}

impl EnumValue {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        priority: i32,
        is_default: bool,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            priority,
            is_default,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }
}

/// Ordered sequence of enum values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnumValues(Vec<EnumValue>);

impl EnumValues {
    /// Keeps the order the values were given in.
    pub fn new(values: Vec<EnumValue>) -> Self {
        Self(values)
    }

    /// Orders by priority, then id.
    pub fn sorted(mut values: Vec<EnumValue>) -> Self {
        values.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.id.cmp(&b.id)));
        Self(values)
    }

    pub fn first(&self) -> Option<&EnumValue> {
        self.0.first()
    }

    pub fn into_first(self) -> Option<EnumValue> {
        self.0.into_iter().next()
    }

    pub fn get(&self, id: &str) -> Option<&EnumValue> {
        self.0.iter().find(|value| value.id == id)
    }

    /// Values flagged default, in sequence order.
    pub fn defaults(&self) -> EnumValues {
        self.0.iter().filter(|value| value.is_default).cloned().collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EnumValue> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert_sorted(&mut self, value: EnumValue) {
        self.0.retain(|existing| existing.id != value.id);
        let key = (value.priority, value.id.as_str());
        let at = self
            .0
            .partition_point(|existing| (existing.priority, existing.id.as_str()) <= key);
        self.0.insert(at, value);
    }
}

impl FromIterator<EnumValue> for EnumValues {
    fn from_iter<I: IntoIterator<Item = EnumValue>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for EnumValues {
    type Item = EnumValue;
    type IntoIter = std::vec::IntoIter<EnumValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a EnumValues {
    type Item = &'a EnumValue;
    type IntoIter = std::slice::Iter<'a, EnumValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Resolves which enumeration backs an entity field and which of its values
/// are flagged default.
pub trait EnumDefaultLookup {
    /// `None` when the field is not enum-backed.
    fn enum_code(&self, entity_class: &str, field_name: &str) -> SalesResult<Option<EnumCode>>;

    fn default_values(&self, code: &EnumCode) -> SalesResult<EnumValues>;
}

impl<T: EnumDefaultLookup + ?Sized> EnumDefaultLookup for &T {
    fn enum_code(&self, entity_class: &str, field_name: &str) -> SalesResult<Option<EnumCode>> {
        (**self).enum_code(entity_class, field_name)
    }

    fn default_values(&self, code: &EnumCode) -> SalesResult<EnumValues> {
        (**self).default_values(code)
    }
}

/// In-memory snapshot of enum bindings and values.
#[derive(Clone, Debug, Default)]
pub struct EnumCatalog {
    bindings: HashMap<(String, String), EnumCode>,
    values: HashMap<EnumCode, EnumValues>,
}

impl EnumCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(
        &mut self,
        entity_class: impl Into<String>,
        field_name: impl Into<String>,
        code: EnumCode,
    ) {
        self.values.entry(code.clone()).or_default();
        self.bindings
            .insert((entity_class.into(), field_name.into()), code);
    }

    /// Adds or replaces a value, keeping the code's values ordered.
    pub fn insert_value(&mut self, code: EnumCode, value: EnumValue) {
        self.values.entry(code).or_default().insert_sorted(value);
    }

    pub fn values(&self, code: &EnumCode) -> Option<&EnumValues> {
        self.values.get(code)
    }

    pub fn find(&self, code: &EnumCode, id: &str) -> SalesResult<EnumValue> {
        let values = self
            .values
            .get(code)
            .ok_or_else(|| SalesError::UnknownEnumCode(code.to_string()))?;
        values.get(id).cloned().ok_or_else(|| SalesError::UnknownStatus {
            code: code.to_string(),
            status: id.to_string(),
        })
    }
}

impl EnumDefaultLookup for EnumCatalog {
    fn enum_code(&self, entity_class: &str, field_name: &str) -> SalesResult<Option<EnumCode>> {
        Ok(self
            .bindings
            .get(&(entity_class.to_string(), field_name.to_string()))
            .cloned())
    }

    fn default_values(&self, code: &EnumCode) -> SalesResult<EnumValues> {
        self.values
            .get(code)
            .map(EnumValues::defaults)
            .ok_or_else(|| SalesError::UnknownEnumCode(code.to_string()))
    }
}
