use std::collections::HashMap;

use crate::{
    enum_value::EnumValue,
    error::{SalesError, SalesResult},
};

/// Maps a pipeline status to the win probability a new opportunity in that
/// status should start with.
pub trait ProbabilityLookup {
    /// `None` when no probability is configured for the status.
    fn get(&self, status: &EnumValue) -> SalesResult<Option<f64>>;
}

impl<T: ProbabilityLookup + ?Sized> ProbabilityLookup for &T {
    fn get(&self, status: &EnumValue) -> SalesResult<Option<f64>> {
        (**self).get(status)
    }
}

/// Probabilities keyed by status id. Every stored value is within `0.0..=1.0`.
#[derive(Clone, Debug, Default)]
pub struct ProbabilityTable {
    by_status: HashMap<String, f64>,
}

impl ProbabilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, status_id: impl Into<String>, probability: f64) -> SalesResult<()> {
        let status_id = status_id.into();
        if !(0.0..=1.0).contains(&probability) {
            return Err(SalesError::ProbabilityOutOfRange {
                status: status_id,
                value: probability,
            });
        }
        self.by_status.insert(status_id, probability);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.by_status.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_status.is_empty()
    }
}

impl ProbabilityLookup for ProbabilityTable {
    fn get(&self, status: &EnumValue) -> SalesResult<Option<f64>> {
        Ok(self.by_status.get(status.id()).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_values_outside_unit_interval() {
        let mut table = ProbabilityTable::new();
        assert!(table.insert("won", 1.0).is_ok());
        assert!(table.insert("lost", 0.0).is_ok());
        let err = table.insert("negotiation", 1.5).unwrap_err();
        assert!(matches!(
            err,
            SalesError::ProbabilityOutOfRange { ref status, value } if status == "negotiation" && value == 1.5
        ));
        assert!(table.insert("broken", f64::NAN).is_err());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn unconfigured_status_has_no_probability() {
        let mut table = ProbabilityTable::new();
        table.insert("in_progress", 0.1).unwrap();
        let open = EnumValue::new("in_progress", "Open", 1, true);
        let stalled = EnumValue::new("stalled", "Stalled", 9, false);
        assert_eq!(table.get(&open).unwrap(), Some(0.1));
        assert_eq!(table.get(&stalled).unwrap(), None);
    }
}
