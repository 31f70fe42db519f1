//! Two-phase form pipeline for opportunities.
//!
//! `prepare` runs before a record is presented and fills in a default
//! probability for brand-new opportunities; `finalize` runs after submitted
//! data has been bound and hands the record to the relation builder.
//! Collaborator errors pass through untouched.

use tracing::{debug, instrument};

use crate::{
    enum_value::{EnumDefaultLookup, EnumValue},
    error::SalesResult,
    opportunity::{OPPORTUNITY_CLASS, Opportunity, STATUS_FIELD},
    probability::ProbabilityLookup,
    relations::RelationBuilder,
};

/// Hooks a form-processing pipeline calls around a bound record.
pub trait FormLifecycle<T> {
    /// Before the record is presented. `None` when the form has no data yet.
    fn prepare(&self, data: Option<&mut T>) -> SalesResult<()>;

    /// After submitted data has been bound and validated.
    fn finalize(&self, data: &mut T) -> SalesResult<()>;
}

pub struct OpportunityFormCoordinator<P, E, R> {
    probabilities: P,
    enums: E,
    relations: R,
}

impl<P, E, R> OpportunityFormCoordinator<P, E, R>
where
    P: ProbabilityLookup,
    E: EnumDefaultLookup,
    R: RelationBuilder,
{
    pub fn new(probabilities: P, enums: E, relations: R) -> Self {
        Self {
            probabilities,
            enums,
            relations,
        }
    }

    /// Gives a new opportunity the probability of its status, or of the
    /// default status when it has none. Persisted records and records with an
    /// explicit probability are left alone.
    #[instrument(name = "opportunity.default_probability", skip_all)]
    pub fn populate_default_probability(
        &self,
        opportunity: Option<&mut Opportunity>,
    ) -> SalesResult<()> {
        let Some(opportunity) = opportunity else {
            return Ok(());
        };
        if opportunity.id.is_some() || opportunity.probability.is_some() {
            return Ok(());
        }

        let status = match opportunity.status.clone() {
            Some(status) => status,
            None => match self.resolve_default_status(OPPORTUNITY_CLASS, STATUS_FIELD)? {
                Some(status) => status,
                None => {
                    debug!("no status and no default status; probability left empty");
                    return Ok(());
                }
            },
        };

        opportunity.probability = self.probabilities.get(&status)?;
        debug!(
            status = status.id(),
            probability = ?opportunity.probability,
            "default probability applied"
        );
        Ok(())
    }

    /// First value flagged default in the enumeration bound to the field.
    /// Several defaults are tolerated; the first in sequence order wins.
    pub fn resolve_default_status(
        &self,
        entity_class: &str,
        field_name: &str,
    ) -> SalesResult<Option<EnumValue>> {
        let Some(code) = self.enums.enum_code(entity_class, field_name)? else {
            return Ok(None);
        };
        Ok(self.enums.default_values(&code)?.into_first())
    }

    #[instrument(name = "opportunity.submit", skip_all, fields(opportunity = ?opportunity.id))]
    pub fn on_submit(&self, opportunity: &mut Opportunity) -> SalesResult<()> {
        self.relations.build_all(opportunity)
    }
}

impl<P, E, R> FormLifecycle<Opportunity> for OpportunityFormCoordinator<P, E, R>
where
    P: ProbabilityLookup,
    E: EnumDefaultLookup,
    R: RelationBuilder,
{
    fn prepare(&self, data: Option<&mut Opportunity>) -> SalesResult<()> {
        self.populate_default_probability(data)
    }

    fn finalize(&self, data: &mut Opportunity) -> SalesResult<()> {
        self.on_submit(data)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use uuid::Uuid;

    use super::*;
    use crate::{
        enum_value::{EnumCatalog, EnumCode, EnumValues},
        error::SalesError,
        opportunity::{STATUS_ENUM_CODE, status_enum_code},
        probability::ProbabilityTable,
    };

    #[derive(Default)]
    struct RecordingRelations {
        calls: Cell<usize>,
        seen: RefCell<Vec<*const Opportunity>>,
        fail: bool,
    }

    impl RelationBuilder for RecordingRelations {
        fn build_all(&self, opportunity: &mut Opportunity) -> SalesResult<()> {
            self.calls.set(self.calls.get() + 1);
            self.seen.borrow_mut().push(opportunity as *const Opportunity);
            if self.fail {
                return Err(SalesError::Relation("customer locked".into()));
            }
            Ok(())
        }
    }

    struct FailingProbabilities;

    impl ProbabilityLookup for FailingProbabilities {
        fn get(&self, _status: &EnumValue) -> SalesResult<Option<f64>> {
            Err(SalesError::UnknownEnumCode("probability store offline".into()))
        }
    }

    /// Returns fixed defaults for whatever code it is asked about.
    struct FixedDefaults(Vec<EnumValue>);

    impl EnumDefaultLookup for FixedDefaults {
        fn enum_code(
            &self,
            _entity_class: &str,
            _field_name: &str,
        ) -> SalesResult<Option<EnumCode>> {
            Ok(Some(status_enum_code()))
        }

        fn default_values(&self, _code: &EnumCode) -> SalesResult<EnumValues> {
            Ok(EnumValues::new(self.0.clone()))
        }
    }

    fn open() -> EnumValue {
        EnumValue::new("in_progress", "Open", 1, true)
    }

    fn negotiation() -> EnumValue {
        EnumValue::new("negotiation", "Negotiation", 5, false)
    }

    fn probabilities() -> ProbabilityTable {
        let mut table = ProbabilityTable::new();
        table.insert("in_progress", 0.25).unwrap();
        table.insert("negotiation", 0.8).unwrap();
        table
    }

    fn catalog_with_default(default: Option<EnumValue>) -> EnumCatalog {
        let mut catalog = EnumCatalog::new();
        catalog.bind(OPPORTUNITY_CLASS, STATUS_FIELD, status_enum_code());
        catalog.insert_value(status_enum_code(), negotiation());
        if let Some(value) = default {
            catalog.insert_value(EnumCode::new(STATUS_ENUM_CODE), value);
        }
        catalog
    }

    #[test]
    fn absent_opportunity_is_a_no_op() {
        let relations = RecordingRelations::default();
        let coordinator = OpportunityFormCoordinator::new(
            probabilities(),
            catalog_with_default(Some(open())),
            &relations,
        );
        coordinator.populate_default_probability(None).unwrap();
        assert_eq!(relations.calls.get(), 0);
    }

    #[test]
    fn persisted_opportunity_is_never_touched() {
        let coordinator = OpportunityFormCoordinator::new(
            probabilities(),
            catalog_with_default(Some(open())),
            RecordingRelations::default(),
        );
        for probability in [None, Some(0.9)] {
            let mut opportunity = Opportunity {
                id: Some(Uuid::from_u128(42)),
                status: Some(negotiation()),
                probability,
                ..Opportunity::new("Renewal")
            };
            let before = opportunity.clone();
            coordinator
                .populate_default_probability(Some(&mut opportunity))
                .unwrap();
            assert_eq!(opportunity, before);
        }
    }

    #[test]
    fn explicit_probability_is_kept() {
        let coordinator = OpportunityFormCoordinator::new(
            probabilities(),
            catalog_with_default(Some(open())),
            RecordingRelations::default(),
        );
        let mut opportunity = Opportunity {
            status: Some(negotiation()),
            probability: Some(0.05),
            ..Opportunity::new("Pilot")
        };
        coordinator
            .populate_default_probability(Some(&mut opportunity))
            .unwrap();
        assert_eq!(opportunity.probability, Some(0.05));
    }

    #[test]
    fn assigned_status_drives_probability() {
        let coordinator = OpportunityFormCoordinator::new(
            probabilities(),
            catalog_with_default(Some(open())),
            RecordingRelations::default(),
        );
        let mut opportunity = Opportunity {
            status: Some(negotiation()),
            ..Opportunity::new("Pilot")
        };
        coordinator
            .populate_default_probability(Some(&mut opportunity))
            .unwrap();
        assert_eq!(opportunity.probability, Some(0.8));
        assert_eq!(opportunity.status, Some(negotiation()));
    }

    #[test]
    fn missing_status_without_default_leaves_probability_empty() {
        let coordinator = OpportunityFormCoordinator::new(
            probabilities(),
            catalog_with_default(None),
            RecordingRelations::default(),
        );
        let mut opportunity = Opportunity::new("Pilot");
        coordinator
            .populate_default_probability(Some(&mut opportunity))
            .unwrap();
        assert_eq!(opportunity.probability, None);
    }

    #[test]
    fn unbound_status_field_leaves_probability_empty() {
        let coordinator = OpportunityFormCoordinator::new(
            probabilities(),
            EnumCatalog::new(),
            RecordingRelations::default(),
        );
        let mut opportunity = Opportunity::new("Pilot");
        coordinator
            .populate_default_probability(Some(&mut opportunity))
            .unwrap();
        assert_eq!(opportunity.probability, None);
    }

    #[test]
    fn default_status_drives_probability_for_new_record() {
        let coordinator = OpportunityFormCoordinator::new(
            probabilities(),
            catalog_with_default(Some(open())),
            RecordingRelations::default(),
        );
        let mut opportunity = Opportunity::new("Pilot");
        coordinator
            .populate_default_probability(Some(&mut opportunity))
            .unwrap();
        assert_eq!(opportunity.probability, Some(0.25));
        assert!(opportunity.status.is_none());
    }

    #[test]
    fn first_of_several_defaults_wins() {
        let coordinator = OpportunityFormCoordinator::new(
            probabilities(),
            FixedDefaults(vec![negotiation(), open()]),
            RecordingRelations::default(),
        );
        let resolved = coordinator
            .resolve_default_status(OPPORTUNITY_CLASS, STATUS_FIELD)
            .unwrap();
        assert_eq!(resolved, Some(negotiation()));

        let mut opportunity = Opportunity::new("Pilot");
        coordinator
            .populate_default_probability(Some(&mut opportunity))
            .unwrap();
        assert_eq!(opportunity.probability, Some(0.8));
    }

    #[test]
    fn status_without_configured_probability_stays_empty() {
        let coordinator = OpportunityFormCoordinator::new(
            ProbabilityTable::new(),
            catalog_with_default(Some(open())),
            RecordingRelations::default(),
        );
        let mut opportunity = Opportunity::new("Pilot");
        coordinator
            .populate_default_probability(Some(&mut opportunity))
            .unwrap();
        assert_eq!(opportunity.probability, None);
    }

    #[test]
    fn lookup_errors_propagate_unchanged() {
        let coordinator = OpportunityFormCoordinator::new(
            FailingProbabilities,
            catalog_with_default(Some(open())),
            RecordingRelations::default(),
        );
        let mut opportunity = Opportunity::new("Pilot");
        let err = coordinator
            .populate_default_probability(Some(&mut opportunity))
            .unwrap_err();
        assert!(matches!(
            err,
            SalesError::UnknownEnumCode(msg) if msg == "probability store offline"
        ));
        assert_eq!(opportunity.probability, None);
    }

    #[test]
    fn submit_builds_relations_once_for_the_bound_instance() {
        let relations = RecordingRelations::default();
        let coordinator = OpportunityFormCoordinator::new(
            probabilities(),
            catalog_with_default(Some(open())),
            &relations,
        );
        let mut opportunity = Opportunity {
            id: Some(Uuid::new_v4()),
            ..Opportunity::new("Renewal")
        };
        coordinator.finalize(&mut opportunity).unwrap();

        assert_eq!(relations.calls.get(), 1);
        assert_eq!(
            relations.seen.borrow().as_slice(),
            &[&opportunity as *const Opportunity]
        );
    }

    #[test]
    fn submit_propagates_relation_failures() {
        let relations = RecordingRelations {
            fail: true,
            ..RecordingRelations::default()
        };
        let coordinator = OpportunityFormCoordinator::new(
            probabilities(),
            catalog_with_default(Some(open())),
            &relations,
        );
        let mut opportunity = Opportunity::new("Renewal");
        let err = coordinator.on_submit(&mut opportunity).unwrap_err();
        assert!(matches!(err, SalesError::Relation(_)));
        assert_eq!(relations.calls.get(), 1);
    }

    #[test]
    fn prepare_then_finalize_runs_both_phases() {
        let relations = RecordingRelations::default();
        let coordinator = OpportunityFormCoordinator::new(
            probabilities(),
            catalog_with_default(Some(open())),
            &relations,
        );
        let mut opportunity = Opportunity::new("Pilot");
        coordinator.prepare(Some(&mut opportunity)).unwrap();
        coordinator.finalize(&mut opportunity).unwrap();
        assert_eq!(opportunity.probability, Some(0.25));
        assert_eq!(relations.calls.get(), 1);
    }
}
