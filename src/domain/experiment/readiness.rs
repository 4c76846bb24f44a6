//! Launch readiness gate

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::draft::ExperimentDraft;
use super::validation::DesignValidationError;

/// Pass/fail decision with every blocking reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchReadiness {
    pub ready: bool,
    pub blockers: Vec<DesignValidationError>,
}

impl LaunchReadiness {
    fn from_blockers(blockers: Vec<DesignValidationError>) -> Self {
        Self {
            ready: blockers.is_empty(),
            blockers,
        }
    }
}

/// Aggregates every structural and statistical prerequisite for launch
#[derive(Debug, Clone, Copy, Default)]
pub struct LaunchReadinessGate;

impl LaunchReadinessGate {
    /// Run every check; failures are collected, never short-circuited
    pub fn evaluate(draft: &ExperimentDraft) -> LaunchReadiness {
        let mut blockers = draft.hypothesis().validate();
        blockers.extend(draft.variants().validate());
        blockers.extend(draft.metrics().validate());
        blockers.extend(draft.traffic_allocation().validate());
        blockers.extend(draft.validate_power_analysis());

        let readiness = LaunchReadiness::from_blockers(blockers);
        debug!(
            ready = readiness.ready,
            blockers = readiness.blockers.len(),
            "Evaluated launch readiness"
        );

        readiness
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::experiment::record::fixtures;
    use crate::domain::experiment::Field;

    #[test]
    fn test_ready_draft_passes() {
        let readiness = LaunchReadinessGate::evaluate(&fixtures::ready_draft());
        assert!(readiness.ready);
        assert!(readiness.blockers.is_empty());
    }

    #[test]
    fn test_fresh_draft_collects_every_blocker() {
        let readiness = LaunchReadinessGate::evaluate(&ExperimentDraft::default());

        assert!(!readiness.ready);
        assert_eq!(
            readiness.blockers,
            vec![
                DesignValidationError::MissingField(Field::Name),
                DesignValidationError::MissingField(Field::Statement),
                DesignValidationError::MetricNotSelected,
                DesignValidationError::PowerAnalysisMissing,
            ]
        );
    }

    #[test]
    fn test_invalid_traffic_blocks_launch() {
        let mut draft = fixtures::ready_draft();
        draft.set_traffic_allocation(4).unwrap();

        let readiness = LaunchReadinessGate::evaluate(&draft);
        assert!(!readiness.ready);
        assert_eq!(
            readiness.blockers,
            vec![
                DesignValidationError::InvalidTrafficAllocation(4),
                DesignValidationError::StalePowerAnalysis,
            ]
        );
    }

    #[test]
    fn test_readiness_serialization() {
        let readiness = LaunchReadinessGate::evaluate(&ExperimentDraft::default());
        let json = serde_json::to_value(&readiness).unwrap();

        assert_eq!(json["ready"], false);
        assert_eq!(json["blockers"][0]["kind"], "missing_field");
        assert_eq!(json["blockers"][0]["detail"], "name");
    }
}
