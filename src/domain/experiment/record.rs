//! Immutable snapshot of a launched experiment

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::draft::ExperimentDraft;
use super::hypothesis::HypothesisSpec;
use super::metric::MetricSelection;
use super::power::PowerAnalysisResult;
use super::variant::Variant;

// ============================================================================
// ExperimentId
// ============================================================================

/// Unique identifier assigned to an experiment at launch
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExperimentId(String);

impl ExperimentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new unique ID
    pub fn generate() -> Self {
        Self(format!("exp-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ExperimentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for ExperimentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ExperimentRecord
// ============================================================================

/// A launched experiment as handed to the experimentation runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRecord {
    id: ExperimentId,
    hypothesis: HypothesisSpec,
    variants: Vec<Variant>,
    metric_selection: MetricSelection,
    traffic_allocation_percent: u32,
    power_analysis_result: PowerAnalysisResult,
    launched_at: DateTime<Utc>,
}

impl ExperimentRecord {
    /// Snapshot a draft that has passed the readiness gate
    pub(crate) fn freeze(
        draft: &ExperimentDraft,
        power_analysis_result: PowerAnalysisResult,
        launched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ExperimentId::generate(),
            hypothesis: draft.hypothesis().clone(),
            variants: draft.variants().variants().to_vec(),
            metric_selection: draft.metrics().clone(),
            traffic_allocation_percent: draft.traffic_allocation().percent(),
            power_analysis_result,
            launched_at,
        }
    }

    pub fn id(&self) -> &ExperimentId {
        &self.id
    }

    pub fn hypothesis(&self) -> &HypothesisSpec {
        &self.hypothesis
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn metric_selection(&self) -> &MetricSelection {
        &self.metric_selection
    }

    pub fn traffic_allocation_percent(&self) -> u32 {
        self.traffic_allocation_percent
    }

    pub fn power_analysis_result(&self) -> &PowerAnalysisResult {
        &self.power_analysis_result
    }

    pub fn launched_at(&self) -> DateTime<Utc> {
        self.launched_at
    }

    /// Review summary shown before and after launch
    pub fn summary(&self) -> LaunchSummary {
        LaunchSummary {
            name: self.hypothesis.name().to_string(),
            statement: self.hypothesis.statement().to_string(),
            variant_count: self.variants.len(),
            traffic_allocation_percent: self.traffic_allocation_percent,
            primary_metric: self
                .metric_selection
                .primary_label()
                .or(self.metric_selection.primary())
                .unwrap_or_default()
                .to_string(),
            duration_days: self.power_analysis_result.duration_days,
        }
    }
}

/// Condensed view of a launched experiment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchSummary {
    pub name: String,
    pub statement: String,
    pub variant_count: usize,
    pub traffic_allocation_percent: u32,
    pub primary_metric: String,
    pub duration_days: u64,
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Shared drafts and records for tests

    use super::*;

    pub fn power_result(number_of_variants: usize, traffic: u32) -> PowerAnalysisResult {
        PowerAnalysisResult {
            sample_size_per_variant: 3841,
            total_sample_size: 3841 * number_of_variants as u64,
            duration_days: 2,
            baseline_rate: 0.10,
            minimum_detectable_effect: 0.20,
            desired_power: 0.80,
            significance_level: 0.95,
            number_of_variants,
            traffic_allocation_percent: traffic,
            primary_metric: Some("conversion".to_string()),
        }
    }

    /// A draft that satisfies every launch prerequisite
    pub fn ready_draft() -> ExperimentDraft {
        let mut draft = ExperimentDraft::default();
        draft
            .hypothesis_mut()
            .unwrap()
            .set_name("Checkout CTA Color Test")
            .unwrap();
        draft
            .hypothesis_mut()
            .unwrap()
            .set_statement(
                "If we change the checkout button color to blue, then conversion rate will \
                 increase because blue conveys trust",
            )
            .unwrap();
        draft.metrics_mut().unwrap().set_primary("conversion").unwrap();
        draft.metrics_mut().unwrap().toggle_secondary("aov").unwrap();
        draft.set_power_analysis(power_result(2, 50)).unwrap();
        draft
    }

    pub fn sample_record() -> ExperimentRecord {
        let draft = ready_draft();
        ExperimentRecord::freeze(&draft, power_result(2, 50), Utc::now())
    }
}
