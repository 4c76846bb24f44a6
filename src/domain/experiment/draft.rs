//! Mutable aggregate edited by the design wizard

use serde::{Deserialize, Serialize};

use super::catalog::MetricCatalog;
use super::hypothesis::HypothesisSpec;
use super::metric::MetricSelection;
use super::power::PowerAnalysisResult;
use super::traffic::TrafficAllocation;
use super::validation::{DesignError, DesignValidationError};
use super::variant::VariantSet;

/// Everything collected by the wizard before launch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentDraft {
    hypothesis: HypothesisSpec,
    variants: VariantSet,
    metrics: MetricSelection,
    traffic_allocation: TrafficAllocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    power_analysis: Option<PowerAnalysisResult>,
    #[serde(skip)]
    frozen: bool,
}

impl ExperimentDraft {
    /// Create a draft with the default hypothesis type, two arms and 50% traffic
    pub fn new(catalog: MetricCatalog) -> Self {
        Self {
            hypothesis: HypothesisSpec::new(),
            variants: VariantSet::new(),
            metrics: MetricSelection::new(catalog),
            traffic_allocation: TrafficAllocation::default(),
            power_analysis: None,
            frozen: false,
        }
    }

    /// Use a different default traffic allocation
    pub fn with_traffic_allocation(mut self, percent: u32) -> Self {
        self.traffic_allocation = TrafficAllocation::new(percent);
        self
    }

    // Getters

    pub fn hypothesis(&self) -> &HypothesisSpec {
        &self.hypothesis
    }

    pub fn variants(&self) -> &VariantSet {
        &self.variants
    }

    pub fn metrics(&self) -> &MetricSelection {
        &self.metrics
    }

    pub fn traffic_allocation(&self) -> TrafficAllocation {
        self.traffic_allocation
    }

    pub fn power_analysis(&self) -> Option<&PowerAnalysisResult> {
        self.power_analysis.as_ref()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    // Component access; refused once frozen so launched components cannot be replaced

    pub fn hypothesis_mut(&mut self) -> Result<&mut HypothesisSpec, DesignError> {
        self.ensure_mutable()?;
        Ok(&mut self.hypothesis)
    }

    pub fn variants_mut(&mut self) -> Result<&mut VariantSet, DesignError> {
        self.ensure_mutable()?;
        Ok(&mut self.variants)
    }

    pub fn metrics_mut(&mut self) -> Result<&mut MetricSelection, DesignError> {
        self.ensure_mutable()?;
        Ok(&mut self.metrics)
    }

    // Mutators

    /// Record the allocation as given; the range is checked by validation
    pub fn set_traffic_allocation(&mut self, percent: u32) -> Result<(), DesignError> {
        self.ensure_mutable()?;
        self.traffic_allocation = TrafficAllocation::new(percent);
        Ok(())
    }

    pub fn set_power_analysis(&mut self, result: PowerAnalysisResult) -> Result<(), DesignError> {
        self.ensure_mutable()?;
        self.power_analysis = Some(result);
        Ok(())
    }

    pub fn clear_power_analysis(&mut self) -> Result<(), DesignError> {
        self.ensure_mutable()?;
        self.power_analysis = None;
        Ok(())
    }

    /// Missing or stale power analysis
    pub fn validate_power_analysis(&self) -> Vec<DesignValidationError> {
        match &self.power_analysis {
            None => vec![DesignValidationError::PowerAnalysisMissing],
            Some(result)
                if !result.is_current_for(
                    self.variants.len(),
                    self.traffic_allocation.percent(),
                    self.metrics.primary(),
                ) =>
            {
                vec![DesignValidationError::StalePowerAnalysis]
            }
            Some(_) => Vec::new(),
        }
    }

    pub(crate) fn freeze(&mut self) {
        self.hypothesis.freeze();
        self.variants.freeze();
        self.metrics.freeze();
        self.frozen = true;
    }

    fn ensure_mutable(&self) -> Result<(), DesignError> {
        if self.frozen {
            return Err(DesignError::ImmutableState);
        }
        Ok(())
    }
}

impl Default for ExperimentDraft {
    fn default() -> Self {
        Self::new(MetricCatalog::default())
    }
}
