//! Experiment design domain module
//!
//! This module provides the types and rules for designing a controlled
//! experiment before launch: hypothesis, variants, metrics, power analysis,
//! launch readiness and the wizard that sequences them.

mod analytics;
mod catalog;
mod draft;
mod hypothesis;
mod metric;
mod power;
mod readiness;
pub(crate) mod record;
mod runtime;
mod traffic;
mod validation;
mod variant;
mod wizard;

// Re-export all public types
pub use analytics::AnalyticsProvider;
pub use catalog::{CatalogEntry, ExperimentType, MetricCatalog};
pub use draft::ExperimentDraft;
pub use hypothesis::HypothesisSpec;
pub use metric::MetricSelection;
pub use power::{
    PowerAnalysisError, PowerAnalysisInput, PowerAnalysisResult, PowerCalculator,
    DEFAULT_DESIRED_POWER, DEFAULT_SIGNIFICANCE_LEVEL,
};
pub use readiness::{LaunchReadiness, LaunchReadinessGate};
pub use record::{ExperimentId, ExperimentRecord, LaunchSummary};
pub use runtime::ExperimentRuntime;
pub use traffic::{TrafficAllocation, DEFAULT_TRAFFIC_ALLOCATION, TRAFFIC_ALLOCATION_RANGE};
pub use validation::{DesignError, DesignValidationError, Field};
pub use variant::{Variant, VariantId, VariantSet, MIN_VARIANTS};
pub use wizard::{StepProgress, StepStatus, WizardStateMachine, WizardStep};

#[cfg(test)]
pub use analytics::MockAnalyticsProvider;
#[cfg(test)]
pub use runtime::MockExperimentRuntime;
