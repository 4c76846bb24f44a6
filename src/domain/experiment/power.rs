//! Power analysis inputs, results and the calculator seam

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

use super::analytics::AnalyticsProvider;
use crate::domain::DomainError;

/// Default probability of detecting a true effect of size MDE
pub const DEFAULT_DESIRED_POWER: f64 = 0.80;

/// Default confidence level (two-sided)
pub const DEFAULT_SIGNIFICANCE_LEVEL: f64 = 0.95;

/// Reasons a power analysis cannot be performed
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
pub enum PowerAnalysisError {
    #[error("Insufficient data: {0} is missing or not positive")]
    InsufficientData(String),

    #[error("Minimum detectable effect of zero cannot be detected")]
    ZeroEffect,

    #[error("{parameter} must be strictly between 0 and 1, got {value}")]
    InvalidProbability { parameter: String, value: f64 },

    #[error("Expected rate under the effect must be strictly between 0 and 1, got {0}")]
    InvalidEffect(f64),

    #[error("At least 2 variants are required, got {0}")]
    InvalidVariantCount(usize),

    #[error("Traffic allocation must be positive, got {0}")]
    InvalidTrafficAllocation(u32),
}

// ============================================================================
// PowerAnalysisInput
// ============================================================================

/// Statistical parameters for a two-proportion sample size calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerAnalysisInput {
    pub baseline_rate: Option<f64>,
    pub minimum_detectable_effect: Option<f64>,
    pub desired_power: f64,
    pub significance_level: f64,
    pub estimated_daily_eligible_traffic: Option<u64>,
}

impl PowerAnalysisInput {
    /// Create an input with the default power and significance level
    pub fn new(
        baseline_rate: f64,
        minimum_detectable_effect: f64,
        estimated_daily_eligible_traffic: u64,
    ) -> Self {
        Self {
            baseline_rate: Some(baseline_rate),
            minimum_detectable_effect: Some(minimum_detectable_effect),
            estimated_daily_eligible_traffic: Some(estimated_daily_eligible_traffic),
            ..Self::default()
        }
    }

    /// Build an input from analytics-supplied baseline and traffic figures.
    ///
    /// Figures the provider does not know stay unset, so `compute` reports them.
    pub fn from_analytics(
        analytics: &dyn AnalyticsProvider,
        metric: &str,
        minimum_detectable_effect: f64,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            baseline_rate: analytics.baseline_rate(metric)?,
            minimum_detectable_effect: Some(minimum_detectable_effect),
            estimated_daily_eligible_traffic: analytics.daily_eligible_traffic()?,
            ..Self::default()
        })
    }

    pub fn with_power(mut self, desired_power: f64) -> Self {
        self.desired_power = desired_power;
        self
    }

    pub fn with_significance(mut self, significance_level: f64) -> Self {
        self.significance_level = significance_level;
        self
    }
}

impl Default for PowerAnalysisInput {
    fn default() -> Self {
        Self {
            baseline_rate: None,
            minimum_detectable_effect: None,
            desired_power: DEFAULT_DESIRED_POWER,
            significance_level: DEFAULT_SIGNIFICANCE_LEVEL,
            estimated_daily_eligible_traffic: None,
        }
    }
}

// ============================================================================
// PowerAnalysisResult
// ============================================================================

/// Required sample size and duration for a proposed design
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerAnalysisResult {
    pub sample_size_per_variant: u64,
    pub total_sample_size: u64,
    pub duration_days: u64,
    pub baseline_rate: f64,
    pub minimum_detectable_effect: f64,
    pub desired_power: f64,
    pub significance_level: f64,
    pub number_of_variants: usize,
    pub traffic_allocation_percent: u32,
    /// Metric the baseline was taken from; stamped by the wizard
    #[serde(default)]
    pub primary_metric: Option<String>,
}

impl PowerAnalysisResult {
    pub fn with_primary_metric(mut self, metric: Option<&str>) -> Self {
        self.primary_metric = metric.map(str::to_string);
        self
    }

    /// Whether this result was computed for the given arms, allocation and metric
    pub fn is_current_for(
        &self,
        number_of_variants: usize,
        traffic_allocation_percent: u32,
        primary_metric: Option<&str>,
    ) -> bool {
        self.number_of_variants == number_of_variants
            && self.traffic_allocation_percent == traffic_allocation_percent
            && self.primary_metric.as_deref() == primary_metric
    }

    /// One-sentence summary for display
    pub fn describe(&self) -> String {
        format!(
            "With the current configuration there is an {}% chance of detecting a {}% or greater \
             change in the primary metric with {}% confidence.",
            format_percent(self.desired_power),
            format_percent(self.minimum_detectable_effect),
            format_percent(self.significance_level),
        )
    }
}

fn format_percent(value: f64) -> String {
    format!("{}", (value * 10_000.0).round() / 100.0)
}

// ============================================================================
// PowerCalculator
// ============================================================================

/// Turns statistical inputs into a required sample size and duration
pub trait PowerCalculator: Send + Sync + Debug {
    fn compute(
        &self,
        input: &PowerAnalysisInput,
        number_of_variants: usize,
        traffic_allocation_percent: u32,
    ) -> Result<PowerAnalysisResult, PowerAnalysisError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::experiment::analytics::MockAnalyticsProvider;

    fn sample_result() -> PowerAnalysisResult {
        PowerAnalysisResult {
            sample_size_per_variant: 3841,
            total_sample_size: 7682,
            duration_days: 2,
            baseline_rate: 0.10,
            minimum_detectable_effect: 0.20,
            desired_power: 0.80,
            significance_level: 0.95,
            number_of_variants: 2,
            traffic_allocation_percent: 50,
            primary_metric: Some("conversion".to_string()),
        }
    }

    #[test]
    fn test_input_defaults() {
        let input = PowerAnalysisInput::new(0.1, 0.2, 10_000);
        assert_eq!(input.desired_power, 0.80);
        assert_eq!(input.significance_level, 0.95);
        assert_eq!(input.estimated_daily_eligible_traffic, Some(10_000));
    }

    #[test]
    fn test_input_builders() {
        let input = PowerAnalysisInput::new(0.1, 0.2, 10_000)
            .with_power(0.9)
            .with_significance(0.99);
        assert_eq!(input.desired_power, 0.9);
        assert_eq!(input.significance_level, 0.99);
    }

    #[test]
    fn test_input_from_analytics() {
        let mut analytics = MockAnalyticsProvider::new();
        analytics
            .expect_baseline_rate()
            .withf(|metric| metric == "conversion")
            .returning(|_| Ok(Some(0.12)));
        analytics
            .expect_daily_eligible_traffic()
            .returning(|| Ok(Some(25_000)));

        let input = PowerAnalysisInput::from_analytics(&analytics, "conversion", 0.05).unwrap();

        assert_eq!(input.baseline_rate, Some(0.12));
        assert_eq!(input.minimum_detectable_effect, Some(0.05));
        assert_eq!(input.estimated_daily_eligible_traffic, Some(25_000));
        assert_eq!(input.desired_power, DEFAULT_DESIRED_POWER);
    }

    #[test]
    fn test_input_from_analytics_propagates_errors() {
        let mut analytics = MockAnalyticsProvider::new();
        analytics
            .expect_baseline_rate()
            .returning(|_| Err(DomainError::internal("warehouse unavailable")));

        let result = PowerAnalysisInput::from_analytics(&analytics, "conversion", 0.05);
        assert_eq!(result, Err(DomainError::internal("warehouse unavailable")));
    }

    #[test]
    fn test_result_freshness() {
        let result = sample_result();
        assert!(result.is_current_for(2, 50, Some("conversion")));
        assert!(!result.is_current_for(3, 50, Some("conversion")));
        assert!(!result.is_current_for(2, 60, Some("conversion")));
        assert!(!result.is_current_for(2, 50, Some("revenue")));
        assert!(!result.is_current_for(2, 50, None));
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            sample_result().describe(),
            "With the current configuration there is an 80% chance of detecting a 20% or greater \
             change in the primary metric with 95% confidence."
        );
    }

    #[test]
    fn test_describe_fractional_effect() {
        let mut result = sample_result();
        result.minimum_detectable_effect = 0.025;
        assert!(result.describe().contains("a 2.5% or greater"));
    }
}
