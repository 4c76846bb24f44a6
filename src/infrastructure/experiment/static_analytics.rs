//! Analytics provider backed by fixed figures

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::experiment::AnalyticsProvider;
use crate::domain::DomainError;

/// Analytics figures supplied up front, e.g. from a design file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticAnalyticsProvider {
    #[serde(default)]
    baseline_rates: HashMap<String, f64>,
    #[serde(default)]
    daily_eligible_traffic: Option<u64>,
}

impl StaticAnalyticsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_baseline_rate(mut self, metric: impl Into<String>, rate: f64) -> Self {
        self.baseline_rates.insert(metric.into(), rate);
        self
    }

    pub fn with_daily_eligible_traffic(mut self, traffic: u64) -> Self {
        self.daily_eligible_traffic = Some(traffic);
        self
    }
}

impl AnalyticsProvider for StaticAnalyticsProvider {
    fn baseline_rate(&self, metric: &str) -> Result<Option<f64>, DomainError> {
        match self.baseline_rates.get(metric) {
            Some(rate) if !rate.is_finite() => Err(DomainError::validation(format!(
                "Baseline rate for '{}' is not a finite number",
                metric
            ))),
            Some(rate) => Ok(Some(*rate)),
            None => Ok(None),
        }
    }

    fn daily_eligible_traffic(&self) -> Result<Option<u64>, DomainError> {
        Ok(self.daily_eligible_traffic)
    }
}
