//! Success metric selection

use serde::{Deserialize, Serialize};

use super::catalog::MetricCatalog;
use super::validation::{DesignError, DesignValidationError};

/// Primary and secondary metrics chosen from a catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSelection {
    #[serde(skip)]
    catalog: MetricCatalog,
    primary_metric: Option<String>,
    secondary_metrics: Vec<String>,
    #[serde(skip)]
    frozen: bool,
}

impl MetricSelection {
    pub fn new(catalog: MetricCatalog) -> Self {
        Self {
            catalog,
            primary_metric: None,
            secondary_metrics: Vec::new(),
            frozen: false,
        }
    }

    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    pub fn primary(&self) -> Option<&str> {
        self.primary_metric.as_deref()
    }

    /// Label of the primary metric, if one is selected
    pub fn primary_label(&self) -> Option<&str> {
        self.primary_metric
            .as_deref()
            .and_then(|m| self.catalog.label_of(m))
    }

    /// Secondary metrics in the order they were selected
    pub fn secondary(&self) -> &[String] {
        &self.secondary_metrics
    }

    pub fn set_primary(&mut self, metric: &str) -> Result<(), DesignError> {
        self.ensure_mutable()?;
        self.ensure_known(metric)?;

        self.secondary_metrics.retain(|m| m != metric);
        self.primary_metric = Some(metric.to_string());
        Ok(())
    }

    /// Add or remove a secondary metric, returning whether it is now selected
    pub fn toggle_secondary(&mut self, metric: &str) -> Result<bool, DesignError> {
        self.ensure_mutable()?;
        self.ensure_known(metric)?;

        if self.primary_metric.as_deref() == Some(metric) {
            return Err(DesignError::PrimaryConflict(metric.to_string()));
        }

        if let Some(idx) = self.secondary_metrics.iter().position(|m| m == metric) {
            self.secondary_metrics.remove(idx);
            Ok(false)
        } else {
            self.secondary_metrics.push(metric.to_string());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Vec<DesignValidationError> {
        if self.primary_metric.is_none() {
            vec![DesignValidationError::MetricNotSelected]
        } else {
            Vec::new()
        }
    }

    pub(crate) fn freeze(&mut self) {
        self.frozen = true;
    }

    fn ensure_known(&self, metric: &str) -> Result<(), DesignError> {
        if !self.catalog.contains(metric) {
            return Err(DesignError::InvalidMetric(metric.to_string()));
        }
        Ok(())
    }

    fn ensure_mutable(&self) -> Result<(), DesignError> {
        if self.frozen {
            return Err(DesignError::ImmutableState);
        }
        Ok(())
    }
}

impl Default for MetricSelection {
    fn default() -> Self {
        Self::new(MetricCatalog::default())
    }
}
