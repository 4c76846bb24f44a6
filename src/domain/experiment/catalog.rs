//! Static catalogs of experiment types and success metrics

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

// ============================================================================
// CatalogEntry
// ============================================================================

/// A selectable `{value, label}` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub value: String,
    pub label: String,
}

impl CatalogEntry {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

// ============================================================================
// ExperimentType
// ============================================================================

/// Kind of controlled experiment being designed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentType {
    #[default]
    Ab,
    Multivariate,
    Bandit,
}

impl ExperimentType {
    pub const ALL: [ExperimentType; 3] = [Self::Ab, Self::Multivariate, Self::Bandit];

    /// Catalog value, as supplied by the UI layer
    pub fn value(&self) -> &'static str {
        match self {
            Self::Ab => "ab",
            Self::Multivariate => "multivariate",
            Self::Bandit => "bandit",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ab => "A/B Test",
            Self::Multivariate => "Multivariate Test",
            Self::Bandit => "Multi-armed Bandit",
        }
    }

    /// The experiment type catalog as `{value, label}` pairs
    pub fn catalog() -> Vec<CatalogEntry> {
        Self::ALL
            .iter()
            .map(|t| CatalogEntry::new(t.value(), t.label()))
            .collect()
    }
}

impl FromStr for ExperimentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.value() == s)
            .ok_or_else(|| DomainError::validation(format!("Unknown experiment type '{}'", s)))
    }
}

impl fmt::Display for ExperimentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

// ============================================================================
// MetricCatalog
// ============================================================================

static DEFAULT_METRICS: Lazy<Vec<CatalogEntry>> = Lazy::new(|| {
    vec![
        CatalogEntry::new("conversion", "Conversion Rate"),
        CatalogEntry::new("revenue", "Revenue per Visitor"),
        CatalogEntry::new("aov", "Average Order Value"),
        CatalogEntry::new("ctr", "Click-through Rate"),
        CatalogEntry::new("engagement", "Engagement Time"),
    ]
});

/// Enumerated set of metrics an experiment may be judged on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CatalogEntry>", into = "Vec<CatalogEntry>")]
pub struct MetricCatalog {
    entries: Vec<CatalogEntry>,
}

impl MetricCatalog {
    /// Build a catalog, rejecting empty catalogs and duplicate values
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, DomainError> {
        if entries.is_empty() {
            return Err(DomainError::configuration("Metric catalog is empty"));
        }

        for (idx, entry) in entries.iter().enumerate() {
            if entry.value.trim().is_empty() {
                return Err(DomainError::configuration(
                    "Metric catalog contains an empty value",
                ));
            }

            if entries[..idx].iter().any(|e| e.value == entry.value) {
                return Err(DomainError::configuration(format!(
                    "Duplicate metric '{}' in catalog",
                    entry.value
                )));
            }
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn contains(&self, value: &str) -> bool {
        self.entries.iter().any(|e| e.value == value)
    }

    pub fn label_of(&self, value: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.value == value)
            .map(|e| e.label.as_str())
    }
}

impl Default for MetricCatalog {
    fn default() -> Self {
        Self {
            entries: DEFAULT_METRICS.clone(),
        }
    }
}

impl TryFrom<Vec<CatalogEntry>> for MetricCatalog {
    type Error = DomainError;

    fn try_from(value: Vec<CatalogEntry>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MetricCatalog> for Vec<CatalogEntry> {
    fn from(catalog: MetricCatalog) -> Self {
        catalog.entries
    }
}
