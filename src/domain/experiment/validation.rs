//! Experiment design validation and error types

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::power::PowerAnalysisError;
use crate::domain::DomainError;

/// Maximum length for variant IDs
pub const MAX_VARIANT_ID_LENGTH: usize = 50;

/// Hypothesis fields that must be filled in before leaving the first step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Statement,
    Type,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Statement => write!(f, "statement"),
            Self::Type => write!(f, "type"),
        }
    }
}

/// Recoverable validation failures, always collected in full
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DesignValidationError {
    #[error("Missing required field: {0}")]
    MissingField(Field),

    #[error("Experiment must have at least 2 variants, got {0}")]
    InsufficientVariants(usize),

    #[error("Experiment must have a control variant")]
    NoControl,

    #[error("Experiment must have exactly one control variant, got {0}")]
    MultipleControls(usize),

    #[error("The control variant must be the first variant")]
    ControlNotFirst,

    #[error("Duplicate variant label: '{0}'")]
    DuplicateLabel(String),

    #[error("Variant '{0}' has an empty label")]
    EmptyLabel(String),

    #[error("A primary metric must be selected")]
    MetricNotSelected,

    #[error("Traffic allocation must be between 5 and 100 percent, got {0}")]
    InvalidTrafficAllocation(u32),

    #[error("Power analysis has not been computed")]
    PowerAnalysisMissing,

    #[error("Power analysis is out of date with the current variants or traffic allocation")]
    StalePowerAnalysis,
}

/// Errors signalling misuse of the design API, or a refused step
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DesignError {
    #[error("Variant '{0}' not found")]
    NotFound(String),

    #[error("Invalid variant ID '{id}': {reason}")]
    InvalidVariantId { id: String, reason: &'static str },

    #[error("The control variant cannot be removed")]
    CannotRemoveControl,

    #[error("Experiment must keep at least {minimum} variants")]
    VariantFloor { minimum: usize },

    #[error("Duplicate variant label: '{0}'")]
    DuplicateLabel(String),

    #[error("Metric '{0}' is not in the catalog")]
    InvalidMetric(String),

    #[error("Metric '{0}' is already the primary metric")]
    PrimaryConflict(String),

    #[error("Invalid wizard transition from {from} to {to}")]
    IllegalTransition { from: String, to: String },

    #[error("Experiment has been launched and can no longer be modified")]
    ImmutableState,

    #[error("Step is incomplete: {}", join_errors(.0))]
    StepIncomplete(Vec<DesignValidationError>),

    #[error("Experiment is not ready to launch: {}", join_errors(.0))]
    NotReady(Vec<DesignValidationError>),

    #[error("Power analysis failed: {0}")]
    PowerAnalysis(#[from] PowerAnalysisError),

    #[error("Analytics lookup failed: {0}")]
    Analytics(DomainError),

    #[error("Runtime handoff failed: {0}")]
    Runtime(#[from] DomainError),
}

impl DesignError {
    /// Validation errors carried by a refused step or launch, if any
    pub fn validation_errors(&self) -> &[DesignValidationError] {
        match self {
            Self::StepIncomplete(errors) | Self::NotReady(errors) => errors,
            _ => &[],
        }
    }
}

fn join_errors(errors: &[DesignValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validate a variant ID
pub fn validate_variant_id(id: &str) -> Result<(), DesignError> {
    let invalid = |reason: &'static str| {
        Err(DesignError::InvalidVariantId {
            id: id.to_string(),
            reason,
        })
    };

    if id.is_empty() {
        return invalid("empty id");
    }

    if id.len() > MAX_VARIANT_ID_LENGTH {
        return invalid("id too long");
    }

    let (Some(first_char), Some(last_char)) = (id.chars().next(), id.chars().last()) else {
        return invalid("empty id");
    };

    if !first_char.is_ascii_alphanumeric() || !last_char.is_ascii_alphanumeric() {
        return invalid("must start and end with a letter or number");
    }

    let mut prev_was_hyphen = false;

    for ch in id.chars() {
        if ch == '-' {
            if prev_was_hyphen {
                return invalid("consecutive hyphens");
            }
            prev_was_hyphen = true;
        } else if ch.is_ascii_alphanumeric() {
            prev_was_hyphen = false;
        } else {
            return invalid("invalid character");
        }
    }

    Ok(())
}
