//! Hypothesis step of an experiment design

use serde::{Deserialize, Serialize};

use super::catalog::ExperimentType;
use super::validation::{DesignError, DesignValidationError, Field};

/// Name, statement and type of the experiment being designed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypothesisSpec {
    name: String,
    statement: String,
    #[serde(rename = "type")]
    experiment_type: Option<ExperimentType>,
    #[serde(skip)]
    frozen: bool,
}

impl HypothesisSpec {
    /// Create an empty hypothesis with the default experiment type
    pub fn new() -> Self {
        Self {
            name: String::new(),
            statement: String::new(),
            experiment_type: Some(ExperimentType::default()),
            frozen: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn statement(&self) -> &str {
        &self.statement
    }

    pub fn experiment_type(&self) -> Option<ExperimentType> {
        self.experiment_type
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), DesignError> {
        self.ensure_mutable()?;
        self.name = name.into();
        Ok(())
    }

    pub fn set_statement(&mut self, statement: impl Into<String>) -> Result<(), DesignError> {
        self.ensure_mutable()?;
        self.statement = statement.into();
        Ok(())
    }

    pub fn set_type(&mut self, experiment_type: ExperimentType) -> Result<(), DesignError> {
        self.ensure_mutable()?;
        self.experiment_type = Some(experiment_type);
        Ok(())
    }

    /// Set the type from a catalog value.
    ///
    /// Unknown values clear the type; `validate` then reports it as missing.
    pub fn set_type_value(&mut self, value: &str) -> Result<(), DesignError> {
        self.ensure_mutable()?;
        self.experiment_type = value.parse().ok();
        Ok(())
    }

    /// Collect every missing field, in declaration order
    pub fn validate(&self) -> Vec<DesignValidationError> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(DesignValidationError::MissingField(Field::Name));
        }

        if self.statement.trim().is_empty() {
            errors.push(DesignValidationError::MissingField(Field::Statement));
        }

        if self.experiment_type.is_none() {
            errors.push(DesignValidationError::MissingField(Field::Type));
        }

        errors
    }

    pub(crate) fn freeze(&mut self) {
        self.frozen = true;
    }

    fn ensure_mutable(&self) -> Result<(), DesignError> {
        if self.frozen {
            return Err(DesignError::ImmutableState);
        }
        Ok(())
    }
}

impl Default for HypothesisSpec {
    fn default() -> Self {
        Self::new()
    }
}
