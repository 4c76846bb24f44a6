use thiserror::Error;

/// Errors raised at the boundary with external collaborators
/// (experimentation runtime, analytics sources, configuration)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Experiment 'exp-1' not found");
        assert_eq!(error.to_string(), "Not found: Experiment 'exp-1' not found");
    }

    #[test]
    fn test_conflict_error() {
        let error = DomainError::conflict("Experiment already submitted");
        assert_eq!(error.to_string(), "Conflict: Experiment already submitted");
    }

    #[test]
    fn test_configuration_error() {
        let error = DomainError::configuration("Metric catalog is empty");
        assert_eq!(
            error.to_string(),
            "Configuration error: Metric catalog is empty"
        );
    }
}
