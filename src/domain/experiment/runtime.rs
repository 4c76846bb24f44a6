//! Experimentation runtime collaborator

use super::record::ExperimentRecord;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Receives launched experiments and takes over traffic splitting and collection
#[cfg_attr(test, automock)]
pub trait ExperimentRuntime: Send + Sync {
    /// Hand a launched experiment over to the runtime
    fn submit(&self, record: &ExperimentRecord) -> Result<(), DomainError>;
}
