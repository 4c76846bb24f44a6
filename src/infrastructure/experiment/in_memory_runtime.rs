//! In-memory experimentation runtime that keeps every submitted record

use std::collections::HashMap;
use std::sync::RwLock;
use tracing::info;

use crate::domain::experiment::{ExperimentId, ExperimentRecord, ExperimentRuntime};
use crate::domain::DomainError;

/// Runtime that stores launched experiments in memory
#[derive(Debug)]
pub struct InMemoryExperimentRuntime {
    records: RwLock<HashMap<String, ExperimentRecord>>,
}

impl InMemoryExperimentRuntime {
    /// Create a new empty runtime
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, id: &ExperimentId) -> Result<Option<ExperimentRecord>, DomainError> {
        let records = self
            .records
            .read()
            .map_err(|e| DomainError::internal(format!("Failed to acquire read lock: {}", e)))?;

        Ok(records.get(id.as_str()).cloned())
    }

    /// All submitted records, oldest launch first
    pub fn list(&self) -> Result<Vec<ExperimentRecord>, DomainError> {
        let records = self
            .records
            .read()
            .map_err(|e| DomainError::internal(format!("Failed to acquire read lock: {}", e)))?;

        let mut results: Vec<_> = records.values().cloned().collect();
        results.sort_by(|a, b| {
            a.launched_at()
                .cmp(&b.launched_at())
                .then_with(|| a.id().as_str().cmp(b.id().as_str()))
        });

        Ok(results)
    }

    pub fn len(&self) -> Result<usize, DomainError> {
        let records = self
            .records
            .read()
            .map_err(|e| DomainError::internal(format!("Failed to acquire read lock: {}", e)))?;

        Ok(records.len())
    }

    pub fn is_empty(&self) -> Result<bool, DomainError> {
        Ok(self.len()? == 0)
    }
}

impl Default for InMemoryExperimentRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ExperimentRuntime for InMemoryExperimentRuntime {
    fn submit(&self, record: &ExperimentRecord) -> Result<(), DomainError> {
        let id = record.id().as_str().to_string();
        let mut records = self
            .records
            .write()
            .map_err(|e| DomainError::internal(format!("Failed to acquire write lock: {}", e)))?;

        if records.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "Experiment '{}' already launched",
                id
            )));
        }

        info!(
            experiment_id = %id,
            variants = record.variants().len(),
            duration_days = record.power_analysis_result().duration_days,
            "Experiment handed to runtime"
        );

        records.insert(id, record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::experiment::record::fixtures;

    #[test]
    fn test_submit_and_get() {
        let runtime = InMemoryExperimentRuntime::new();
        let record = fixtures::sample_record();

        runtime.submit(&record).unwrap();

        let stored = runtime.get(record.id()).unwrap();
        assert_eq!(stored, Some(record));
        assert_eq!(runtime.len().unwrap(), 1);
        assert!(!runtime.is_empty().unwrap());
    }

    #[test]
    fn test_get_unknown() {
        let runtime = InMemoryExperimentRuntime::default();
        let found = runtime.get(&ExperimentId::from("missing")).unwrap();

        assert!(found.is_none());
        assert!(runtime.is_empty().unwrap());
    }

    #[test]
    fn test_duplicate_submission_conflicts() {
        let runtime = InMemoryExperimentRuntime::new();
        let record = fixtures::sample_record();

        runtime.submit(&record).unwrap();
        let result = runtime.submit(&record);

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
        assert_eq!(runtime.len().unwrap(), 1);
    }

    #[test]
    fn test_list() {
        let runtime = InMemoryExperimentRuntime::new();
        let first = fixtures::sample_record();
        let second = fixtures::sample_record();

        runtime.submit(&first).unwrap();
        runtime.submit(&second).unwrap();

        let listed = runtime.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].launched_at() <= listed[1].launched_at());
    }
}
