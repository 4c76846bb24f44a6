//! Analytics collaborator supplying baseline rates and traffic estimates

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Source of pre-experiment figures the design engine never computes itself
#[cfg_attr(test, automock)]
pub trait AnalyticsProvider: Send + Sync {
    /// Current success rate of the given metric, if known
    fn baseline_rate(&self, metric: &str) -> Result<Option<f64>, DomainError>;

    /// Eligible visitors per day on the experiment surface, if known
    fn daily_eligible_traffic(&self) -> Result<Option<u64>, DomainError>;
}
