//! Share of eligible traffic enrolled in the experiment

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use super::validation::DesignValidationError;

/// Accepted allocation range, in percent
pub const TRAFFIC_ALLOCATION_RANGE: RangeInclusive<u32> = 5..=100;

/// Default allocation for a new draft
pub const DEFAULT_TRAFFIC_ALLOCATION: u32 = 50;

/// Integer percentage of eligible traffic; checked by `validate`, not on construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrafficAllocation(u32);

impl TrafficAllocation {
    pub fn new(percent: u32) -> Self {
        Self(percent)
    }

    pub fn percent(&self) -> u32 {
        self.0
    }

    pub fn is_valid(&self) -> bool {
        TRAFFIC_ALLOCATION_RANGE.contains(&self.0)
    }

    pub fn validate(&self) -> Vec<DesignValidationError> {
        if self.is_valid() {
            Vec::new()
        } else {
            vec![DesignValidationError::InvalidTrafficAllocation(self.0)]
        }
    }
}

impl Default for TrafficAllocation {
    fn default() -> Self {
        Self(DEFAULT_TRAFFIC_ALLOCATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_accepted() {
        assert!(TrafficAllocation::new(5).validate().is_empty());
        assert!(TrafficAllocation::new(100).validate().is_empty());
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert_eq!(
            TrafficAllocation::new(4).validate(),
            vec![DesignValidationError::InvalidTrafficAllocation(4)]
        );
        assert_eq!(
            TrafficAllocation::new(101).validate(),
            vec![DesignValidationError::InvalidTrafficAllocation(101)]
        );
        assert!(!TrafficAllocation::new(0).is_valid());
    }

    #[test]
    fn test_default_allocation() {
        assert_eq!(TrafficAllocation::default().percent(), 50);
    }
}
