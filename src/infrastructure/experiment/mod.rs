//! Infrastructure layer for experiment design
//!
//! Provides the power calculators and the collaborator implementations
//! used outside of tests.

mod in_memory_runtime;
mod power_calculator;
mod statistical;
mod static_analytics;

pub use in_memory_runtime::InMemoryExperimentRuntime;
pub use power_calculator::{
    CachedPowerCalculator, TwoProportionCalculator, DEFAULT_CACHE_CAPACITY,
};
pub use statistical::{inverse_normal_cdf, normal_cdf, two_sided_critical_value};
pub use static_analytics::StaticAnalyticsProvider;
