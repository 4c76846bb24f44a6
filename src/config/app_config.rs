use serde::Deserialize;

use crate::domain::experiment::{
    MetricCatalog, DEFAULT_DESIRED_POWER, DEFAULT_SIGNIFICANCE_LEVEL, DEFAULT_TRAFFIC_ALLOCATION,
    TRAFFIC_ALLOCATION_RANGE,
};
use crate::domain::DomainError;
use crate::infrastructure::experiment::DEFAULT_CACHE_CAPACITY;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub design: DesignConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Defaults applied to new designs and power analyses
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DesignConfig {
    pub desired_power: f64,
    pub significance_level: f64,
    pub traffic_allocation_percent: u32,
    pub power_cache_capacity: u64,
}

/// Metric catalog offered to designers
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub metrics: MetricCatalog,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            desired_power: DEFAULT_DESIRED_POWER,
            significance_level: DEFAULT_SIGNIFICANCE_LEVEL,
            traffic_allocation_percent: DEFAULT_TRAFFIC_ALLOCATION,
            power_cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl DesignConfig {
    /// Reject defaults no design could be launched with
    pub fn validate(&self) -> Result<(), DomainError> {
        for (name, value) in [
            ("desired_power", self.desired_power),
            ("significance_level", self.significance_level),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(DomainError::configuration(format!(
                    "design.{} must be strictly between 0 and 1, got {}",
                    name, value
                )));
            }
        }

        if !TRAFFIC_ALLOCATION_RANGE.contains(&self.traffic_allocation_percent) {
            return Err(DomainError::configuration(format!(
                "design.traffic_allocation_percent must be within {}..={}, got {}",
                TRAFFIC_ALLOCATION_RANGE.start(),
                TRAFFIC_ALLOCATION_RANGE.end(),
                self.traffic_allocation_percent
            )));
        }

        if self.power_cache_capacity == 0 {
            return Err(DomainError::configuration(
                "design.power_cache_capacity must be positive",
            ));
        }

        Ok(())
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
