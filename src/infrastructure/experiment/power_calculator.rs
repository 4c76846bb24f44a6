//! Two-proportion sample size calculator and its memoizing wrapper

use moka::sync::Cache;
use tracing::debug;

use super::statistical::{inverse_normal_cdf, two_sided_critical_value};
use crate::domain::experiment::{
    PowerAnalysisError, PowerAnalysisInput, PowerAnalysisResult, PowerCalculator,
};

/// Default number of memoized power analyses
pub const DEFAULT_CACHE_CAPACITY: u64 = 1024;

/// Compute the per-arm sample size and run duration for a two-proportion z-test
/// with equal-size arms.
///
/// # Arguments
/// * `input` - Baseline rate, relative MDE, power, significance and daily traffic
/// * `number_of_variants` - Number of arms, control included
/// * `traffic_allocation_percent` - Share of eligible traffic enrolled
pub fn compute(
    input: &PowerAnalysisInput,
    number_of_variants: usize,
    traffic_allocation_percent: u32,
) -> Result<PowerAnalysisResult, PowerAnalysisError> {
    let p1 = match input.baseline_rate {
        Some(rate) if rate > 0.0 => rate,
        _ => return Err(PowerAnalysisError::InsufficientData("baseline_rate".to_string())),
    };

    let mde = match input.minimum_detectable_effect {
        Some(effect) if effect == 0.0 => return Err(PowerAnalysisError::ZeroEffect),
        Some(effect) if effect > 0.0 => effect,
        _ => {
            return Err(PowerAnalysisError::InsufficientData(
                "minimum_detectable_effect".to_string(),
            ))
        }
    };

    let daily_traffic = match input.estimated_daily_eligible_traffic {
        Some(traffic) if traffic > 0 => traffic,
        _ => {
            return Err(PowerAnalysisError::InsufficientData(
                "estimated_daily_eligible_traffic".to_string(),
            ))
        }
    };

    if p1 >= 1.0 {
        return Err(invalid_probability("baseline_rate", p1));
    }

    if number_of_variants < 2 {
        return Err(PowerAnalysisError::InvalidVariantCount(number_of_variants));
    }

    if traffic_allocation_percent == 0 || traffic_allocation_percent > 100 {
        return Err(PowerAnalysisError::InvalidTrafficAllocation(
            traffic_allocation_percent,
        ));
    }

    let significance_level = probability("significance_level", input.significance_level)?;
    let desired_power = probability("desired_power", input.desired_power)?;

    let z_alpha = two_sided_critical_value(significance_level)
        .ok_or_else(|| invalid_probability("significance_level", input.significance_level))?;
    let z_beta = inverse_normal_cdf(desired_power)
        .ok_or_else(|| invalid_probability("desired_power", input.desired_power))?;

    let p2 = p1 * (1.0 + mde);

    if p2 >= 1.0 {
        return Err(PowerAnalysisError::InvalidEffect(p2));
    }

    let delta = p1 - p2;

    if delta == 0.0 {
        return Err(PowerAnalysisError::ZeroEffect);
    }

    let variance = p1 * (1.0 - p1) + p2 * (1.0 - p2);
    let n = ((z_alpha + z_beta).powi(2) * variance / delta.powi(2)).ceil();
    let sample_size_per_variant = (n as u64).max(1);

    let eligible_per_day = daily_traffic as f64 * traffic_allocation_percent as f64 / 100.0;
    let total_sample_size = sample_size_per_variant.saturating_mul(number_of_variants as u64);
    let duration_days = ((total_sample_size as f64 / eligible_per_day).ceil() as u64).max(1);

    Ok(PowerAnalysisResult {
        sample_size_per_variant,
        total_sample_size,
        duration_days,
        baseline_rate: p1,
        minimum_detectable_effect: mde,
        desired_power: input.desired_power,
        significance_level: input.significance_level,
        number_of_variants,
        traffic_allocation_percent,
        primary_metric: None,
    })
}

/// Accept only values strictly between 0 and 1
fn probability(parameter: &str, value: f64) -> Result<f64, PowerAnalysisError> {
    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(invalid_probability(parameter, value))
    }
}

fn invalid_probability(parameter: &str, value: f64) -> PowerAnalysisError {
    PowerAnalysisError::InvalidProbability {
        parameter: parameter.to_string(),
        value,
    }
}

// ============================================================================
// TwoProportionCalculator
// ============================================================================

/// Stateless calculator backed by [`compute`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoProportionCalculator;

impl PowerCalculator for TwoProportionCalculator {
    fn compute(
        &self,
        input: &PowerAnalysisInput,
        number_of_variants: usize,
        traffic_allocation_percent: u32,
    ) -> Result<PowerAnalysisResult, PowerAnalysisError> {
        compute(input, number_of_variants, traffic_allocation_percent)
    }
}

// ============================================================================
// CachedPowerCalculator
// ============================================================================

/// Cache key: the exact input tuple, floats compared bit for bit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    baseline_rate: Option<u64>,
    minimum_detectable_effect: Option<u64>,
    desired_power: u64,
    significance_level: u64,
    estimated_daily_eligible_traffic: Option<u64>,
    number_of_variants: usize,
    traffic_allocation_percent: u32,
}

impl CacheKey {
    fn new(
        input: &PowerAnalysisInput,
        number_of_variants: usize,
        traffic_allocation_percent: u32,
    ) -> Self {
        Self {
            baseline_rate: input.baseline_rate.map(f64::to_bits),
            minimum_detectable_effect: input.minimum_detectable_effect.map(f64::to_bits),
            desired_power: input.desired_power.to_bits(),
            significance_level: input.significance_level.to_bits(),
            estimated_daily_eligible_traffic: input.estimated_daily_eligible_traffic,
            number_of_variants,
            traffic_allocation_percent,
        }
    }
}

/// Power calculator wrapper that memoizes successful results
#[derive(Debug)]
pub struct CachedPowerCalculator<C: PowerCalculator> {
    inner: C,
    cache: Cache<CacheKey, PowerAnalysisResult>,
}

impl<C: PowerCalculator> CachedPowerCalculator<C> {
    pub fn new(inner: C) -> Self {
        Self::with_capacity(inner, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(inner: C, capacity: u64) -> Self {
        let cache = Cache::builder().max_capacity(capacity).build();

        Self { inner, cache }
    }

    /// Invalidate all memoized results
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Get cache statistics
    pub fn cache_size(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl<C: PowerCalculator> PowerCalculator for CachedPowerCalculator<C> {
    fn compute(
        &self,
        input: &PowerAnalysisInput,
        number_of_variants: usize,
        traffic_allocation_percent: u32,
    ) -> Result<PowerAnalysisResult, PowerAnalysisError> {
        let key = CacheKey::new(input, number_of_variants, traffic_allocation_percent);

        if let Some(cached) = self.cache.get(&key) {
            debug!(
                number_of_variants,
                traffic_allocation_percent, "Cache hit for power analysis"
            );
            return Ok(cached);
        }

        let result = self
            .inner
            .compute(input, number_of_variants, traffic_allocation_percent)?;
        self.cache.insert(key, result.clone());

        Ok(result)
    }
}
