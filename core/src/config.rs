//! Run configuration.
//!
//! Every option has a default, so an empty JSON object is a valid config.
//! `validate()` is called by the engine before any computation; an invalid
//! value aborts the run with `AnalyticsError::Configuration`.

use crate::{
    error::{AnalyticsError, AnalyticsResult},
    time_series::{Granularity, Measure},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Fixed "now" for recency and age. Unset → latest order date in the facts.
    pub reference_timestamp: Option<NaiveDate>,
    /// Total sales must exceed this for a retained customer to be VIP.
    pub vip_sales_threshold: f64,
    /// Minimum lifespan for a customer to count as retained (VIP or Regular).
    pub vip_min_lifespan_months: i64,
    /// Trailing window of the moving average, current period included.
    pub moving_average_window: usize,
    /// Width in years of each age band between floor and ceiling.
    pub age_bucket_width: u32,
    /// Ages below this fall in the open lowest band.
    pub age_bucket_floor: u32,
    /// Ages at or above this fall in the open top band.
    pub age_bucket_ceiling: u32,
    /// Upper bounds of the product cost ranges, ascending.
    pub cost_range_bounds: Vec<f64>,
    /// Absolute slack allowed in sales_amount = quantity × price.
    pub sales_amount_tolerance: f64,
    /// Worker threads used for per-entity metric computation.
    pub workers: usize,
    pub time_series_granularity: Granularity,
    pub time_series_measure: Measure,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            reference_timestamp:     None,
            vip_sales_threshold:     5000.0,
            vip_min_lifespan_months: 12,
            moving_average_window:   3,
            age_bucket_width:        10,
            age_bucket_floor:        20,
            age_bucket_ceiling:      50,
            cost_range_bounds:       vec![100.0, 500.0, 1000.0],
            sales_amount_tolerance:  0.01,
            workers:                 1,
            time_series_granularity: Granularity::Month,
            time_series_measure:     Measure::Sales,
        }
    }
}

impl AnalyticsConfig {
    /// Load from a JSON file. Missing options take their defaults.
    /// In tests, use AnalyticsConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: AnalyticsConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with a pinned reference date so tests never depend on
    /// which fact happens to be latest.
    pub fn default_test() -> Self {
        Self {
            reference_timestamp: NaiveDate::from_ymd_opt(2024, 12, 31),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> AnalyticsResult<()> {
        if !self.vip_sales_threshold.is_finite() || self.vip_sales_threshold < 0.0 {
            return Err(AnalyticsError::config(
                "vip_sales_threshold",
                format!("must be a finite non-negative number, got {}", self.vip_sales_threshold),
            ));
        }
        if self.vip_min_lifespan_months < 0 {
            return Err(AnalyticsError::config(
                "vip_min_lifespan_months",
                format!("must be >= 0, got {}", self.vip_min_lifespan_months),
            ));
        }
        if self.moving_average_window == 0 {
            return Err(AnalyticsError::config(
                "moving_average_window",
                "must be a positive integer",
            ));
        }
        if self.age_bucket_width == 0 {
            return Err(AnalyticsError::config("age_bucket_width", "must be >= 1"));
        }
        if self.age_bucket_ceiling <= self.age_bucket_floor {
            return Err(AnalyticsError::config(
                "age_bucket_ceiling",
                format!(
                    "must exceed age_bucket_floor ({} <= {})",
                    self.age_bucket_ceiling, self.age_bucket_floor
                ),
            ));
        }
        if self.cost_range_bounds.iter().any(|b| !b.is_finite() || *b < 0.0) {
            return Err(AnalyticsError::config(
                "cost_range_bounds",
                "bounds must be finite and non-negative",
            ));
        }
        if self.cost_range_bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(AnalyticsError::config(
                "cost_range_bounds",
                "bounds must be strictly ascending",
            ));
        }
        if !self.sales_amount_tolerance.is_finite() || self.sales_amount_tolerance < 0.0 {
            return Err(AnalyticsError::config(
                "sales_amount_tolerance",
                "must be a finite non-negative number",
            ));
        }
        if self.workers == 0 {
            return Err(AnalyticsError::config("workers", "must be >= 1"));
        }
        Ok(())
    }
}
