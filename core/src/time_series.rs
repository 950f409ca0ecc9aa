//! Time-series engine — period buckets and window functions over them.
//!
//! Periods are ordered ascending by (year, month). Gaps are kept as gaps:
//! no empty period is ever synthesized, so "previous period" always means
//! the previous bucket present in the sequence.

use crate::{dataset::ValidFact, types::EntityKey};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Month,
    Year,
}

/// The bucket column the window functions run over.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    #[default]
    Sales,
    Customers,
    Quantity,
}

/// Calendar period. `month` is None for yearly buckets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeriodKey {
    pub year:  i32,
    pub month: Option<u32>,
}

impl PeriodKey {
    pub fn of(date: NaiveDate, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Month => Self { year: date.year(), month: Some(date.month()) },
            Granularity::Year  => Self { year: date.year(), month: None },
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.month {
            Some(month) => write!(f, "{}-{month:02}", self.year),
            None        => write!(f, "{}", self.year),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeriodBucket {
    pub period:          PeriodKey,
    pub total_sales:     f64,
    /// Distinct customers ordering in the period.
    pub total_customers: usize,
    pub total_quantity:  i64,
    /// Prefix sum of the chosen measure up to and including this period.
    pub running_total:   f64,
    /// None until a full window of periods is available.
    pub moving_average:  Option<f64>,
    /// Measure value of the preceding bucket; None for the first.
    pub prior_value:     Option<f64>,
    /// Percent change from `prior_value`; None when there is no usable prior.
    pub growth_rate:     Option<f64>,
}

impl PeriodBucket {
    pub fn value(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Sales     => self.total_sales,
            Measure::Customers => self.total_customers as f64,
            Measure::Quantity  => self.total_quantity as f64,
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ── Window functions ─────────────────────────────────────────────────────────

pub fn running_total(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

/// Trailing mean over `window` values including the current one, rounded to
/// 2 decimals. The first `window - 1` positions are None.
pub fn moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            Some(round2(slice.iter().sum::<f64>() / window as f64))
        })
        .collect()
}

/// `(current - previous) / previous × 100`, rounded to 2 decimals.
/// None when `previous` is zero.
pub fn growth_rate(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    Some(round2((current - previous) / previous * 100.0))
}

/// Growth of every value over its predecessor. The first entry is None.
pub fn growth_rates(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(values.windows(2).map(|w| growth_rate(w[0], w[1])));
    out
}

// ── Bucketing ────────────────────────────────────────────────────────────────

/// Group facts into period buckets with the base totals filled in.
/// Window columns are left empty; see `apply_windows`.
pub fn bucket_facts(facts: &[ValidFact], granularity: Granularity) -> Vec<PeriodBucket> {
    let mut acc: BTreeMap<PeriodKey, (f64, HashSet<EntityKey>, i64)> = BTreeMap::new();
    for fact in facts {
        let entry = acc.entry(PeriodKey::of(fact.order_date, granularity)).or_default();
        entry.0 += fact.sales_amount;
        entry.1.insert(fact.customer_key);
        entry.2 += fact.quantity;
    }

    acc.into_iter()
        .map(|(period, (sales, customers, quantity))| PeriodBucket {
            period,
            total_sales:     sales,
            total_customers: customers.len(),
            total_quantity:  quantity,
            running_total:   0.0,
            moving_average:  None,
            prior_value:     None,
            growth_rate:     None,
        })
        .collect()
}

/// Fill running total, moving average, prior value and growth for `measure`.
pub fn apply_windows(buckets: &mut [PeriodBucket], measure: Measure, window: usize) {
    let values: Vec<f64> = buckets.iter().map(|b| b.value(measure)).collect();
    let totals = running_total(&values);
    let averages = moving_average(&values, window);
    let growth = growth_rates(&values);

    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.running_total = totals[i];
        bucket.moving_average = averages[i];
        bucket.prior_value = i.checked_sub(1).map(|p| values[p]);
        bucket.growth_rate = growth[i];
    }
}

pub fn build_period_series(
    facts: &[ValidFact],
    granularity: Granularity,
    measure: Measure,
    window: usize,
) -> Vec<PeriodBucket> {
    let mut buckets = bucket_facts(facts, granularity);
    apply_windows(&mut buckets, measure, window);
    log::debug!("time series: {} {:?} buckets", buckets.len(), granularity);
    buckets
}
