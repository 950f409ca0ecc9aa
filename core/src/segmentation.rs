//! Segmentation engine — rule-based classification of calculator output.
//!
//! Customer segments are an ordered rule list evaluated first-match-wins.
//! The rules overlap by construction, so order is part of the contract.
//! Entities with no sales facts are never classified.

use crate::{
    config::AnalyticsConfig,
    metrics::{CustomerMetrics, ProductMetrics},
    types::EntityKey,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ── Customer segments ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CustomerSegment {
    Vip,
    Regular,
    New,
}

impl fmt::Display for CustomerSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CustomerSegment::Vip     => "VIP",
            CustomerSegment::Regular => "Regular",
            CustomerSegment::New     => "New",
        })
    }
}

type Predicate = Box<dyn Fn(&CustomerMetrics) -> bool + Send + Sync>;

/// One (predicate, label) pair of the segment rule list.
pub struct SegmentRule {
    pub segment: CustomerSegment,
    predicate:   Predicate,
}

impl SegmentRule {
    pub fn new<P>(segment: CustomerSegment, predicate: P) -> Self
    where
        P: Fn(&CustomerMetrics) -> bool + Send + Sync + 'static,
    {
        Self {
            segment,
            predicate: Box::new(predicate),
        }
    }

    pub fn matches(&self, metrics: &CustomerMetrics) -> bool {
        (self.predicate)(metrics)
    }
}

pub struct CustomerSegmenter {
    rules: Vec<SegmentRule>,
}

impl CustomerSegmenter {
    /// The standard VIP → Regular → New rule list.
    pub fn from_config(config: &AnalyticsConfig) -> Self {
        let threshold = config.vip_sales_threshold;
        let min_lifespan = config.vip_min_lifespan_months;
        Self::with_rules(vec![
            SegmentRule::new(CustomerSegment::Vip, move |m| {
                m.lifespan_months >= min_lifespan && m.total_sales > threshold
            }),
            SegmentRule::new(CustomerSegment::Regular, move |m| {
                m.lifespan_months >= min_lifespan && m.total_sales <= threshold
            }),
            SegmentRule::new(CustomerSegment::New, move |m| {
                m.lifespan_months < min_lifespan
            }),
        ])
    }

    pub fn with_rules(rules: Vec<SegmentRule>) -> Self {
        Self { rules }
    }

    /// First matching rule wins. None for customers without sales facts,
    /// or when no rule matches.
    pub fn classify(&self, metrics: &CustomerMetrics) -> Option<CustomerSegment> {
        if !metrics.has_activity() {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| rule.matches(metrics))
            .map(|rule| rule.segment)
    }
}

// ── Age bands ────────────────────────────────────────────────────────────────

/// Half-open age interval `[min_age, max_age)`; None means unbounded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgeBand {
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
}

impl AgeBand {
    pub fn contains(&self, age: u32) -> bool {
        self.min_age.is_none_or(|min| age >= min) && self.max_age.is_none_or(|max| age < max)
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min_age, self.max_age) {
            (None, Some(max))      => write!(f, "Under {max}"),
            (Some(min), None)      => write!(f, "{min} and above"),
            (Some(min), Some(max)) => write!(f, "{min}-{}", max - 1),
            (None, None)           => f.write_str("All ages"),
        }
    }
}

/// Fixed partition of ages: `<floor`, width-sized bands, `ceiling+`.
#[derive(Debug, Clone)]
pub struct AgeBands {
    bands: Vec<AgeBand>,
}

impl AgeBands {
    pub fn from_config(config: &AnalyticsConfig) -> Self {
        let floor = config.age_bucket_floor;
        let ceiling = config.age_bucket_ceiling.max(floor);
        let width = config.age_bucket_width.max(1);

        let mut bands = vec![AgeBand { min_age: None, max_age: Some(floor) }];
        let mut start = floor;
        while start < ceiling {
            let end = start.saturating_add(width).min(ceiling);
            bands.push(AgeBand { min_age: Some(start), max_age: Some(end) });
            start = end;
        }
        bands.push(AgeBand { min_age: Some(ceiling), max_age: None });
        Self { bands }
    }

    pub fn bands(&self) -> &[AgeBand] {
        &self.bands
    }

    pub fn band_for(&self, age: u32) -> AgeBand {
        // Lower bounds ascend from an unbounded first band, so the last band
        // starting at or below `age` is the one holding it.
        let idx = self.bands.partition_point(|b| b.min_age.is_none_or(|min| min <= age));
        let band = self.bands[idx.saturating_sub(1)];
        debug_assert!(band.contains(age), "age {age} outside band {band}");
        band
    }
}

// ── Product performance tiers ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTier {
    High,
    Mid,
    Low,
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PerformanceTier::High => "High Performer",
            PerformanceTier::Mid  => "Mid Performer",
            PerformanceTier::Low  => "Low Performer",
        })
    }
}

const TIERS: [PerformanceTier; 3] = [
    PerformanceTier::High,
    PerformanceTier::Mid,
    PerformanceTier::Low,
];

/// Rank active products by total sales (descending, ties by ascending key)
/// and cut the ranking into three near-equal tiers. When the count is not
/// divisible by three the leading tiers take one extra product each.
pub fn tier_products(metrics: &[ProductMetrics]) -> HashMap<EntityKey, PerformanceTier> {
    let mut ranked: Vec<&ProductMetrics> = metrics.iter().filter(|m| m.has_activity()).collect();
    ranked.sort_by(|a, b| {
        b.total_sales
            .total_cmp(&a.total_sales)
            .then(a.product_key.cmp(&b.product_key))
    });

    let n = ranked.len();
    let base = n / TIERS.len();
    let extra = n % TIERS.len();

    let mut tiers = HashMap::with_capacity(n);
    let mut ranked = ranked.into_iter();
    for (i, tier) in TIERS.iter().enumerate() {
        let size = base + usize::from(i < extra);
        for m in ranked.by_ref().take(size) {
            tiers.insert(m.product_key, *tier);
        }
    }
    tiers
}

// ── Product cost ranges ──────────────────────────────────────────────────────

/// Half-open cost interval `[lower, upper)`; None means unbounded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CostRange {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl fmt::Display for CostRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.lower, self.upper) {
            (None, Some(upper))        => write!(f, "Below {upper}"),
            (Some(lower), None)        => write!(f, "Above {lower}"),
            (Some(lower), Some(upper)) => write!(f, "{lower}-{upper}"),
            (None, None)               => f.write_str("All"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CostRanges {
    ranges: Vec<CostRange>,
}

impl CostRanges {
    /// `bounds` must be strictly ascending (checked by config validation).
    pub fn from_bounds(bounds: &[f64]) -> Self {
        let (Some(first), Some(last)) = (bounds.first(), bounds.last()) else {
            return Self {
                ranges: vec![CostRange { lower: None, upper: None }],
            };
        };
        let mut ranges = vec![CostRange { lower: None, upper: Some(*first) }];
        ranges.extend(bounds.windows(2).map(|w| CostRange {
            lower: Some(w[0]),
            upper: Some(w[1]),
        }));
        ranges.push(CostRange { lower: Some(*last), upper: None });
        Self { ranges }
    }

    pub fn ranges(&self) -> &[CostRange] {
        &self.ranges
    }

    pub fn range_for(&self, cost: f64) -> CostRange {
        self.ranges
            .iter()
            .copied()
            .find(|r| r.lower.is_none_or(|l| cost >= l) && r.upper.is_none_or(|u| cost < u))
            .unwrap_or(CostRange { lower: None, upper: None })
    }
}
