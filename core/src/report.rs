//! Report assembler — joins metrics, segments and tiers into report rows.
//!
//! RULE: every dimension row appears exactly once in its report, in
//! dimension order, whether or not it has sales. The assembler never
//! filters or sorts; that is left to whoever consumes the reports.

use crate::{
    dataset::{Customer, Product},
    metrics::{CustomerMetrics, ProductMetrics},
    segmentation::{
        AgeBand, AgeBands, CostRange, CostRanges, CustomerSegment, CustomerSegmenter,
        PerformanceTier,
    },
    types::EntityKey,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ── Report rows ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerReportRow {
    pub customer: Customer,
    pub metrics:  CustomerMetrics,
    pub age_band: Option<AgeBand>,
    /// None for customers without sales facts.
    pub segment:  Option<CustomerSegment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductReportRow {
    pub product:    Product,
    pub metrics:    ProductMetrics,
    pub cost_range: CostRange,
    /// None for products without sales facts.
    pub tier:       Option<PerformanceTier>,
}

pub fn assemble_customer_report(
    customers: &[Customer],
    metrics: Vec<CustomerMetrics>,
    segmenter: &CustomerSegmenter,
    age_bands: &AgeBands,
) -> Vec<CustomerReportRow> {
    let mut by_key: HashMap<EntityKey, CustomerMetrics> =
        metrics.into_iter().map(|m| (m.customer_key, m)).collect();

    customers
        .iter()
        .map(|customer| {
            let metrics = by_key
                .remove(&customer.customer_key)
                .unwrap_or_else(|| CustomerMetrics::inactive(customer.customer_key));
            CustomerReportRow {
                customer: customer.clone(),
                age_band: metrics.age.map(|age| age_bands.band_for(age)),
                segment:  segmenter.classify(&metrics),
                metrics,
            }
        })
        .collect()
}

pub fn assemble_product_report(
    products: &[Product],
    metrics: Vec<ProductMetrics>,
    tiers: &HashMap<EntityKey, PerformanceTier>,
    cost_ranges: &CostRanges,
) -> Vec<ProductReportRow> {
    let mut by_key: HashMap<EntityKey, ProductMetrics> =
        metrics.into_iter().map(|m| (m.product_key, m)).collect();

    products
        .iter()
        .map(|product| {
            let metrics = by_key
                .remove(&product.product_key)
                .unwrap_or_else(|| ProductMetrics::inactive(product.product_key));
            ProductReportRow {
                product:    product.clone(),
                cost_range: cost_ranges.range_for(product.cost),
                tier:       tiers.get(&product.product_key).copied(),
                metrics,
            }
        })
        .collect()
}

// ── Segment summary ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentCount {
    pub segment:     CustomerSegment,
    pub customers:   usize,
    pub total_sales: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentAgeCell {
    pub segment:   CustomerSegment,
    pub age_band:  AgeBand,
    pub customers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TierCount {
    pub tier:        PerformanceTier,
    pub products:    usize,
    pub total_sales: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostRangeCount {
    pub cost_range: CostRange,
    pub products:   usize,
}

/// Counts over the assembled reports, for the run summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentSummary {
    pub customer_segments:     Vec<SegmentCount>,
    pub unsegmented_customers: usize,
    /// Customers with an age only; the others are left out of this table.
    pub segment_by_age:        Vec<SegmentAgeCell>,
    pub product_tiers:         Vec<TierCount>,
    pub untiered_products:     usize,
    pub cost_ranges:           Vec<CostRangeCount>,
}

pub fn summarize(
    customers: &[CustomerReportRow],
    products: &[ProductReportRow],
    cost_ranges: &CostRanges,
) -> SegmentSummary {
    let mut segments: BTreeMap<CustomerSegment, (usize, f64)> = BTreeMap::new();
    let mut by_age: BTreeMap<(CustomerSegment, AgeBand), usize> = BTreeMap::new();
    let mut unsegmented_customers = 0;
    for row in customers {
        let Some(segment) = row.segment else {
            unsegmented_customers += 1;
            continue;
        };
        let entry = segments.entry(segment).or_default();
        entry.0 += 1;
        entry.1 += row.metrics.total_sales;
        if let Some(band) = row.age_band {
            *by_age.entry((segment, band)).or_default() += 1;
        }
    }

    let mut tiers: BTreeMap<PerformanceTier, (usize, f64)> = BTreeMap::new();
    let mut untiered_products = 0;
    for row in products {
        match row.tier {
            Some(tier) => {
                let entry = tiers.entry(tier).or_default();
                entry.0 += 1;
                entry.1 += row.metrics.total_sales;
            }
            None => untiered_products += 1,
        }
    }

    let cost_ranges = cost_ranges
        .ranges()
        .iter()
        .map(|range| CostRangeCount {
            cost_range: *range,
            products:   products.iter().filter(|p| p.cost_range == *range).count(),
        })
        .collect();

    SegmentSummary {
        customer_segments: segments
            .into_iter()
            .map(|(segment, (customers, total_sales))| SegmentCount {
                segment,
                customers,
                total_sales,
            })
            .collect(),
        unsegmented_customers,
        segment_by_age: by_age
            .into_iter()
            .map(|((segment, age_band), customers)| SegmentAgeCell {
                segment,
                age_band,
                customers,
            })
            .collect(),
        product_tiers: tiers
            .into_iter()
            .map(|(tier, (products, total_sales))| TierCount {
                tier,
                products,
                total_sales,
            })
            .collect(),
        untiered_products,
        cost_ranges,
    }
}
