//! The analytics engine — one batch run from gold dataset to reports.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Validate source records        (dataset)
//!   2. Resolve the reference clock    (clock)
//!   3. Customer metrics               (metrics)
//!   4. Product metrics                (metrics)
//!   5. Segmentation and tiering       (segmentation)
//!   6. Period series                  (time_series)
//!   7. Performance analyses           (performance)
//!   8. Report assembly                (report)
//!
//! RULES:
//!   - Configuration is validated before anything else runs.
//!   - Every stage is a pure function of the source collections and the
//!     reference clock; the engine holds no state between runs.
//!   - A structural error aborts the run and no output is produced.
//!     Warnings never abort.

use crate::{
    clock::ReferenceClock,
    config::AnalyticsConfig,
    dataset::{validate_dataset, GoldDataset},
    error::AnalyticsResult,
    metrics::{compute_customer_metrics, compute_product_metrics, FactIndex},
    performance::{category_share, yearly_product_performance, CategoryShare, YearlyProductPerformance},
    report::{
        assemble_customer_report, assemble_product_report, summarize, CustomerReportRow,
        ProductReportRow, SegmentSummary,
    },
    segmentation::{tier_products, AgeBands, CostRanges, CustomerSegmenter},
    time_series::{build_period_series, PeriodBucket},
    types::RunId,
    warning::RunWarning,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Everything one run produces.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunOutput {
    pub run_id:             RunId,
    pub reference_date:     NaiveDate,
    pub customer_report:    Vec<CustomerReportRow>,
    pub product_report:     Vec<ProductReportRow>,
    pub period_series:      Vec<PeriodBucket>,
    pub yearly_performance: Vec<YearlyProductPerformance>,
    pub category_share:     Vec<CategoryShare>,
    pub segment_summary:    SegmentSummary,
    pub warnings:           Vec<RunWarning>,
}

pub struct AnalyticsEngine {
    config:      AnalyticsConfig,
    segmenter:   CustomerSegmenter,
    age_bands:   AgeBands,
    cost_ranges: CostRanges,
}

impl AnalyticsEngine {
    /// Validate `config` and build the rule sets derived from it.
    pub fn new(config: AnalyticsConfig) -> AnalyticsResult<Self> {
        config.validate()?;
        Ok(Self {
            segmenter:   CustomerSegmenter::from_config(&config),
            age_bands:   AgeBands::from_config(&config),
            cost_ranges: CostRanges::from_bounds(&config.cost_range_bounds),
            config,
        })
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn run(&self, dataset: &GoldDataset, run_id: RunId) -> AnalyticsResult<RunOutput> {
        let config = &self.config;
        log::info!(
            "run={run_id} starting: {} customers, {} products, {} sales facts",
            dataset.customers.len(),
            dataset.products.len(),
            dataset.sales.len(),
        );

        // 1. Validate
        let validated = validate_dataset(dataset, config.sales_amount_tolerance)?;
        let facts = validated.facts;
        let mut warnings = validated.warnings;

        // 2. Reference clock
        let clock = ReferenceClock::resolve(
            config.reference_timestamp,
            facts.iter().map(|f| f.order_date),
        )?;
        log::info!("run={run_id} reference date {}", clock.reference);

        // 3–4. Per-entity metrics
        let index = FactIndex::build(&facts);
        let (customer_metrics, customer_warnings) =
            compute_customer_metrics(&dataset.customers, &index, &clock, config.workers)?;
        let (product_metrics, product_warnings) =
            compute_product_metrics(&dataset.products, &index, &clock, config.workers)?;
        warnings.extend(customer_warnings);
        warnings.extend(product_warnings);

        // 5. Tiering (customer segments are applied during assembly)
        let tiers = tier_products(&product_metrics);

        // 6. Period series
        let period_series = build_period_series(
            &facts,
            config.time_series_granularity,
            config.time_series_measure,
            config.moving_average_window,
        );

        // 7. Performance analyses
        let yearly_performance = yearly_product_performance(&facts, &dataset.products);
        let category_share = category_share(&facts, &dataset.products);

        // 8. Assembly
        let customer_report = assemble_customer_report(
            &dataset.customers,
            customer_metrics,
            &self.segmenter,
            &self.age_bands,
        );
        let product_report = assemble_product_report(
            &dataset.products,
            product_metrics,
            &tiers,
            &self.cost_ranges,
        );
        let segment_summary = summarize(&customer_report, &product_report, &self.cost_ranges);

        for warning in &warnings {
            log::warn!("run={run_id} {}: {:?}", warning.type_name(), warning);
        }
        log::info!(
            "run={run_id} complete: {} customer rows, {} product rows, {} periods, {} warnings",
            customer_report.len(),
            product_report.len(),
            period_series.len(),
            warnings.len(),
        );

        Ok(RunOutput {
            run_id,
            reference_date: clock.reference,
            customer_report,
            product_report,
            period_series,
            yearly_performance,
            category_share,
            segment_summary,
            warnings,
        })
    }
}
