//! report-runner: headless batch runner for the gold analytics engine.
//!
//! Usage:
//!   report-runner --db gold.db [--config analytics.json] [--record] [--json]
//!   report-runner --seed 12345 [--customers 200] [--orders 1500] [--json]
//!
//! Without --db a deterministic sample dataset is generated from --seed.

use anyhow::Result;
use gold_analytics_core::{
    config::AnalyticsConfig,
    engine::{AnalyticsEngine, RunOutput},
    sample::{self, SampleShape},
    store::GoldStore,
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let emit_json = args.iter().any(|a| a == "--json");
    let record = args.iter().any(|a| a == "--record");
    let db = flag_value(&args, "--db");
    let config_path = flag_value(&args, "--config");

    let config = match config_path {
        Some(path) => AnalyticsConfig::load(path)?,
        None => AnalyticsConfig::default(),
    };

    let mut store = match db {
        Some(path) => {
            let store = GoldStore::open(path)?;
            store.migrate()?;
            Some(store)
        }
        None => None,
    };

    let dataset = match &store {
        Some(store) => store.load_dataset()?,
        None => {
            let shape = SampleShape {
                customers: parse_arg(&args, "--customers", SampleShape::default().customers),
                orders: parse_arg(&args, "--orders", SampleShape::default().orders),
                ..SampleShape::default()
            };
            sample::generate(seed, shape)
        }
    };

    let run_id = format!("run-{}", uuid::Uuid::new_v4());
    let engine = AnalyticsEngine::new(config)?;
    let output = engine.run(&dataset, run_id)?;

    if record {
        match store.as_mut() {
            Some(store) => store.record_run(&output, engine.config())?,
            None => log::warn!("--record ignored: no --db given"),
        }
    }

    if emit_json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_summary(&output, db.unwrap_or("(sample)"), seed);
    }
    Ok(())
}

fn print_summary(output: &RunOutput, source: &str, seed: u64) {
    let summary = &output.segment_summary;

    println!("=== RUN SUMMARY ===");
    println!("  run_id:         {}", output.run_id);
    println!("  source:         {source}");
    if source == "(sample)" {
        println!("  seed:           {seed}");
    }
    println!("  reference date: {}", output.reference_date);
    println!("  customers:      {}", output.customer_report.len());
    println!("  products:       {}", output.product_report.len());
    println!("  periods:        {}", output.period_series.len());
    println!("  warnings:       {}", output.warnings.len());

    println!();
    println!("=== CUSTOMER SEGMENTS ===");
    for s in &summary.customer_segments {
        println!(
            "  {:<8} | {:>5} customers | sales ${:.0}",
            s.segment.to_string(),
            s.customers,
            s.total_sales
        );
    }
    println!("  (no sales)   {:>5} customers", summary.unsegmented_customers);

    println!();
    println!("=== PRODUCT TIERS ===");
    for t in &summary.product_tiers {
        println!(
            "  {:<15} | {:>4} products | sales ${:.0}",
            t.tier.to_string(),
            t.products,
            t.total_sales
        );
    }
    for c in &summary.cost_ranges {
        println!("  cost {:<12} | {:>4} products", c.cost_range.to_string(), c.products);
    }

    println!();
    println!("=== LAST 6 PERIODS ===");
    let recent: Vec<_> = output.period_series.iter().rev().take(6).collect();
    if recent.is_empty() {
        println!("  (No dated sales)");
    }
    for p in recent.iter().rev() {
        let growth = p
            .growth_rate
            .map(|g| format!("{g:+.2}%"))
            .unwrap_or_else(|| "n/a".into());
        println!(
            "  {} | Sales: ${:.0} | Running: {:.0} | Growth: {}",
            p.period, p.total_sales, p.running_total, growth
        );
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
