use chrono::NaiveDate;
use gold_analytics_core::{
    config::AnalyticsConfig,
    dataset::{Customer, GoldDataset, Product, SalesFact},
    engine::AnalyticsEngine,
    error::AnalyticsError,
    warning::RunWarning,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn base_fact() -> SalesFact {
    SalesFact {
        order_number: "SO1".into(),
        customer_key: 1,
        product_key: 10,
        order_date: Some(d(2024, 1, 10)),
        shipping_date: Some(d(2024, 1, 17)),
        due_date: Some(d(2024, 1, 22)),
        sales_amount: Some(100.0),
        quantity: Some(2),
        price: Some(50.0),
    }
}

fn dataset_with(fact: SalesFact) -> GoldDataset {
    GoldDataset {
        customers: vec![Customer {
            customer_key: 1,
            create_date: None,
            birth_date: None,
            country: None,
            marital_status: None,
        }],
        products: vec![Product {
            product_key: 10,
            name: "Road Bike".into(),
            category: Some("Bikes".into()),
            subcategory: None,
            cost: 40.0,
            start_date: None,
        }],
        sales: vec![fact],
    }
}

fn run(dataset: &GoldDataset) -> Result<gold_analytics_core::engine::RunOutput, AnalyticsError> {
    AnalyticsEngine::new(AnalyticsConfig::default_test())
        .unwrap()
        .run(dataset, "err-test".into())
}

fn assert_malformed(result: Result<gold_analytics_core::engine::RunOutput, AnalyticsError>, needle: &str) {
    match result {
        Err(AnalyticsError::MalformedRecord { entity, reason, .. }) => {
            assert!(
                reason.contains(needle),
                "expected reason containing '{needle}', got '{reason}' ({entity})"
            );
        }
        other => panic!("expected MalformedRecord, got {other:?}"),
    }
}

// ── Malformed records ────────────────────────────────────────────────────────

#[test]
fn well_formed_fact_runs_clean() {
    let output = run(&dataset_with(base_fact())).unwrap();
    assert!(output.warnings.is_empty());
    assert_eq!(output.customer_report.len(), 1);
}

/// Amount present but quantity missing: the identity cannot be checked.
#[test]
fn missing_quantity_rejects_run() {
    let fact = SalesFact { quantity: None, ..base_fact() };
    assert_malformed(run(&dataset_with(fact)), "quantity");
}

#[test]
fn missing_price_rejects_run() {
    let fact = SalesFact { price: None, ..base_fact() };
    assert_malformed(run(&dataset_with(fact)), "price");
}

#[test]
fn amount_identity_respects_tolerance() {
    let close = SalesFact { sales_amount: Some(100.005), ..base_fact() };
    assert!(run(&dataset_with(close)).is_ok(), "within tolerance must pass");

    let off = SalesFact { sales_amount: Some(100.5), ..base_fact() };
    assert_malformed(run(&dataset_with(off)), "sales amount");
}

#[test]
fn absent_amount_is_derived_from_quantity_and_price() {
    let fact = SalesFact { sales_amount: None, ..base_fact() };
    let output = run(&dataset_with(fact)).unwrap();
    assert!((output.customer_report[0].metrics.total_sales - 100.0).abs() < 1e-9);
}

#[test]
fn shipping_before_order_rejects_run() {
    let fact = SalesFact { shipping_date: Some(d(2024, 1, 5)), ..base_fact() };
    assert_malformed(run(&dataset_with(fact)), "after shipping date");
}

#[test]
fn duplicate_dimension_key_rejects_run() {
    let mut dataset = dataset_with(base_fact());
    dataset.customers.push(dataset.customers[0].clone());
    assert_malformed(run(&dataset), "duplicate");
}

/// Zero-priced lines pass the amount identity for any quantity, but their
/// quantities must still sum without overflow.
#[test]
fn quantity_total_overflow_rejects_run() {
    let huge = SalesFact {
        quantity: Some(i64::MAX),
        price: Some(0.0),
        sales_amount: Some(0.0),
        ..base_fact()
    };
    let single = run(&dataset_with(huge.clone()));
    assert!(single.is_ok(), "one maximal quantity still fits: {single:?}");

    let mut dataset = dataset_with(huge.clone());
    dataset.sales.push(SalesFact { order_number: "SO2".into(), ..huge });
    assert_malformed(run(&dataset), "overflows");
}

// ── Recoverable conditions ───────────────────────────────────────────────────

#[test]
fn unknown_product_is_a_warning_not_an_error() {
    let fact = SalesFact { product_key: 77, ..base_fact() };
    let output = run(&dataset_with(fact)).unwrap();

    assert!(output.warnings.iter().any(|w| w.is_referential_gap()));
    assert_eq!(output.product_report.len(), 1, "unknown product gets no row");
    assert_eq!(output.product_report[0].metrics.total_sales, 0.0);
    assert!(
        (output.customer_report[0].metrics.total_sales - 100.0).abs() < 1e-9,
        "the customer side of the fact still counts"
    );
}

#[test]
fn undated_fact_is_excluded_with_warning() {
    let fact = SalesFact {
        order_date: None,
        ..base_fact()
    };
    let output = run(&dataset_with(fact)).unwrap();

    assert_eq!(output.warnings, vec![RunWarning::UndatedFact { order_number: "SO1".into() }]);
    assert_eq!(output.customer_report[0].metrics.total_sales, 0.0);
    assert_eq!(output.customer_report[0].segment, None);
    assert!(output.period_series.is_empty());
}

// ── Configuration ────────────────────────────────────────────────────────────

#[test]
fn zero_moving_average_window_fails_fast() {
    let config = AnalyticsConfig {
        moving_average_window: 0,
        ..AnalyticsConfig::default_test()
    };
    match AnalyticsEngine::new(config) {
        Err(AnalyticsError::Configuration { option, .. }) => {
            assert_eq!(option, "moving_average_window")
        }
        Err(other) => panic!("expected Configuration error, got {other:?}"),
        Ok(_) => panic!("window 0 must be rejected"),
    }
}

#[test]
fn invalid_options_are_rejected() {
    let cases = [
        AnalyticsConfig { vip_sales_threshold: -1.0, ..AnalyticsConfig::default_test() },
        AnalyticsConfig { vip_sales_threshold: f64::NAN, ..AnalyticsConfig::default_test() },
        AnalyticsConfig { age_bucket_width: 0, ..AnalyticsConfig::default_test() },
        AnalyticsConfig { age_bucket_ceiling: 20, ..AnalyticsConfig::default_test() },
        AnalyticsConfig { cost_range_bounds: vec![500.0, 100.0], ..AnalyticsConfig::default_test() },
        AnalyticsConfig { workers: 0, ..AnalyticsConfig::default_test() },
        AnalyticsConfig { sales_amount_tolerance: -0.5, ..AnalyticsConfig::default_test() },
    ];
    for config in cases {
        assert!(
            matches!(config.validate(), Err(AnalyticsError::Configuration { .. })),
            "config should be rejected: {config:?}"
        );
    }
}

#[test]
fn config_json_fills_defaults() {
    let config: AnalyticsConfig =
        serde_json::from_str(r#"{ "vip_sales_threshold": 2500, "time_series_granularity": "year" }"#)
            .unwrap();
    assert_eq!(config.vip_sales_threshold, 2500.0);
    assert_eq!(config.moving_average_window, 3);
    assert_eq!(config.age_bucket_width, 10);
    assert_eq!(config.reference_timestamp, None);
    assert!(config.validate().is_ok());
}

/// Without a configured reference the latest order date is used; with no
/// dated facts at all there is nothing to derive it from.
#[test]
fn reference_defaults_to_latest_order_date() {
    let engine = AnalyticsEngine::new(AnalyticsConfig::default()).unwrap();

    let output = engine.run(&dataset_with(base_fact()), "ref".into()).unwrap();
    assert_eq!(output.reference_date, d(2024, 1, 10));

    let undated = SalesFact { order_date: None, ..base_fact() };
    assert!(matches!(
        engine.run(&dataset_with(undated), "ref".into()),
        Err(AnalyticsError::UnresolvedReference)
    ));
}
