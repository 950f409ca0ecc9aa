use chrono::NaiveDate;
use gold_analytics_core::{
    dataset::ValidFact,
    time_series::{
        build_period_series, growth_rate, moving_average, running_total, Granularity, Measure,
        PeriodKey,
    },
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn fact(customer_key: i64, date: NaiveDate, qty: i64, price: f64) -> ValidFact {
    ValidFact {
        order_number: format!("SO-{customer_key}-{date}"),
        customer_key,
        product_key: 1,
        order_date: date,
        sales_amount: qty as f64 * price,
        quantity: qty,
        price,
    }
}

// ── Window functions ─────────────────────────────────────────────────────────

#[test]
fn growth_rate_from_100_to_150_is_50() {
    assert_eq!(growth_rate(100.0, 150.0), Some(50.0));
    assert_eq!(growth_rate(150.0, 100.0), Some(-33.33));
}

#[test]
fn growth_rate_from_zero_is_null_not_infinity() {
    assert_eq!(growth_rate(0.0, 150.0), None);
    assert_eq!(growth_rate(0.0, 0.0), None);
}

#[test]
fn moving_average_window_three() {
    assert_eq!(
        moving_average(&[10.0, 20.0, 30.0, 40.0], 3),
        vec![None, None, Some(20.0), Some(30.0)]
    );
    assert_eq!(moving_average(&[10.0, 20.0], 3), vec![None, None]);
    assert_eq!(moving_average(&[7.0, 9.0], 1), vec![Some(7.0), Some(9.0)]);
}

#[test]
fn running_total_is_monotonic_for_non_negative_values() {
    let values = [5.0, 0.0, 12.5, 3.0, 0.0, 40.0];
    let totals = running_total(&values);
    assert_eq!(totals, vec![5.0, 5.0, 17.5, 20.5, 20.5, 60.5]);
    assert!(totals.windows(2).all(|w| w[0] <= w[1]));
}

// ── Period series ────────────────────────────────────────────────────────────

/// Missing months stay missing; "previous" is the previous bucket present.
#[test]
fn monthly_series_preserves_gaps() {
    let facts = vec![
        fact(1, d(2023, 1, 5), 1, 100.0),
        fact(2, d(2023, 2, 9), 3, 50.0),
        fact(1, d(2023, 4, 1), 0, 10.0),
        fact(3, d(2023, 5, 20), 2, 30.0),
    ];
    let series = build_period_series(&facts, Granularity::Month, Measure::Sales, 2);

    let periods: Vec<String> = series.iter().map(|b| b.period.to_string()).collect();
    assert_eq!(periods, vec!["2023-01", "2023-02", "2023-04", "2023-05"]);

    let growth: Vec<Option<f64>> = series.iter().map(|b| b.growth_rate).collect();
    assert_eq!(growth, vec![None, Some(50.0), Some(-100.0), None]);

    assert_eq!(series[2].prior_value, Some(150.0), "April's prior is February");
    assert_eq!(series[0].prior_value, None);

    let running: Vec<f64> = series.iter().map(|b| b.running_total).collect();
    assert_eq!(running, vec![100.0, 250.0, 250.0, 310.0]);

    let averages: Vec<Option<f64>> = series.iter().map(|b| b.moving_average).collect();
    assert_eq!(averages, vec![None, Some(125.0), Some(75.0), Some(30.0)]);
}

#[test]
fn buckets_count_distinct_customers_and_quantity() {
    let facts = vec![
        fact(1, d(2024, 3, 1), 2, 10.0),
        fact(1, d(2024, 3, 15), 1, 10.0),
        fact(2, d(2024, 3, 31), 4, 10.0),
    ];
    let series = build_period_series(&facts, Granularity::Month, Measure::Customers, 3);

    assert_eq!(series.len(), 1);
    assert_eq!(series[0].period, PeriodKey { year: 2024, month: Some(3) });
    assert_eq!(series[0].total_customers, 2);
    assert_eq!(series[0].total_quantity, 7);
    assert_eq!(series[0].running_total, 2.0, "running total follows the customer measure");
}

#[test]
fn yearly_granularity_collapses_months() {
    let facts = vec![
        fact(1, d(2022, 1, 1), 1, 100.0),
        fact(1, d(2022, 12, 31), 1, 100.0),
        fact(2, d(2023, 6, 1), 1, 300.0),
    ];
    let series = build_period_series(&facts, Granularity::Year, Measure::Sales, 3);

    assert_eq!(series.len(), 2);
    assert_eq!(series[0].period.to_string(), "2022");
    assert_eq!(series[0].total_sales, 200.0);
    assert_eq!(series[1].growth_rate, Some(50.0));
    assert_eq!(series[1].running_total, 500.0);
}

#[test]
fn empty_facts_give_empty_series() {
    assert!(build_period_series(&[], Granularity::Month, Measure::Sales, 3).is_empty());
}
