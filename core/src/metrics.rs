//! Metric calculators — per-entity aggregates over validated sales facts.
//!
//! All functions here are pure: same facts + same reference clock gives
//! the same metrics. An entity with no facts gets zeroed metrics, never
//! an error.

use crate::{
    clock::ReferenceClock,
    dataset::{Customer, Product, ValidFact},
    error::AnalyticsResult,
    partition::fan_out,
    types::EntityKey,
    warning::{RunWarning, WarningEntity},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerMetrics {
    pub customer_key:      EntityKey,
    pub fact_count:        usize,
    /// Distinct order numbers.
    pub total_orders:      usize,
    pub total_sales:       f64,
    pub total_quantity:    i64,
    /// Distinct products bought.
    pub total_products:    usize,
    pub first_order_date:  Option<NaiveDate>,
    pub last_order_date:   Option<NaiveDate>,
    pub lifespan_months:   i64,
    /// None when the customer never ordered.
    pub recency_months:    Option<i64>,
    /// None when birth date is absent or after the reference date.
    pub age:               Option<u32>,
    pub avg_order_value:   f64,
    pub avg_monthly_spend: f64,
}

impl CustomerMetrics {
    /// Zeroed metrics for a customer with no sales facts.
    pub fn inactive(customer_key: EntityKey) -> Self {
        Self {
            customer_key,
            fact_count:        0,
            total_orders:      0,
            total_sales:       0.0,
            total_quantity:    0,
            total_products:    0,
            first_order_date:  None,
            last_order_date:   None,
            lifespan_months:   0,
            recency_months:    None,
            age:               None,
            avg_order_value:   0.0,
            avg_monthly_spend: 0.0,
        }
    }

    pub fn has_activity(&self) -> bool {
        self.fact_count > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductMetrics {
    pub product_key:         EntityKey,
    pub fact_count:          usize,
    pub total_orders:        usize,
    pub total_sales:         f64,
    pub total_quantity:      i64,
    pub total_customers:     usize,
    pub first_sale_date:     Option<NaiveDate>,
    pub last_sale_date:      Option<NaiveDate>,
    pub lifespan_months:     i64,
    pub recency_months:      Option<i64>,
    /// Mean unit price over the product's order lines.
    pub avg_selling_price:   f64,
    pub avg_order_revenue:   f64,
    pub avg_monthly_revenue: f64,
}

impl ProductMetrics {
    /// Zeroed metrics for a product with no sales facts.
    pub fn inactive(product_key: EntityKey) -> Self {
        Self {
            product_key,
            fact_count:          0,
            total_orders:        0,
            total_sales:         0.0,
            total_quantity:      0,
            total_customers:     0,
            first_sale_date:     None,
            last_sale_date:      None,
            lifespan_months:     0,
            recency_months:      None,
            avg_selling_price:   0.0,
            avg_order_revenue:   0.0,
            avg_monthly_revenue: 0.0,
        }
    }

    pub fn has_activity(&self) -> bool {
        self.fact_count > 0
    }
}

// ── Fact index ───────────────────────────────────────────────────────────────

/// Facts grouped by customer and by product, built once per run.
/// Facts whose key is absent from a dimension are simply never looked up.
pub struct FactIndex<'a> {
    by_customer: HashMap<EntityKey, Vec<&'a ValidFact>>,
    by_product:  HashMap<EntityKey, Vec<&'a ValidFact>>,
}

impl<'a> FactIndex<'a> {
    pub fn build(facts: &'a [ValidFact]) -> Self {
        let mut by_customer: HashMap<EntityKey, Vec<&'a ValidFact>> = HashMap::new();
        let mut by_product: HashMap<EntityKey, Vec<&'a ValidFact>> = HashMap::new();
        for fact in facts {
            by_customer.entry(fact.customer_key).or_default().push(fact);
            by_product.entry(fact.product_key).or_default().push(fact);
        }
        Self { by_customer, by_product }
    }

    pub fn for_customer(&self, key: EntityKey) -> &[&'a ValidFact] {
        self.by_customer.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn for_product(&self, key: EntityKey) -> &[&'a ValidFact] {
        self.by_product.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }
}

// ── Shared aggregation ───────────────────────────────────────────────────────

struct Totals {
    fact_count:     usize,
    total_orders:   usize,
    total_sales:    f64,
    total_quantity: i64,
    first:          Option<NaiveDate>,
    last:           Option<NaiveDate>,
}

impl Totals {
    fn over(facts: &[&ValidFact]) -> Self {
        let orders: HashSet<&str> = facts.iter().map(|f| f.order_number.as_str()).collect();
        Self {
            fact_count:     facts.len(),
            total_orders:   orders.len(),
            total_sales:    facts.iter().map(|f| f.sales_amount).sum(),
            total_quantity: facts.iter().map(|f| f.quantity).sum(),
            first:          facts.iter().map(|f| f.order_date).min(),
            last:           facts.iter().map(|f| f.order_date).max(),
        }
    }

    fn lifespan_months(&self) -> i64 {
        match (self.first, self.last) {
            (Some(first), Some(last)) => crate::clock::months_between(first, last).max(0),
            _ => 0,
        }
    }

    fn per_order(&self) -> f64 {
        if self.total_orders == 0 {
            0.0
        } else {
            self.total_sales / self.total_orders as f64
        }
    }

    fn per_month(&self, lifespan: i64) -> f64 {
        if lifespan == 0 {
            self.total_sales
        } else {
            self.total_sales / lifespan as f64
        }
    }
}

/// Months since `last`, clamped at zero. A clamped value yields a warning.
fn recency(
    clock: &ReferenceClock,
    last: Option<NaiveDate>,
    entity: WarningEntity,
    key: EntityKey,
    warnings: &mut Vec<RunWarning>,
) -> Option<i64> {
    let months = clock.months_since(last?);
    if last? > clock.reference {
        warnings.push(RunWarning::ReferenceBeforeLastOrder { entity, key });
    }
    Some(months.max(0))
}

// ── Calculators ──────────────────────────────────────────────────────────────

/// Aggregate one customer's facts. `facts` must all belong to `customer`.
pub fn customer_metrics(
    customer: &Customer,
    facts: &[&ValidFact],
    clock: &ReferenceClock,
) -> (CustomerMetrics, Vec<RunWarning>) {
    let mut warnings = Vec::new();
    let totals = Totals::over(facts);
    let lifespan = totals.lifespan_months();
    let products: HashSet<EntityKey> = facts.iter().map(|f| f.product_key).collect();

    let age = customer.birth_date.and_then(|birth| {
        let years = clock.years_since(birth);
        if birth > clock.reference {
            warnings.push(RunWarning::BirthDateAfterReference {
                customer_key: customer.customer_key,
            });
            None
        } else {
            u32::try_from(years).ok()
        }
    });
    let recency_months = recency(
        clock,
        totals.last,
        WarningEntity::Customer,
        customer.customer_key,
        &mut warnings,
    );

    let metrics = CustomerMetrics {
        customer_key:      customer.customer_key,
        fact_count:        totals.fact_count,
        total_orders:      totals.total_orders,
        total_sales:       totals.total_sales,
        total_quantity:    totals.total_quantity,
        total_products:    products.len(),
        first_order_date:  totals.first,
        last_order_date:   totals.last,
        lifespan_months:   lifespan,
        recency_months,
        age,
        avg_order_value:   totals.per_order(),
        avg_monthly_spend: totals.per_month(lifespan),
    };
    (metrics, warnings)
}

/// Aggregate one product's facts. `facts` must all belong to `product`.
pub fn product_metrics(
    product: &Product,
    facts: &[&ValidFact],
    clock: &ReferenceClock,
) -> (ProductMetrics, Vec<RunWarning>) {
    let mut warnings = Vec::new();
    let totals = Totals::over(facts);
    let lifespan = totals.lifespan_months();
    let customers: HashSet<EntityKey> = facts.iter().map(|f| f.customer_key).collect();
    let avg_selling_price = if facts.is_empty() {
        0.0
    } else {
        facts.iter().map(|f| f.price).sum::<f64>() / facts.len() as f64
    };
    let recency_months = recency(
        clock,
        totals.last,
        WarningEntity::Product,
        product.product_key,
        &mut warnings,
    );

    let metrics = ProductMetrics {
        product_key:         product.product_key,
        fact_count:          totals.fact_count,
        total_orders:        totals.total_orders,
        total_sales:         totals.total_sales,
        total_quantity:      totals.total_quantity,
        total_customers:     customers.len(),
        first_sale_date:     totals.first,
        last_sale_date:      totals.last,
        lifespan_months:     lifespan,
        recency_months,
        avg_selling_price,
        avg_order_revenue:   totals.per_order(),
        avg_monthly_revenue: totals.per_month(lifespan),
    };
    (metrics, warnings)
}

/// Total sales for one customer over an unindexed fact collection.
/// Zero when nothing matches.
pub fn customer_total_sales(facts: &[ValidFact], customer_key: EntityKey) -> f64 {
    facts
        .iter()
        .filter(|f| f.customer_key == customer_key)
        .map(|f| f.sales_amount)
        .sum()
}

// ── Batch evaluation ─────────────────────────────────────────────────────────

/// Metrics for every customer, in dimension order.
pub fn compute_customer_metrics(
    customers: &[Customer],
    index: &FactIndex<'_>,
    clock: &ReferenceClock,
    workers: usize,
) -> AnalyticsResult<(Vec<CustomerMetrics>, Vec<RunWarning>)> {
    let results = fan_out(customers, workers, |c| {
        customer_metrics(c, index.for_customer(c.customer_key), clock)
    })?;
    Ok(split(results))
}

/// Metrics for every product, in dimension order.
pub fn compute_product_metrics(
    products: &[Product],
    index: &FactIndex<'_>,
    clock: &ReferenceClock,
    workers: usize,
) -> AnalyticsResult<(Vec<ProductMetrics>, Vec<RunWarning>)> {
    let results = fan_out(products, workers, |p| {
        product_metrics(p, index.for_product(p.product_key), clock)
    })?;
    Ok(split(results))
}

fn split<M>(results: Vec<(M, Vec<RunWarning>)>) -> (Vec<M>, Vec<RunWarning>) {
    let mut metrics = Vec::with_capacity(results.len());
    let mut warnings = Vec::new();
    for (m, w) in results {
        metrics.push(m);
        warnings.extend(w);
    }
    (metrics, warnings)
}
