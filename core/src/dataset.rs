//! Gold-layer source records and the input contract the engine enforces.
//!
//! The three collections are fully materialized before a run starts and
//! are never mutated by the engine. `validate_dataset` is the only place
//! a raw `SalesFact` becomes a `ValidFact`; every later stage works on
//! validated facts alone.

use crate::{
    error::{AnalyticsError, AnalyticsResult},
    types::{EntityKey, OrderNumber},
    warning::RunWarning,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub customer_key:   EntityKey,
    pub create_date:    Option<NaiveDate>,
    pub birth_date:     Option<NaiveDate>,
    pub country:        Option<String>,
    pub marital_status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub product_key: EntityKey,
    pub name:        String,
    pub category:    Option<String>,
    pub subcategory: Option<String>,
    pub cost:        f64,
    pub start_date:  Option<NaiveDate>,
}

/// One order line as delivered by the warehouse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalesFact {
    pub order_number:  OrderNumber,
    pub customer_key:  EntityKey,
    pub product_key:   EntityKey,
    pub order_date:    Option<NaiveDate>,
    pub shipping_date: Option<NaiveDate>,
    pub due_date:      Option<NaiveDate>,
    pub sales_amount:  Option<f64>,
    pub quantity:      Option<i64>,
    pub price:         Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GoldDataset {
    pub customers: Vec<Customer>,
    pub products:  Vec<Product>,
    pub sales:     Vec<SalesFact>,
}

/// A fact that passed validation: dated, with a resolved amount.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidFact {
    pub order_number: OrderNumber,
    pub customer_key: EntityKey,
    pub product_key:  EntityKey,
    pub order_date:   NaiveDate,
    pub sales_amount: f64,
    pub quantity:     i64,
    pub price:        f64,
}

#[derive(Debug, Clone, Default)]
pub struct ValidatedFacts {
    pub facts:    Vec<ValidFact>,
    pub warnings: Vec<RunWarning>,
}

/// Check every record against the structural invariants.
///
/// Structural violations reject the whole run. Referential gaps and
/// undated facts are recoverable: they produce a warning and the fact is
/// left out of whatever it cannot be attributed to.
pub fn validate_dataset(dataset: &GoldDataset, tolerance: f64) -> AnalyticsResult<ValidatedFacts> {
    let customer_keys = unique_keys(
        "customer",
        dataset.customers.iter().map(|c| c.customer_key),
    )?;
    let product_keys = unique_keys(
        "product",
        dataset.products.iter().map(|p| p.product_key),
    )?;

    for product in &dataset.products {
        if !product.cost.is_finite() || product.cost < 0.0 {
            return Err(AnalyticsError::malformed(
                "product",
                product.product_key,
                format!("cost must be a non-negative number, got {}", product.cost),
            ));
        }
    }

    let mut out = ValidatedFacts::default();
    // Every per-entity or per-period quantity sum is bounded by this total.
    let mut quantity_total: i64 = 0;
    for fact in &dataset.sales {
        check_date_order(fact)?;
        let (sales_amount, quantity, price) = resolve_amount(fact, tolerance)?;

        if !customer_keys.contains(&fact.customer_key) {
            out.warnings.push(RunWarning::UnknownCustomer {
                order_number: fact.order_number.clone(),
                customer_key: fact.customer_key,
            });
        }
        if !product_keys.contains(&fact.product_key) {
            out.warnings.push(RunWarning::UnknownProduct {
                order_number: fact.order_number.clone(),
                product_key:  fact.product_key,
            });
        }

        let Some(order_date) = fact.order_date else {
            out.warnings.push(RunWarning::UndatedFact {
                order_number: fact.order_number.clone(),
            });
            continue;
        };

        quantity_total = quantity_total.checked_add(quantity).ok_or_else(|| {
            AnalyticsError::malformed(
                "sales_fact",
                &fact.order_number,
                format!("quantity {quantity} overflows the dataset quantity total"),
            )
        })?;

        out.facts.push(ValidFact {
            order_number: fact.order_number.clone(),
            customer_key: fact.customer_key,
            product_key: fact.product_key,
            order_date,
            sales_amount,
            quantity,
            price,
        });
    }

    log::debug!(
        "validated {} of {} sales facts ({} warnings)",
        out.facts.len(),
        dataset.sales.len(),
        out.warnings.len(),
    );
    Ok(out)
}

fn unique_keys(
    entity: &'static str,
    keys: impl Iterator<Item = EntityKey>,
) -> AnalyticsResult<HashSet<EntityKey>> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key) {
            return Err(AnalyticsError::malformed(entity, key, "duplicate key in dimension"));
        }
    }
    Ok(seen)
}

fn check_date_order(fact: &SalesFact) -> AnalyticsResult<()> {
    let pairs = [
        ("order date", fact.order_date, "shipping date", fact.shipping_date),
        ("shipping date", fact.shipping_date, "due date", fact.due_date),
        ("order date", fact.order_date, "due date", fact.due_date),
    ];
    for (a_name, a, b_name, b) in pairs {
        if let (Some(a), Some(b)) = (a, b) {
            if a > b {
                return Err(AnalyticsError::malformed(
                    "sales_fact",
                    &fact.order_number,
                    format!("{a_name} {a} is after {b_name} {b}"),
                ));
            }
        }
    }
    Ok(())
}

/// Returns (sales_amount, quantity, price) with the amount identity checked.
fn resolve_amount(fact: &SalesFact, tolerance: f64) -> AnalyticsResult<(f64, i64, f64)> {
    let malformed = |reason: String| AnalyticsError::malformed("sales_fact", &fact.order_number, reason);

    let (quantity, price) = match (fact.quantity, fact.price) {
        (Some(q), Some(p)) => (q, p),
        (q, p) => {
            let missing = match (q, p) {
                (None, None) => "quantity and price",
                (None, _)    => "quantity",
                _            => "price",
            };
            return Err(malformed(format!(
                "{missing} missing, sales amount cannot be checked"
            )));
        }
    };
    if quantity < 0 {
        return Err(malformed(format!("negative quantity {quantity}")));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(malformed(format!("invalid price {price}")));
    }

    let expected = quantity as f64 * price;
    let sales_amount = match fact.sales_amount {
        None => expected,
        Some(amount) if !amount.is_finite() || amount < 0.0 => {
            return Err(malformed(format!("invalid sales amount {amount}")));
        }
        Some(amount) if (amount - expected).abs() > tolerance => {
            return Err(malformed(format!(
                "sales amount {amount} != quantity {quantity} x price {price}"
            )));
        }
        Some(amount) => amount,
    };
    Ok((sales_amount, quantity, price))
}
