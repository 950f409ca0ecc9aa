//! Product performance analyses built on top of the validated facts:
//! yearly performance against the product's own average and prior year,
//! and each category's share of overall sales.

use crate::{
    dataset::{Product, ValidFact},
    time_series::round2,
    types::EntityKey,
};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const UNCATEGORIZED: &str = "n/a";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AvgComparison {
    AboveAvg,
    BelowAvg,
    Avg,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum YearOverYear {
    Increase,
    Decrease,
    NoChange,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YearlyProductPerformance {
    pub year:             i32,
    pub product_key:      EntityKey,
    pub product_name:     String,
    pub current_sales:    f64,
    /// Mean of the product's yearly sales over the years it sold.
    pub avg_sales:        f64,
    pub diff_avg:         f64,
    pub avg_comparison:   AvgComparison,
    /// Sales of the product's previous selling year, if any.
    pub prior_year_sales: Option<f64>,
    pub diff_prior_year:  Option<f64>,
    pub yoy_change:       Option<YearOverYear>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryShare {
    pub category:         String,
    pub total_sales:      f64,
    pub percent_of_total: f64,
}

/// Per product per year, ordered by product key then year.
/// Facts for products missing from the dimension are ignored.
pub fn yearly_product_performance(
    facts: &[ValidFact],
    products: &[Product],
) -> Vec<YearlyProductPerformance> {
    let names: HashMap<EntityKey, &str> = products
        .iter()
        .map(|p| (p.product_key, p.name.as_str()))
        .collect();

    let mut yearly: BTreeMap<EntityKey, BTreeMap<i32, f64>> = BTreeMap::new();
    for fact in facts.iter().filter(|f| names.contains_key(&f.product_key)) {
        *yearly
            .entry(fact.product_key)
            .or_default()
            .entry(fact.order_date.year())
            .or_default() += fact.sales_amount;
    }

    let mut out = Vec::new();
    for (product_key, years) in yearly {
        let avg_sales = years.values().sum::<f64>() / years.len() as f64;
        let mut prior: Option<f64> = None;
        for (year, current_sales) in years {
            let diff_avg = round2(current_sales - avg_sales);
            let diff_prior_year = prior.map(|p| round2(current_sales - p));
            out.push(YearlyProductPerformance {
                year,
                product_key,
                product_name: names.get(&product_key).copied().unwrap_or_default().to_string(),
                current_sales,
                avg_sales,
                diff_avg,
                avg_comparison: if diff_avg > 0.0 {
                    AvgComparison::AboveAvg
                } else if diff_avg < 0.0 {
                    AvgComparison::BelowAvg
                } else {
                    AvgComparison::Avg
                },
                prior_year_sales: prior,
                diff_prior_year,
                yoy_change: diff_prior_year.map(|d| {
                    if d > 0.0 {
                        YearOverYear::Increase
                    } else if d < 0.0 {
                        YearOverYear::Decrease
                    } else {
                        YearOverYear::NoChange
                    }
                }),
            });
            prior = Some(current_sales);
        }
    }
    out
}

/// Sales per category as a share of overall sales, largest first.
/// Only facts with a known product contribute.
pub fn category_share(facts: &[ValidFact], products: &[Product]) -> Vec<CategoryShare> {
    let categories: HashMap<EntityKey, &str> = products
        .iter()
        .map(|p| (p.product_key, p.category.as_deref().unwrap_or(UNCATEGORIZED)))
        .collect();

    let mut totals: HashMap<&str, f64> = HashMap::new();
    for fact in facts {
        if let Some(category) = categories.get(&fact.product_key) {
            *totals.entry(*category).or_default() += fact.sales_amount;
        }
    }
    let overall: f64 = totals.values().sum();

    let mut shares: Vec<CategoryShare> = totals
        .into_iter()
        .map(|(category, total_sales)| CategoryShare {
            category: category.to_string(),
            total_sales,
            percent_of_total: if overall == 0.0 {
                0.0
            } else {
                round2(total_sales / overall * 100.0)
            },
        })
        .collect();
    shares.sort_by(|a, b| {
        b.total_sales
            .total_cmp(&a.total_sales)
            .then_with(|| a.category.cmp(&b.category))
    });
    shares
}
