//! Sample gold dataset generator.
//!
//! Produces a small, internally consistent warehouse extract for demos and
//! determinism tests. Same seed and shape → identical dataset.

use crate::{
    dataset::{Customer, GoldDataset, Product, SalesFact},
    rng::{SampleRng, SampleStream},
};
use chrono::{Days, NaiveDate};

const COUNTRIES: [&str; 6] = [
    "Australia", "Canada", "France", "Germany", "United Kingdom", "United States",
];

const MARITAL: [&str; 2] = ["Married", "Single"];

const CATALOG: [(&str, &[&str]); 4] = [
    ("Bikes", &["Mountain Bikes", "Road Bikes", "Touring Bikes"]),
    ("Components", &["Handlebars", "Wheels", "Chains"]),
    ("Clothing", &["Jerseys", "Gloves", "Caps"]),
    ("Accessories", &["Helmets", "Bottles and Cages", "Tires and Tubes"]),
];

#[derive(Debug, Clone, Copy)]
pub struct SampleShape {
    pub customers: usize,
    pub products:  usize,
    pub orders:    usize,
    /// First possible order date.
    pub start:     NaiveDate,
    /// Span of order dates in days from `start`.
    pub span_days: u64,
}

impl Default for SampleShape {
    fn default() -> Self {
        Self {
            customers: 200,
            products:  30,
            orders:    1500,
            start:     NaiveDate::from_ymd_opt(2021, 1, 1).unwrap_or_default(),
            span_days: 3 * 365,
        }
    }
}

pub fn generate(seed: u64, shape: SampleShape) -> GoldDataset {
    let customers = generate_customers(seed, &shape);
    let products = generate_products(seed, &shape);
    let sales = generate_sales(seed, &shape, &products);
    log::debug!(
        "sample dataset seed={seed}: {} customers, {} products, {} facts",
        customers.len(),
        products.len(),
        sales.len(),
    );
    GoldDataset { customers, products, sales }
}

fn generate_customers(seed: u64, shape: &SampleShape) -> Vec<Customer> {
    let mut rng = SampleRng::for_stream(seed, SampleStream::Customers);
    let customers: Vec<Customer> = (0..shape.customers)
        .map(|i| {
            // Roughly 5% of customers have no birth date on file.
            let birth_date = if rng.chance(0.05) {
                None
            } else {
                let days = 365 * 18 + rng.next_u64_below(365 * 60);
                shape.start.checked_sub_days(Days::new(days))
            };
            Customer {
                customer_key:   i as i64 + 1,
                create_date:    Some(shape.start),
                birth_date,
                country:        rng.pick(&COUNTRIES).map(|s| s.to_string()),
                marital_status: rng.pick(&MARITAL).map(|s| s.to_string()),
            }
        })
        .collect();
    log::trace!("stream {}: {} records", rng.stream().name(), customers.len());
    customers
}

fn generate_products(seed: u64, shape: &SampleShape) -> Vec<Product> {
    let mut rng = SampleRng::for_stream(seed, SampleStream::Products);
    let products: Vec<Product> = (0..shape.products)
        .map(|i| {
            let (category, subcategories) = CATALOG[i % CATALOG.len()];
            let subcategory = rng.pick(subcategories).map(|s| s.to_string());
            let cost = (rng.pareto(5.0, 1.2).min(2500.0) * 100.0).round() / 100.0;
            Product {
                product_key: i as i64 + 1,
                name:        format!("{} {:03}", subcategory.as_deref().unwrap_or(category), i + 1),
                category:    Some(category.to_string()),
                subcategory,
                cost,
                start_date:  Some(shape.start),
            }
        })
        .collect();
    log::trace!("stream {}: {} records", rng.stream().name(), products.len());
    products
}

fn generate_sales(seed: u64, shape: &SampleShape, products: &[Product]) -> Vec<SalesFact> {
    let mut rng = SampleRng::for_stream(seed, SampleStream::Sales);
    let mut facts = Vec::new();
    if shape.customers == 0 || products.is_empty() {
        return facts;
    }

    for order in 0..shape.orders {
        let order_number = format!("SO{:06}", order + 1);
        let customer_key = rng.next_u64_below(shape.customers as u64) as i64 + 1;
        let order_date = shape
            .start
            .checked_add_days(Days::new(rng.next_u64_below(shape.span_days.max(1))));
        let shipping_date = order_date.and_then(|d| d.checked_add_days(Days::new(7)));
        let due_date = order_date.and_then(|d| d.checked_add_days(Days::new(12)));

        let lines = 1 + rng.next_u64_below(3);
        for _ in 0..lines {
            let Some(product) = rng.pick(products) else {
                continue;
            };
            let quantity = 1 + rng.next_u64_below(3) as i64;
            let markup = 1.2 + rng.next_f64() * 0.6;
            let price = (product.cost * markup * 100.0).round() / 100.0;
            facts.push(SalesFact {
                order_number: order_number.clone(),
                customer_key,
                product_key: product.product_key,
                order_date,
                shipping_date,
                due_date,
                sales_amount: Some(quantity as f64 * price),
                quantity: Some(quantity),
                price: Some(price),
            });
        }
    }
    log::trace!("stream {}: {} records", rng.stream().name(), facts.len());
    facts
}
