use super::{date_from_sql, date_to_sql, GoldStore};
use crate::{dataset::Product, error::AnalyticsResult};
use rusqlite::{params, Connection};

pub(super) fn insert(conn: &Connection, p: &Product) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO dim_product (
            product_key, product_name, category, subcategory, cost, start_date
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            p.product_key,
            &p.name,
            &p.category,
            &p.subcategory,
            p.cost,
            date_to_sql(p.start_date),
        ],
    )?;
    Ok(())
}

impl GoldStore {
    // ── Product dimension ─────────────────────────────────────────

    pub fn insert_product(&self, p: &Product) -> AnalyticsResult<()> {
        insert(&self.conn, p)?;
        Ok(())
    }

    pub fn load_products(&self) -> AnalyticsResult<Vec<Product>> {
        let mut stmt = self.conn.prepare(
            "SELECT product_key, product_name, category, subcategory, cost, start_date
             FROM dim_product ORDER BY product_key ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Product {
                product_key: row.get(0)?,
                name:        row.get(1)?,
                category:    row.get(2)?,
                subcategory: row.get(3)?,
                cost:        row.get(4)?,
                start_date:  date_from_sql(row, 5)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
