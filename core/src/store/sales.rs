use super::{date_from_sql, date_to_sql, GoldStore};
use crate::{dataset::SalesFact, error::AnalyticsResult};
use rusqlite::{params, Connection};

pub(super) fn insert(conn: &Connection, f: &SalesFact) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO fact_sales (
            order_number, customer_key, product_key, order_date, shipping_date,
            due_date, sales_amount, quantity, price
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            &f.order_number,
            f.customer_key,
            f.product_key,
            date_to_sql(f.order_date),
            date_to_sql(f.shipping_date),
            date_to_sql(f.due_date),
            f.sales_amount,
            f.quantity,
            f.price,
        ],
    )?;
    Ok(())
}

impl GoldStore {
    // ── Sales facts ───────────────────────────────────────────────

    pub fn insert_sales_fact(&self, f: &SalesFact) -> AnalyticsResult<()> {
        insert(&self.conn, f)?;
        Ok(())
    }

    /// All facts in insertion order.
    pub fn load_sales(&self) -> AnalyticsResult<Vec<SalesFact>> {
        let mut stmt = self.conn.prepare(
            "SELECT order_number, customer_key, product_key, order_date, shipping_date,
                    due_date, sales_amount, quantity, price
             FROM fact_sales ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SalesFact {
                order_number:  row.get(0)?,
                customer_key:  row.get(1)?,
                product_key:   row.get(2)?,
                order_date:    date_from_sql(row, 3)?,
                shipping_date: date_from_sql(row, 4)?,
                due_date:      date_from_sql(row, 5)?,
                sales_amount:  row.get(6)?,
                quantity:      row.get(7)?,
                price:         row.get(8)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn sales_fact_count(&self) -> AnalyticsResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM fact_sales", [], |row| row.get(0))?;
        Ok(count)
    }
}
