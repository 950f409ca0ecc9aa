use super::{date_from_sql, date_to_sql, GoldStore};
use crate::{dataset::Customer, error::AnalyticsResult};
use rusqlite::{params, Connection};

pub(super) fn insert(conn: &Connection, c: &Customer) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO dim_customer (
            customer_key, create_date, birth_date, country, marital_status
        ) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            c.customer_key,
            date_to_sql(c.create_date),
            date_to_sql(c.birth_date),
            &c.country,
            &c.marital_status,
        ],
    )?;
    Ok(())
}

impl GoldStore {
    // ── Customer dimension ────────────────────────────────────────

    pub fn insert_customer(&self, c: &Customer) -> AnalyticsResult<()> {
        insert(&self.conn, c)?;
        Ok(())
    }

    pub fn load_customers(&self) -> AnalyticsResult<Vec<Customer>> {
        let mut stmt = self.conn.prepare(
            "SELECT customer_key, create_date, birth_date, country, marital_status
             FROM dim_customer ORDER BY customer_key ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Customer {
                customer_key:   row.get(0)?,
                create_date:    date_from_sql(row, 1)?,
                birth_date:     date_from_sql(row, 2)?,
                country:        row.get(3)?,
                marital_status: row.get(4)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn customer_count(&self) -> AnalyticsResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM dim_customer", [], |row| row.get(0))?;
        Ok(count)
    }
}
