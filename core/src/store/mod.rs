//! SQLite gold store — the data-access boundary.
//!
//! RULE: Only the store talks to the database.
//! The engine never sees a connection; callers load a `GoldDataset`
//! here, run the engine, and optionally record the run back.

use crate::error::AnalyticsResult;
use chrono::NaiveDate;
use rusqlite::{types::Type, Connection, Row};

mod customer;
mod product;
mod run;
mod sales;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct GoldStore {
    conn: Connection,
}

impl GoldStore {
    /// Open (or create) the gold database at `path`.
    pub fn open(path: &str) -> AnalyticsResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> AnalyticsResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> AnalyticsResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_gold.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_run_log.sql"))?;
        Ok(())
    }

    /// Load all three gold collections.
    pub fn load_dataset(&self) -> AnalyticsResult<crate::dataset::GoldDataset> {
        let dataset = crate::dataset::GoldDataset {
            customers: self.load_customers()?,
            products:  self.load_products()?,
            sales:     self.load_sales()?,
        };
        log::info!(
            "loaded gold dataset: {} customers, {} products, {} sales facts",
            dataset.customers.len(),
            dataset.products.len(),
            dataset.sales.len(),
        );
        Ok(dataset)
    }

    /// Insert every record of `dataset` in one transaction.
    pub fn seed_dataset(&mut self, dataset: &crate::dataset::GoldDataset) -> AnalyticsResult<()> {
        let tx = self.conn.transaction()?;
        for c in &dataset.customers {
            customer::insert(&tx, c)?;
        }
        for p in &dataset.products {
            product::insert(&tx, p)?;
        }
        for f in &dataset.sales {
            sales::insert(&tx, f)?;
        }
        tx.commit()?;
        Ok(())
    }
}

// ── Date columns ─────────────────────────────────────────────────────────────

fn date_to_sql(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

fn date_from_sql(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let Some(text) = row.get::<_, Option<String>>(idx)? else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(&text, DATE_FORMAT)
        .map(Some)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
