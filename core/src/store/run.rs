use super::{date_to_sql, GoldStore};
use crate::{
    config::AnalyticsConfig,
    engine::RunOutput,
    error::{AnalyticsError, AnalyticsResult},
    warning::RunWarning,
};
use rusqlite::params;

impl GoldStore {
    // ── Run log ───────────────────────────────────────────────────

    /// Record a finished run and its warnings in one transaction.
    pub fn record_run(
        &mut self,
        output: &RunOutput,
        config: &AnalyticsConfig,
    ) -> AnalyticsResult<()> {
        let config_json = serde_json::to_string(config)?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO analytics_run (run_id, reference_date, config_json)
             VALUES (?1, ?2, ?3)",
            params![
                &output.run_id,
                date_to_sql(Some(output.reference_date)),
                config_json,
            ],
        )?;
        for warning in &output.warnings {
            tx.execute(
                "INSERT INTO run_warning (run_id, warning_type, payload)
                 VALUES (?1, ?2, ?3)",
                params![
                    &output.run_id,
                    warning.type_name(),
                    serde_json::to_string(warning)?,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Warnings of a recorded run, in the order they were raised.
    pub fn warnings_for_run(&self, run_id: &str) -> AnalyticsResult<Vec<RunWarning>> {
        let mut stmt = self.conn.prepare(
            "SELECT payload FROM run_warning WHERE run_id = ?1 ORDER BY id ASC",
        )?;
        let payloads = stmt
            .query_map(params![run_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        payloads
            .iter()
            .map(|p| serde_json::from_str(p).map_err(AnalyticsError::from))
            .collect()
    }

    pub fn run_count(&self) -> AnalyticsResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM analytics_run", [], |row| row.get(0))?;
        Ok(count)
    }
}
