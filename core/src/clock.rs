//! Reference clock — the single "now" shared by every computation in a run.
//!
//! RULE: Nothing in the engine reads the system clock.
//! Recency, age and any other "as of" figure is measured against the
//! reference date held here, resolved once before computation starts.

use crate::error::{AnalyticsError, AnalyticsResult};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferenceClock {
    pub reference: NaiveDate,
}

impl ReferenceClock {
    pub fn new(reference: NaiveDate) -> Self {
        Self { reference }
    }

    /// Use the configured date if present, otherwise the latest order date
    /// among `order_dates`. Fails when neither is available.
    pub fn resolve<I>(configured: Option<NaiveDate>, order_dates: I) -> AnalyticsResult<Self>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        if let Some(date) = configured {
            return Ok(Self::new(date));
        }
        order_dates
            .into_iter()
            .max()
            .map(Self::new)
            .ok_or(AnalyticsError::UnresolvedReference)
    }

    /// Whole months from `date` up to the reference. Negative if `date` is later.
    pub fn months_since(&self, date: NaiveDate) -> i64 {
        months_between(date, self.reference)
    }

    /// Whole years from `date` up to the reference. Negative if `date` is later.
    pub fn years_since(&self, date: NaiveDate) -> i64 {
        years_between(date, self.reference)
    }
}

/// Number of completed calendar months between two dates.
/// A month only counts once the day-of-month has been reached again.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    if to < from {
        return -months_between(to, from);
    }
    let mut months = (to.year() as i64 - from.year() as i64) * 12
        + (to.month() as i64 - from.month() as i64);
    if to.day() < from.day() {
        months -= 1;
    }
    months
}

/// Number of completed years between two dates (birthday semantics).
pub fn years_between(from: NaiveDate, to: NaiveDate) -> i64 {
    if to < from {
        return -years_between(to, from);
    }
    let mut years = to.year() as i64 - from.year() as i64;
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years -= 1;
    }
    years
}
