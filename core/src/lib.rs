//! Gold-layer business analytics: customer and product metrics,
//! rule-based segmentation, period series and report assembly over a
//! read-only warehouse extract.

pub mod clock;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod partition;
pub mod performance;
pub mod report;
pub mod rng;
pub mod sample;
pub mod segmentation;
pub mod store;
pub mod time_series;
pub mod types;
pub mod warning;
