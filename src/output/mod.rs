//! Output module for crawl records and run summaries
//!
//! This module handles:
//! - The raw and clean row shapes written per fetched page
//! - Writing each site's batch as JSON lines
//! - Per-site counters and the end-of-run summary

mod records;
mod sink;
mod summary;

pub use records::{CleanRow, RawRow};
pub use sink::{JsonlSink, RecordSink, SinkError, SinkReceipt, SinkResult, ITEMS_FILE};
pub use summary::{print_summary, RunSummary, SiteReport};
