//! Sample log - the append-only time-series store
//!
//! Persists one `Sample` per mutation notification, keyed by
//! `(partition_key, timestamp)`, and serves ascending paginated range scans
//! over them. Two implementations are provided:
//!
//! - [`MemorySampleStore`]: in-process, used in tests and as an embedded
//!   default
//! - [`SqliteSampleStore`]: durable, backed by a single SQLite table
//!
//! The store never updates or deletes a sample. Retention is an external
//! concern.

mod error;
mod memory;
mod sqlite;
mod types;

pub use error::{StoreError, StoreResult};
pub use memory::MemorySampleStore;
pub use sqlite::SqliteSampleStore;
pub use types::{PageToken, Sample, SamplePage};

use async_trait::async_trait;

/// Default number of rows returned per scan page
pub const DEFAULT_SAMPLE_PAGE_SIZE: usize = 100;

/// Append-only, range-queryable store of [`Sample`]s
///
/// Appends are atomic per row; readers never observe a torn row. Scans are
/// ascending in `(timestamp, insertion order)` and paginate via an opaque
/// [`PageToken`]; callers must loop until `next` is `None` rather than
/// assuming a single page holds all matching rows.
#[async_trait]
pub trait SampleStore: Send + Sync {
    /// Append one sample. Never overwrites existing rows.
    async fn append(&self, sample: Sample) -> StoreResult<()>;

    /// Read one page of samples for `partition` with `timestamp >= since`,
    /// ascending, starting after `token` (or from the beginning when `None`).
    async fn scan_page(
        &self,
        partition: &str,
        since: i64,
        token: Option<PageToken>,
    ) -> StoreResult<SamplePage>;
}
