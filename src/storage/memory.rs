//! In-memory sample log
//!
//! Keeps every appended sample in insertion order behind a mutex. Used as
//! the test double for the durable store and as the embedded default when
//! no database path is configured. Pagination behaves exactly like the
//! SQLite store so page-boundary behavior can be exercised without disk.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::storage::{
    PageToken, Sample, SamplePage, SampleStore, StoreError, StoreResult, DEFAULT_SAMPLE_PAGE_SIZE,
};

/// In-memory, insertion-ordered sample log
pub struct MemorySampleStore {
    /// (insertion sequence, sample), in append order
    rows: Mutex<Vec<(i64, Sample)>>,
    page_size: usize,
}

impl MemorySampleStore {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_SAMPLE_PAGE_SIZE)
    }

    /// Create with a custom page size; tests use small sizes to force
    /// multi-page scans
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            page_size: page_size.max(1),
        }
    }

    /// Total number of samples across all partitions
    pub fn len(&self) -> usize {
        self.rows.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemorySampleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SampleStore for MemorySampleStore {
    async fn append(&self, sample: Sample) -> StoreResult<()> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        let seq = rows.len() as i64;
        rows.push((seq, sample));
        Ok(())
    }

    async fn scan_page(
        &self,
        partition: &str,
        since: i64,
        token: Option<PageToken>,
    ) -> StoreResult<SamplePage> {
        let rows = self
            .rows
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))?;

        // Materialize the matching rows in (timestamp, seq) order. The vec
        // holds insertion order, which only coincides with timestamp order
        // when clocks behave; a stable sort restores the scan contract.
        let mut matching: Vec<(i64, &Sample)> = rows
            .iter()
            .filter(|(_, s)| s.partition_key == partition && s.timestamp >= since)
            .map(|(seq, s)| (*seq, s))
            .collect();
        matching.sort_by_key(|(seq, s)| (s.timestamp, *seq));

        let start = match token {
            Some(t) => matching
                .iter()
                .position(|(seq, s)| (s.timestamp, *seq) > (t.timestamp, t.seq))
                .unwrap_or(matching.len()),
            None => 0,
        };

        let page: Vec<(i64, &Sample)> = matching
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .collect();

        let next = if page.len() == self.page_size {
            page.last().map(|(seq, s)| PageToken {
                timestamp: s.timestamp,
                seq: *seq,
            })
        } else {
            None
        };

        Ok(SamplePage {
            samples: page.into_iter().map(|(_, s)| s.clone()).collect(),
            next,
        })
    }
}
