//! WindowQuery - windowed read engine over the sample log
//!
//! Answers one question: "what did the container's size look like over the
//! trailing window, and what is the largest it has ever been?" Two
//! independent paginated scans produce the answer:
//!
//! 1. an ascending range scan for `timestamp >= now - window`, concatenated
//!    across pages into the ordered point sequence
//! 2. a whole-partition scan maintaining a running max of `total_size`
//!
//! The historical high is deliberately unbounded by the window. Both scans
//! are read-only and safe to run concurrently with appends; a bounded page
//! count guards against a store that never stops returning continuation
//! tokens.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use crate::storage::{SampleStore, StoreError};

/// Upper bound on scan pages per query
const MAX_SCAN_PAGES: usize = 100_000;

/// Parse a window spec: plain seconds or "30s" / "5m" / "2h"
///
/// Returns `None` for anything else; callers decide how to report it.
pub fn parse_window(spec: &str) -> Option<u64> {
    if let Ok(seconds) = spec.parse::<u64>() {
        return Some(seconds);
    }

    let re = regex::Regex::new(r"^(\d+)([smh])$").ok()?;
    let caps = re.captures(spec)?;
    let amount: u64 = caps[1].parse().ok()?;
    match &caps[2] {
        "s" => Some(amount),
        "m" => Some(amount * 60),
        "h" => Some(amount * 3600),
        _ => None,
    }
}

/// One charted point: when, and how big the container was
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SamplePoint {
    /// Unix timestamp in seconds
    pub timestamp: i64,
    /// Container total size in bytes at that instant
    pub total_size: u64,
}

/// Result of one windowed query
#[derive(Debug, Clone)]
pub struct WindowResult {
    /// Points with `timestamp >= now - window`, ascending; ties keep
    /// insertion order
    pub points: Vec<SamplePoint>,
    /// Max `total_size` over every sample ever recorded for the partition;
    /// 0 when the partition has no samples
    pub historical_high: u64,
}

/// Errors from the windowed read engine
#[derive(Error, Debug)]
pub enum QueryError {
    /// The sample log failed during a scan
    #[error("Failed to scan samples for '{partition}': {source}")]
    Scan {
        partition: String,
        source: StoreError,
    },

    /// The scan kept returning continuation tokens past the page bound
    #[error("Sample scan for '{partition}' exceeded {limit} pages")]
    RunawayPagination { partition: String, limit: usize },
}

/// Windowed read engine; stateless apart from its store handle
pub struct WindowQuery {
    samples: Arc<dyn SampleStore>,
}

impl WindowQuery {
    pub fn new(samples: Arc<dyn SampleStore>) -> Self {
        Self { samples }
    }

    /// Read the trailing window and the all-time high for one partition
    pub async fn query(
        &self,
        partition_key: &str,
        window_seconds: u64,
    ) -> Result<WindowResult, QueryError> {
        let now = Utc::now().timestamp();
        let since = now.saturating_sub_unsigned(window_seconds);

        let points = self.collect_window(partition_key, since).await?;
        let historical_high = self.scan_high(partition_key).await?;

        tracing::debug!(
            partition = %partition_key,
            window_seconds,
            num_points = points.len(),
            historical_high,
            "Window query complete"
        );

        Ok(WindowResult {
            points,
            historical_high,
        })
    }

    /// Ascending range scan for `timestamp >= since`, all pages concatenated
    async fn collect_window(
        &self,
        partition_key: &str,
        since: i64,
    ) -> Result<Vec<SamplePoint>, QueryError> {
        let mut points = Vec::new();
        let mut token = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .samples
                .scan_page(partition_key, since, token)
                .await
                .map_err(|source| QueryError::Scan {
                    partition: partition_key.to_string(),
                    source,
                })?;

            points.extend(page.samples.iter().map(|s| SamplePoint {
                timestamp: s.timestamp,
                total_size: s.total_size,
            }));

            pages += 1;
            if pages > MAX_SCAN_PAGES {
                return Err(QueryError::RunawayPagination {
                    partition: partition_key.to_string(),
                    limit: MAX_SCAN_PAGES,
                });
            }

            match page.next {
                Some(t) => token = Some(t),
                None => break,
            }
        }

        Ok(points)
    }

    /// Whole-partition scan keeping only the running max of `total_size`
    ///
    /// Lower bound 0 is the domain minimum for epoch-second sort keys.
    async fn scan_high(&self, partition_key: &str) -> Result<u64, QueryError> {
        let mut high = 0u64;
        let mut token = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .samples
                .scan_page(partition_key, 0, token)
                .await
                .map_err(|source| QueryError::Scan {
                    partition: partition_key.to_string(),
                    source,
                })?;

            for sample in &page.samples {
                high = high.max(sample.total_size);
            }

            pages += 1;
            if pages > MAX_SCAN_PAGES {
                return Err(QueryError::RunawayPagination {
                    partition: partition_key.to_string(),
                    limit: MAX_SCAN_PAGES,
                });
            }

            match page.next {
                Some(t) => token = Some(t),
                None => break,
            }
        }

        Ok(high)
    }
}
