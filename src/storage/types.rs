//! Core data types for the sample log
//!
//! This module defines the fundamental types used throughout the storage layer:
//! - `Sample`: one recorded observation of a container's aggregate size
//! - `PageToken`: opaque continuation token for paginated range scans
//! - `SamplePage`: one page of an ascending range scan

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One recorded observation of a container's aggregate state
///
/// A sample is written exactly once by the recorder and never mutated.
/// `total_size` and `object_count` describe the entire container at the
/// moment of recomputation, not a delta, so duplicate notifications produce
/// duplicate (and equally valid) aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sample {
    /// Identity of the monitored container; partition key in the sample log
    pub partition_key: String,
    /// Unix timestamp in seconds; sort key within a partition.
    /// Not unique: two notifications in the same second produce two samples
    /// with equal timestamps, ordered by insertion.
    pub timestamp: i64,
    /// Sum of all current object byte sizes at recomputation time
    pub total_size: u64,
    /// Count of current objects at recomputation time
    pub object_count: u64,
    /// Free-text tag of the triggering event; informational only
    pub event_label: String,
    /// RFC 3339 rendering of the observation instant, for display
    pub recorded_at: String,
}

impl Sample {
    /// Create a sample stamped with the current wall-clock second
    pub fn new(
        partition_key: impl Into<String>,
        event_label: impl Into<String>,
        total_size: u64,
        object_count: u64,
    ) -> Self {
        Self::with_timestamp(
            partition_key,
            event_label,
            total_size,
            object_count,
            Utc::now().timestamp(),
        )
    }

    /// Create a sample with an explicit timestamp (seconds since epoch)
    pub fn with_timestamp(
        partition_key: impl Into<String>,
        event_label: impl Into<String>,
        total_size: u64,
        object_count: u64,
        timestamp: i64,
    ) -> Self {
        Self {
            partition_key: partition_key.into(),
            timestamp,
            total_size,
            object_count,
            event_label: event_label.into(),
            recorded_at: format_recorded_at(timestamp),
        }
    }
}

/// Render an epoch-second timestamp as RFC 3339 for the `recorded_at` field
fn format_recorded_at(timestamp: i64) -> String {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

/// Opaque continuation token for paginated range scans
///
/// Keyset-based: identifies the last row already returned by
/// `(timestamp, insertion sequence)`, so concurrently appended rows can
/// never shift page boundaries the way an offset would.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageToken {
    pub(crate) timestamp: i64,
    pub(crate) seq: i64,
}

/// One page of an ascending range scan over a partition
#[derive(Debug, Clone)]
pub struct SamplePage {
    /// Samples in ascending `(timestamp, insertion order)`
    pub samples: Vec<Sample>,
    /// Continuation token; `None` when the scan is exhausted
    pub next: Option<PageToken>,
}

impl SamplePage {
    /// An empty, exhausted page
    pub fn empty() -> Self {
        Self {
            samples: Vec::new(),
            next: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_creation() {
        let sample =
            Sample::with_timestamp("metrics-bucket", "ObjectCreated:Put", 18, 1, 1_700_000_000);

        assert_eq!(sample.partition_key, "metrics-bucket");
        assert_eq!(sample.total_size, 18);
        assert_eq!(sample.object_count, 1);
        assert_eq!(sample.event_label, "ObjectCreated:Put");
        assert!(sample.recorded_at.starts_with("2023-11-14T"));
    }

    #[test]
    fn test_sample_serialization() {
        let sample = Sample::with_timestamp("b", "ObjectRemoved:Delete", 0, 0, 1_700_000_000);
        let json = serde_json::to_string(&sample).unwrap();
        let restored: Sample = serde_json::from_str(&json).unwrap();

        assert_eq!(sample, restored);
    }

    #[test]
    fn test_new_uses_current_second() {
        let before = Utc::now().timestamp();
        let sample = Sample::new("b", "ObjectCreated:Put", 5, 1);
        let after = Utc::now().timestamp();

        assert!(sample.timestamp >= before && sample.timestamp <= after);
    }
}
