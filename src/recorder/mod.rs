//! Recorder - recompute-on-mutation sample writer
//!
//! On every mutation notification the recorder re-derives the container's
//! aggregate metrics by fully enumerating its current contents, then appends
//! one timestamped [`Sample`] to the sample log. Recomputing the whole
//! aggregate (instead of applying a delta) is what makes the recorder safe
//! under at-least-once delivery: a duplicate notification just observes the
//! same state again and records the same numbers under a new timestamp.
//!
//! Concurrent invocations for the same container need no locking. Each one
//! produces an independently correct sample; their relative timestamps may
//! not reflect true event order when enumerations interleave, which is a
//! documented property of wall-clock sort keys, not corruption.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::objects::{ObjectStore, ObjectStoreError};
use crate::storage::{Sample, SampleStore, StoreError};

/// Upper bound on listing pages per enumeration. A container large enough
/// to hit this is a sign of a misbehaving backend returning endless pages.
const MAX_LIST_PAGES: usize = 100_000;

/// One mutation notification record, as delivered by the upstream
/// notification mechanism
///
/// Delivery order is preserved by callers but is not assumed to match
/// real-world event order, and records may arrive more than once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MutationNotice {
    /// Container the mutation happened in
    pub partition_key: String,
    /// Event type tag (create/update/delete), recorded verbatim
    pub event_label: String,
}

impl MutationNotice {
    pub fn new(partition_key: impl Into<String>, event_label: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            event_label: event_label.into(),
        }
    }
}

/// Errors from a single recording attempt
///
/// The recorder never retries internally; redelivery of the notification is
/// the caller's retry mechanism.
#[derive(Error, Debug)]
pub enum RecordError {
    /// Enumerating the container failed for a reason other than the
    /// container being absent
    #[error("Failed to enumerate container '{partition}': {source}")]
    Enumerate {
        partition: String,
        source: ObjectStoreError,
    },

    /// The listing kept returning continuation tokens past the page bound
    #[error("Enumeration of container '{partition}' exceeded {limit} pages")]
    RunawayPagination { partition: String, limit: usize },

    /// The sample log rejected the append; no sample was written
    #[error("Failed to append sample for '{partition}': {source}")]
    Append {
        partition: String,
        source: StoreError,
    },
}

/// Aggregate metrics from one full enumeration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ContainerMetrics {
    total_size: u64,
    object_count: u64,
}

/// Recompute-on-mutation sample writer
pub struct Recorder {
    objects: Arc<dyn ObjectStore>,
    samples: Arc<dyn SampleStore>,
}

impl Recorder {
    pub fn new(objects: Arc<dyn ObjectStore>, samples: Arc<dyn SampleStore>) -> Self {
        Self { objects, samples }
    }

    /// Process one notification record
    pub async fn record_notice(&self, notice: &MutationNotice) -> Result<Sample, RecordError> {
        self.record(&notice.partition_key, &notice.event_label).await
    }

    /// Process one notification: enumerate, recompute, append one sample
    ///
    /// A missing container is the empty-partition case and yields a valid
    /// zero-metrics sample. Any other enumeration failure, and any append
    /// failure, propagates without writing.
    pub async fn record(
        &self,
        partition_key: &str,
        event_label: &str,
    ) -> Result<Sample, RecordError> {
        let metrics = self.enumerate(partition_key).await?;

        // Wall-clock second taken after enumeration completes; this is the
        // partition sort key. Ties with concurrent recordings are resolved
        // by insertion order in the store.
        let timestamp = Utc::now().timestamp();
        let sample = Sample::with_timestamp(
            partition_key,
            event_label,
            metrics.total_size,
            metrics.object_count,
            timestamp,
        );

        self.samples
            .append(sample.clone())
            .await
            .map_err(|source| RecordError::Append {
                partition: partition_key.to_string(),
                source,
            })?;

        tracing::info!(
            partition = %partition_key,
            event = %event_label,
            total_size = metrics.total_size,
            object_count = metrics.object_count,
            "Recorded container metrics"
        );

        Ok(sample)
    }

    /// Stream the container listing page by page, accumulating running sums
    ///
    /// Memory stays O(page size); only the two counters survive each page.
    async fn enumerate(&self, partition_key: &str) -> Result<ContainerMetrics, RecordError> {
        let mut metrics = ContainerMetrics::default();
        let mut token = None;
        let mut pages = 0usize;

        loop {
            let page = match self.objects.list_page(partition_key, token).await {
                Ok(page) => page,
                Err(ObjectStoreError::ContainerNotFound(_)) => {
                    // Container gone (e.g. deleted between the event and this
                    // enumeration): record the observation as empty, not as a
                    // failure.
                    tracing::info!(
                        partition = %partition_key,
                        "Container absent; recording zero metrics"
                    );
                    return Ok(ContainerMetrics::default());
                }
                Err(source) => {
                    return Err(RecordError::Enumerate {
                        partition: partition_key.to_string(),
                        source,
                    });
                }
            };

            for object in &page.objects {
                metrics.total_size += object.size;
                metrics.object_count += 1;
            }

            pages += 1;
            if pages > MAX_LIST_PAGES {
                return Err(RecordError::RunawayPagination {
                    partition: partition_key.to_string(),
                    limit: MAX_LIST_PAGES,
                });
            }

            match page.next {
                Some(t) => token = Some(t),
                None => break,
            }
        }

        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::MemoryObjectStore;
    use crate::storage::MemorySampleStore;

    fn recorder_over(
        objects: Arc<MemoryObjectStore>,
    ) -> (Recorder, Arc<MemorySampleStore>) {
        let samples = Arc::new(MemorySampleStore::new());
        let recorder = Recorder::new(objects, Arc::clone(&samples) as Arc<dyn SampleStore>);
        (recorder, samples)
    }

    async fn all_samples(samples: &MemorySampleStore, partition: &str) -> Vec<Sample> {
        let mut out = Vec::new();
        let mut token = None;
        loop {
            let page = samples.scan_page(partition, 0, token).await.unwrap();
            out.extend(page.samples);
            match page.next {
                Some(t) => token = Some(t),
                None => break,
            }
        }
        out
    }

    #[tokio::test]
    async fn test_record_sums_sizes_and_counts() {
        let objects = Arc::new(MemoryObjectStore::new());
        objects.put("b", "one", vec![0u8; 10]);
        objects.put("b", "two", vec![0u8; 32]);
        let (recorder, _) = recorder_over(Arc::clone(&objects));

        let sample = recorder.record("b", "ObjectCreated:Put").await.unwrap();
        assert_eq!(sample.total_size, 42);
        assert_eq!(sample.object_count, 2);
        assert_eq!(sample.event_label, "ObjectCreated:Put");
    }

    #[tokio::test]
    async fn test_missing_container_records_zero_metrics() {
        let objects = Arc::new(MemoryObjectStore::new());
        let (recorder, samples) = recorder_over(Arc::clone(&objects));

        let sample = recorder.record("gone", "ObjectRemoved:Delete").await.unwrap();
        assert_eq!(sample.total_size, 0);
        assert_eq!(sample.object_count, 0);

        // It is an appended sample, not a skipped write
        assert_eq!(all_samples(&samples, "gone").await.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_container_records_zero_metrics() {
        let objects = Arc::new(MemoryObjectStore::new());
        objects.create_container("empty");
        let (recorder, _) = recorder_over(Arc::clone(&objects));

        let sample = recorder.record("empty", "ObjectRemoved:Delete").await.unwrap();
        assert_eq!(sample.total_size, 0);
        assert_eq!(sample.object_count, 0);
    }

    #[tokio::test]
    async fn test_duplicate_delivery_is_idempotent() {
        let objects = Arc::new(MemoryObjectStore::new());
        objects.put("b", "a.txt", vec![0u8; 18]);
        let (recorder, samples) = recorder_over(Arc::clone(&objects));

        // Same notification delivered twice against unchanged state
        let first = recorder.record("b", "ObjectCreated:Put").await.unwrap();
        let second = recorder.record("b", "ObjectCreated:Put").await.unwrap();

        assert_eq!(first.total_size, second.total_size);
        assert_eq!(first.object_count, second.object_count);

        let recorded = all_samples(&samples, "b").await;
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].total_size, recorded[1].total_size);
    }

    #[tokio::test]
    async fn test_enumeration_spanning_pages_matches_single_page() {
        let paged = Arc::new(MemoryObjectStore::with_page_size(2));
        let single = Arc::new(MemoryObjectStore::new());
        for i in 0..7 {
            let body = vec![0u8; (i + 1) * 3];
            paged.put("b", &format!("k{i}"), body.clone());
            single.put("b", &format!("k{i}"), body);
        }

        let (paged_recorder, _) = recorder_over(paged);
        let (single_recorder, _) = recorder_over(single);

        let a = paged_recorder.record("b", "put").await.unwrap();
        let b = single_recorder.record("b", "put").await.unwrap();

        assert_eq!(a.total_size, b.total_size);
        assert_eq!(a.object_count, b.object_count);
        assert_eq!(a.object_count, 7);
    }

    #[tokio::test]
    async fn test_mutation_scenario_end_to_end() {
        let objects = Arc::new(MemoryObjectStore::new());
        let (recorder, samples) = recorder_over(Arc::clone(&objects));

        // create "a" (18 bytes)
        objects.put("b", "a", vec![0u8; 18]);
        recorder.record("b", "ObjectCreated:Put").await.unwrap();

        // overwrite "a" (27 bytes)
        objects.put("b", "a", vec![0u8; 27]);
        recorder.record("b", "ObjectCreated:Put").await.unwrap();

        // delete "a"
        objects.delete("b", "a");
        recorder.record("b", "ObjectRemoved:Delete").await.unwrap();

        // create "b" (2 bytes)
        objects.put("b", "b", vec![0u8; 2]);
        recorder.record("b", "ObjectCreated:Put").await.unwrap();

        let recorded = all_samples(&samples, "b").await;
        let sizes: Vec<u64> = recorded.iter().map(|s| s.total_size).collect();
        let counts: Vec<u64> = recorded.iter().map(|s| s.object_count).collect();
        assert_eq!(sizes, vec![18, 27, 0, 2]);
        assert_eq!(counts, vec![1, 1, 0, 1]);
    }

    #[tokio::test]
    async fn test_notice_deserializes() {
        let notice: MutationNotice =
            serde_json::from_str(r#"{"partition_key": "b", "event_label": "ObjectCreated:Put"}"#)
                .unwrap();
        assert_eq!(notice, MutationNotice::new("b", "ObjectCreated:Put"));
    }
}
