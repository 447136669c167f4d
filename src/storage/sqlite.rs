//! SQLite-backed sample log
//!
//! One table, one covering index, keyset pagination. The `id` column is the
//! insertion sequence; the scan order `(ts, id)` gives ascending timestamps
//! with insertion-order tie-breaking, and the continuation token carries the
//! last `(ts, id)` pair so concurrent appends never shift page boundaries.

use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

use crate::storage::{
    PageToken, Sample, SamplePage, SampleStore, StoreError, StoreResult, DEFAULT_SAMPLE_PAGE_SIZE,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS samples (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    partition_key TEXT    NOT NULL,
    ts            INTEGER NOT NULL,
    total_size    INTEGER NOT NULL,
    object_count  INTEGER NOT NULL,
    event_label   TEXT    NOT NULL,
    recorded_at   TEXT    NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_samples_partition_ts
    ON samples (partition_key, ts, id);
";

/// Durable sample log backed by a single SQLite database file
pub struct SqliteSampleStore {
    conn: Mutex<Connection>,
    page_size: usize,
}

impl SqliteSampleStore {
    /// Open (or create) the database at `path` and ensure the schema exists
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn, DEFAULT_SAMPLE_PAGE_SIZE)
    }

    /// Open an in-memory database (tests)
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, DEFAULT_SAMPLE_PAGE_SIZE)
    }

    /// Override the scan page size; tests use small sizes to force
    /// multi-page reads
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn with_connection(conn: Connection, page_size: usize) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            page_size,
        })
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| StoreError::Lock(e.to_string()))
    }
}

#[async_trait]
impl SampleStore for SqliteSampleStore {
    async fn append(&self, sample: Sample) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO samples (partition_key, ts, total_size, object_count, event_label, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                sample.partition_key,
                sample.timestamp,
                sample.total_size as i64,
                sample.object_count as i64,
                sample.event_label,
                sample.recorded_at,
            ],
        )?;
        Ok(())
    }

    async fn scan_page(
        &self,
        partition: &str,
        since: i64,
        token: Option<PageToken>,
    ) -> StoreResult<SamplePage> {
        let conn = self.lock()?;

        // Keyset condition: rows strictly after the token in (ts, id) order.
        let (after_ts, after_seq) = match token {
            Some(t) => (t.timestamp, t.seq),
            None => (i64::MIN, i64::MIN),
        };

        let mut stmt = conn.prepare_cached(
            "SELECT id, partition_key, ts, total_size, object_count, event_label, recorded_at
             FROM samples
             WHERE partition_key = ?1
               AND ts >= ?2
               AND (ts > ?3 OR (ts = ?3 AND id > ?4))
             ORDER BY ts ASC, id ASC
             LIMIT ?5",
        )?;

        let rows = stmt.query_map(
            params![partition, since, after_ts, after_seq, self.page_size as i64],
            |row| {
                let seq: i64 = row.get(0)?;
                let total_size: i64 = row.get(3)?;
                let object_count: i64 = row.get(4)?;
                Ok((
                    seq,
                    Sample {
                        partition_key: row.get(1)?,
                        timestamp: row.get(2)?,
                        total_size: total_size as u64,
                        object_count: object_count as u64,
                        event_label: row.get(5)?,
                        recorded_at: row.get(6)?,
                    },
                ))
            },
        )?;

        let mut samples = Vec::new();
        let mut last = None;
        for row in rows {
            let (seq, sample) = row?;
            last = Some(PageToken {
                timestamp: sample.timestamp,
                seq,
            });
            samples.push(sample);
        }

        let next = if samples.len() == self.page_size {
            last
        } else {
            None
        };

        Ok(SamplePage { samples, next })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn scan_all(store: &SqliteSampleStore, partition: &str, since: i64) -> Vec<Sample> {
        let mut out = Vec::new();
        let mut token = None;
        loop {
            let page = store.scan_page(partition, since, token).await.unwrap();
            out.extend(page.samples);
            match page.next {
                Some(t) => token = Some(t),
                None => break,
            }
        }
        out
    }

    #[tokio::test]
    async fn test_round_trip() {
        let store = SqliteSampleStore::open_in_memory().unwrap();
        let sample = Sample::with_timestamp("b", "ObjectCreated:Put", 18, 1, 1_700_000_000);
        store.append(sample.clone()).await.unwrap();

        let all = scan_all(&store, "b", 0).await;
        assert_eq!(all, vec![sample]);
    }

    #[tokio::test]
    async fn test_open_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("samples.db");
        let store = SqliteSampleStore::open(&path).unwrap();

        store
            .append(Sample::with_timestamp("b", "put", 1, 1, 10))
            .await
            .unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_multi_page_scan_matches_single_page() {
        let paged = SqliteSampleStore::open_in_memory().unwrap().with_page_size(3);
        let single = SqliteSampleStore::open_in_memory().unwrap();

        for ts in 0..10 {
            let s = Sample::with_timestamp("b", "put", (ts * 2) as u64, 1, ts);
            paged.append(s.clone()).await.unwrap();
            single.append(s).await.unwrap();
        }

        assert_eq!(scan_all(&paged, "b", 0).await, scan_all(&single, "b", 0).await);
        assert_eq!(scan_all(&paged, "b", 5).await, scan_all(&single, "b", 5).await);
    }

    #[tokio::test]
    async fn test_since_filters_lower_bound() {
        let store = SqliteSampleStore::open_in_memory().unwrap();
        for ts in [100, 200, 300] {
            store
                .append(Sample::with_timestamp("b", "put", 1, 1, ts))
                .await
                .unwrap();
        }

        let recent = scan_all(&store, "b", 200).await;
        assert_eq!(recent.len(), 2);
        assert!(recent.iter().all(|s| s.timestamp >= 200));
    }

    #[tokio::test]
    async fn test_equal_timestamps_keep_insertion_order() {
        let store = SqliteSampleStore::open_in_memory().unwrap().with_page_size(1);
        store
            .append(Sample::with_timestamp("b", "put", 1, 1, 500))
            .await
            .unwrap();
        store
            .append(Sample::with_timestamp("b", "put", 2, 1, 500))
            .await
            .unwrap();

        let all = scan_all(&store, "b", 0).await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].total_size, 1);
        assert_eq!(all[1].total_size, 2);
    }
}
