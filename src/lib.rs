//! # Bucketscope
//!
//! Object-store size tracking - records a container's aggregate size on
//! every mutation event and serves a windowed visualization of that
//! history.
//!
//! ## Features
//!
//! - **Idempotent recording**: every notification triggers a full
//!   recomputation of the container's size, so duplicate or re-delivered
//!   events never skew the history
//! - **Append-only sample log**: samples keyed by (partition, timestamp),
//!   range-queryable with keyset pagination
//! - **Windowed queries**: trailing-window point series plus the all-time
//!   size high, independent of the window
//! - **Chart artifacts**: deterministic SVG charts published back into the
//!   monitored container under a fixed key
//!
//! ## Modules
//!
//! - [`storage`]: the append-only sample log
//! - [`objects`]: object-store boundary (enumeration + artifact writes)
//! - [`recorder`]: recompute-on-mutation sample writer
//! - [`query`]: windowed read engine
//! - [`chart`]: pure SVG renderer
//! - [`artifact`]: chart artifact publisher
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bucketscope::objects::MemoryObjectStore;
//! use bucketscope::query::WindowQuery;
//! use bucketscope::recorder::Recorder;
//! use bucketscope::storage::{MemorySampleStore, SampleStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let objects = Arc::new(MemoryObjectStore::new());
//!     let samples: Arc<dyn SampleStore> = Arc::new(MemorySampleStore::new());
//!
//!     objects.put("my-bucket", "hello.txt", "hello world");
//!
//!     // Record a sample in response to a mutation event
//!     let recorder = Recorder::new(objects, Arc::clone(&samples));
//!     let sample = recorder.record("my-bucket", "ObjectCreated:Put").await?;
//!     println!("{} bytes across {} objects", sample.total_size, sample.object_count);
//!
//!     // Chart the last minute
//!     let query = WindowQuery::new(samples);
//!     let result = query.query("my-bucket", 60).await?;
//!     let svg = bucketscope::chart::render(&result.points, result.historical_high);
//!     std::fs::write("plot.svg", svg)?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod artifact;
pub mod chart;
pub mod config;
pub mod objects;
pub mod query;
pub mod recorder;
pub mod storage;

// Re-export top-level types for convenience
pub use storage::{
    MemorySampleStore, PageToken, Sample, SamplePage, SampleStore, SqliteSampleStore, StoreError,
    StoreResult,
};

pub use objects::{
    DirObjectStore, MemoryObjectStore, ObjectEntry, ObjectPage, ObjectResult, ObjectStore,
    ObjectStoreError,
};

pub use recorder::{MutationNotice, RecordError, Recorder};

pub use query::{parse_window, QueryError, SamplePoint, WindowQuery, WindowResult};

pub use artifact::{ArtifactPublisher, PublishError, CHART_CONTENT_TYPE, CHART_KEY};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{Config, ConfigError, LoggingConfig};
