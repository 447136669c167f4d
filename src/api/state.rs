//! Application State
//!
//! Shared state accessible by all API handlers. Both store handles are
//! constructed once at process start and injected here, never reached for
//! as ambient globals; tests substitute in-memory fakes through the same
//! constructor.

use crate::artifact::ArtifactPublisher;
use crate::objects::ObjectStore;
use crate::recorder::Recorder;
use crate::storage::SampleStore;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Sample log handle
    pub samples: Arc<dyn SampleStore>,
    /// Object-store handle (enumeration + artifact writes)
    pub objects: Arc<dyn ObjectStore>,
    /// Recompute-on-mutation recorder
    pub recorder: Arc<Recorder>,
    /// Chart artifact publisher
    pub publisher: Arc<ArtifactPublisher>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        samples: Arc<dyn SampleStore>,
        objects: Arc<dyn ObjectStore>,
        config: ApiConfig,
    ) -> Self {
        let recorder = Arc::new(Recorder::new(Arc::clone(&objects), Arc::clone(&samples)));
        let publisher = Arc::new(ArtifactPublisher::new(Arc::clone(&objects)));
        Self {
            samples,
            objects,
            recorder,
            publisher,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Container charted when the request names none
    pub default_bucket: Option<String>,
    /// Window used when the request names none, in seconds
    pub default_window_seconds: u64,
    /// Maximum records accepted per notify batch
    pub max_notify_batch: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8090,
            default_bucket: None,
            default_window_seconds: 10,
            max_notify_batch: 1_000,
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
