//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

/// Query parameters accepted by GET /api/v1/plot
///
/// Both are optional here; resolution against configured defaults happens
/// in the route before any component logic runs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlotParams {
    /// Container to chart; falls back to the configured default
    pub bucket: Option<String>,
    /// Window spec: plain seconds or `Ns`/`Nm`/`Nh`; falls back to the
    /// configured default
    pub window: Option<String>,
}

/// Response for GET /api/v1/plot
///
/// The rendered image is a side effect (written to the artifact key); only
/// its location and the query summary come back inline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotResponse {
    pub bucket: String,
    pub s3_key: String,
    pub window_seconds: u64,
    pub num_points: usize,
    pub historical_high: u64,
}

/// One notification record in POST /api/v1/notify
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyRecord {
    /// Container the mutation happened in
    pub bucket: String,
    /// Event type tag (e.g. "ObjectCreated:Put")
    pub event: String,
}

/// Request body for POST /api/v1/notify
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyRequest {
    pub records: Vec<NotifyRecord>,
}

/// Per-record failure in a notify batch
#[derive(Debug, Clone, Serialize)]
pub struct NotifyError {
    pub index: usize,
    pub error: String,
}

/// Response for POST /api/v1/notify
#[derive(Debug, Clone, Serialize)]
pub struct NotifyResponse {
    pub status: String,
    pub recorded: usize,
    pub rejected: usize,
    pub errors: Vec<NotifyError>,
}

/// Response for GET /health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub samples: String,
    pub objects: String,
    pub uptime_seconds: u64,
    pub version: String,
}
