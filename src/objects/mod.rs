//! Object-store collaborator
//!
//! The monitored container lives in an external object store; this module
//! defines the boundary the core talks through and two implementations:
//!
//! - [`MemoryObjectStore`]: in-process, with mutation helpers for staging
//!   test scenarios
//! - [`DirObjectStore`]: filesystem-backed, one directory per container,
//!   one file per object
//!
//! Listing is ordered by key and paginates via a last-key continuation
//! token, the way object-store list APIs do. A missing container is a
//! distinguishable condition, not a generic failure; the recorder relies
//! on that to apply its empty-partition policy.

mod dir;
mod memory;

pub use dir::DirObjectStore;
pub use memory::MemoryObjectStore;

use async_trait::async_trait;
use thiserror::Error;

/// Default number of objects returned per listing page
pub const DEFAULT_OBJECT_PAGE_SIZE: usize = 1000;

/// One listed object: its key and byte size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub key: String,
    pub size: u64,
}

/// One page of a container listing, ordered by key
#[derive(Debug, Clone)]
pub struct ObjectPage {
    pub objects: Vec<ObjectEntry>,
    /// Last key of this page when more pages may follow; pass back to
    /// `list_page` to continue
    pub next: Option<String>,
}

/// Errors from the object-store boundary
#[derive(Error, Debug)]
pub enum ObjectStoreError {
    /// The container itself does not exist. Callers treat this as a policy
    /// condition, not a transient failure.
    #[error("Container not found: {0}")]
    ContainerNotFound(String),

    /// I/O failure talking to the backend
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other backend failure
    #[error("Object store error: {0}")]
    Backend(String),
}

/// Result type alias for object-store operations
pub type ObjectResult<T> = Result<T, ObjectStoreError>;

/// Boundary to the external object store
///
/// `list_page` returns objects in ascending key order; the continuation
/// token is the last key already returned (strictly-greater-than
/// semantics). `put_object` overwrites unconditionally.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List one page of the container's objects, starting after `token`
    async fn list_page(&self, container: &str, token: Option<String>)
        -> ObjectResult<ObjectPage>;

    /// Write an object, replacing any existing one under the same key
    async fn put_object(
        &self,
        container: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> ObjectResult<()>;
}
