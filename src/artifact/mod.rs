//! Artifact publisher
//!
//! Writes the rendered chart back into the monitored container under one
//! well-known key, overwriting whatever was there. No versioning, no
//! internal retry; a failed publish leaves the previous artifact untouched
//! because the write either replaces the object or doesn't happen.

use std::sync::Arc;

use thiserror::Error;

use crate::objects::{ObjectStore, ObjectStoreError};

/// Fixed key the chart artifact is published under
pub const CHART_KEY: &str = "plot";

/// Content type of the published artifact
pub const CHART_CONTENT_TYPE: &str = "image/svg+xml";

/// Errors from publishing the chart artifact
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Failed to publish chart to '{container}/{key}': {source}")]
    Put {
        container: String,
        key: String,
        source: ObjectStoreError,
    },
}

/// Publishes rendered charts to the object store
pub struct ArtifactPublisher {
    objects: Arc<dyn ObjectStore>,
}

impl ArtifactPublisher {
    pub fn new(objects: Arc<dyn ObjectStore>) -> Self {
        Self { objects }
    }

    /// Write the image under [`CHART_KEY`] in `container`
    pub async fn publish(&self, container: &str, image: Vec<u8>) -> Result<(), PublishError> {
        let bytes = image.len();
        self.objects
            .put_object(container, CHART_KEY, image, CHART_CONTENT_TYPE)
            .await
            .map_err(|source| PublishError::Put {
                container: container.to_string(),
                key: CHART_KEY.to_string(),
                source,
            })?;

        tracing::info!(container = %container, key = CHART_KEY, bytes, "Published chart artifact");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::MemoryObjectStore;

    #[tokio::test]
    async fn test_publish_writes_fixed_key() {
        let objects = Arc::new(MemoryObjectStore::new());
        objects.create_container("b");
        let publisher = ArtifactPublisher::new(Arc::clone(&objects) as Arc<dyn ObjectStore>);

        publisher.publish("b", b"<svg/>".to_vec()).await.unwrap();
        assert_eq!(objects.get("b", CHART_KEY), Some(b"<svg/>".to_vec()));
    }

    #[tokio::test]
    async fn test_publish_overwrites_prior_artifact() {
        let objects = Arc::new(MemoryObjectStore::new());
        objects.create_container("b");
        let publisher = ArtifactPublisher::new(Arc::clone(&objects) as Arc<dyn ObjectStore>);

        publisher.publish("b", b"first".to_vec()).await.unwrap();
        publisher.publish("b", b"second".to_vec()).await.unwrap();
        assert_eq!(objects.get("b", CHART_KEY), Some(b"second".to_vec()));
    }

    #[tokio::test]
    async fn test_publish_failure_is_reported() {
        let objects = Arc::new(MemoryObjectStore::new());
        let publisher = ArtifactPublisher::new(objects as Arc<dyn ObjectStore>);

        let err = publisher.publish("missing", b"x".to_vec()).await.unwrap_err();
        assert!(err.to_string().contains("missing/plot"));
    }
}
