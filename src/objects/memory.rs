//! In-memory object store
//!
//! Containers are created on first `put`; `remove_container` simulates
//! deletion of the container itself, which tests use to drive the
//! missing-container policy. Keys are held in a BTreeMap so listings come
//! out key-ordered without extra work.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use crate::objects::{
    ObjectEntry, ObjectPage, ObjectResult, ObjectStore, ObjectStoreError,
    DEFAULT_OBJECT_PAGE_SIZE,
};

/// In-memory object store with test staging helpers
pub struct MemoryObjectStore {
    containers: Mutex<HashMap<String, BTreeMap<String, Vec<u8>>>>,
    page_size: usize,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_OBJECT_PAGE_SIZE)
    }

    /// Create with a custom listing page size; tests use small sizes to
    /// force multi-page enumerations
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            containers: Mutex::new(HashMap::new()),
            page_size: page_size.max(1),
        }
    }

    /// Create an empty container
    pub fn create_container(&self, container: &str) {
        let mut containers = self.containers.lock().expect("object store lock");
        containers.entry(container.to_string()).or_default();
    }

    /// Stage an object (creates the container if needed)
    pub fn put(&self, container: &str, key: &str, body: impl Into<Vec<u8>>) {
        let mut containers = self.containers.lock().expect("object store lock");
        containers
            .entry(container.to_string())
            .or_default()
            .insert(key.to_string(), body.into());
    }

    /// Remove one object; missing keys are ignored
    pub fn delete(&self, container: &str, key: &str) {
        let mut containers = self.containers.lock().expect("object store lock");
        if let Some(objects) = containers.get_mut(container) {
            objects.remove(key);
        }
    }

    /// Drop the container itself, so subsequent listings report it absent
    pub fn remove_container(&self, container: &str) {
        let mut containers = self.containers.lock().expect("object store lock");
        containers.remove(container);
    }

    /// Read back a staged object (assertions in tests)
    pub fn get(&self, container: &str, key: &str) -> Option<Vec<u8>> {
        let containers = self.containers.lock().expect("object store lock");
        containers.get(container).and_then(|o| o.get(key)).cloned()
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list_page(
        &self,
        container: &str,
        token: Option<String>,
    ) -> ObjectResult<ObjectPage> {
        let containers = self
            .containers
            .lock()
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        let objects = containers
            .get(container)
            .ok_or_else(|| ObjectStoreError::ContainerNotFound(container.to_string()))?;

        let page: Vec<ObjectEntry> = objects
            .iter()
            .filter(|(key, _)| match &token {
                Some(after) => key.as_str() > after.as_str(),
                None => true,
            })
            .take(self.page_size)
            .map(|(key, body)| ObjectEntry {
                key: key.clone(),
                size: body.len() as u64,
            })
            .collect();

        let next = if page.len() == self.page_size {
            page.last().map(|entry| entry.key.clone())
        } else {
            None
        };

        Ok(ObjectPage {
            objects: page,
            next,
        })
    }

    async fn put_object(
        &self,
        container: &str,
        key: &str,
        body: Vec<u8>,
        _content_type: &str,
    ) -> ObjectResult<()> {
        let mut containers = self
            .containers
            .lock()
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        let objects = containers
            .get_mut(container)
            .ok_or_else(|| ObjectStoreError::ContainerNotFound(container.to_string()))?;

        objects.insert(key.to_string(), body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn list_all(store: &MemoryObjectStore, container: &str) -> ObjectResult<Vec<ObjectEntry>> {
        let mut out = Vec::new();
        let mut token = None;
        loop {
            let page = store.list_page(container, token).await?;
            out.extend(page.objects);
            match page.next {
                Some(t) => token = Some(t),
                None => break,
            }
        }
        Ok(out)
    }

    #[tokio::test]
    async fn test_listing_is_key_ordered() {
        let store = MemoryObjectStore::new();
        store.put("b", "zebra", "zzz");
        store.put("b", "apple", "aa");

        let all = list_all(&store, "b").await.unwrap();
        assert_eq!(all[0].key, "apple");
        assert_eq!(all[0].size, 2);
        assert_eq!(all[1].key, "zebra");
        assert_eq!(all[1].size, 3);
    }

    #[tokio::test]
    async fn test_multi_page_listing() {
        let store = MemoryObjectStore::with_page_size(2);
        for i in 0..5 {
            store.put("b", &format!("obj-{i}"), vec![0u8; i + 1]);
        }

        let first = store.list_page("b", None).await.unwrap();
        assert_eq!(first.objects.len(), 2);
        assert_eq!(first.next.as_deref(), Some("obj-1"));

        let all = list_all(&store, "b").await.unwrap();
        assert_eq!(all.len(), 5);
        let total: u64 = all.iter().map(|o| o.size).sum();
        assert_eq!(total, 1 + 2 + 3 + 4 + 5);
    }

    #[tokio::test]
    async fn test_missing_container_is_distinguishable() {
        let store = MemoryObjectStore::new();
        let err = store.list_page("missing", None).await.unwrap_err();
        assert!(matches!(err, ObjectStoreError::ContainerNotFound(_)));
    }

    #[tokio::test]
    async fn test_put_object_overwrites() {
        let store = MemoryObjectStore::new();
        store.create_container("b");
        store
            .put_object("b", "plot", b"old".to_vec(), "image/svg+xml")
            .await
            .unwrap();
        store
            .put_object("b", "plot", b"new".to_vec(), "image/svg+xml")
            .await
            .unwrap();

        assert_eq!(store.get("b", "plot"), Some(b"new".to_vec()));
    }

    #[tokio::test]
    async fn test_remove_container() {
        let store = MemoryObjectStore::new();
        store.put("b", "a.txt", "x");
        store.remove_container("b");

        let err = store.list_page("b", None).await.unwrap_err();
        assert!(matches!(err, ObjectStoreError::ContainerNotFound(_)));
    }
}
