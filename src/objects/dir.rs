//! Filesystem-backed object store
//!
//! One directory per container under a configured root, one file per
//! object; the byte size comes from file metadata. This is the backing
//! store for local operation: the CLI mutates files, the recorder
//! enumerates them, the chart artifact lands next to them.
//!
//! Keys map to file names directly, so nested keys are not supported here;
//! flat keyspaces are all the tracked containers need.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::objects::{
    ObjectEntry, ObjectPage, ObjectResult, ObjectStore, ObjectStoreError,
    DEFAULT_OBJECT_PAGE_SIZE,
};

/// Object store rooted at a local directory
pub struct DirObjectStore {
    root: PathBuf,
    page_size: usize,
}

impl DirObjectStore {
    /// Create the store, ensuring the root directory exists
    pub fn new(root: impl Into<PathBuf>) -> ObjectResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            page_size: DEFAULT_OBJECT_PAGE_SIZE,
        })
    }

    /// Override the listing page size; tests use small sizes to force
    /// multi-page enumerations
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn container_path(&self, container: &str) -> PathBuf {
        self.root.join(container)
    }

    /// Read the container's directory, sorted by file name
    fn read_entries(&self, dir: &Path, container: &str) -> ObjectResult<Vec<ObjectEntry>> {
        let read_dir = match std::fs::read_dir(dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ObjectStoreError::ContainerNotFound(container.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            let key = entry.file_name().to_string_lossy().to_string();
            entries.push(ObjectEntry {
                key,
                size: metadata.len(),
            });
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }
}

#[async_trait]
impl ObjectStore for DirObjectStore {
    async fn list_page(
        &self,
        container: &str,
        token: Option<String>,
    ) -> ObjectResult<ObjectPage> {
        let dir = self.container_path(container);
        let entries = self.read_entries(&dir, container)?;

        let page: Vec<ObjectEntry> = entries
            .into_iter()
            .filter(|entry| match &token {
                Some(after) => entry.key.as_str() > after.as_str(),
                None => true,
            })
            .take(self.page_size)
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
        let dir = self.container_path(container);
        if !dir.is_dir() {
            return Err(ObjectStoreError::ContainerNotFound(container.to_string()));
        }
        std::fs::write(dir.join(key), body)?;
        Ok(())
    }
}
