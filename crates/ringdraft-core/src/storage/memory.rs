//! In-memory course storage.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::CourseDocument;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

/// Keeps courses in a map. Used for tests and scratch sessions.
#[derive(Default)]
pub struct MemoryStorage {
    courses: RwLock<BTreeMap<String, CourseDocument>>,
}

fn lock_error<T>(e: PoisonError<T>) -> StorageError {
    StorageError::Other(format!("Lock error: {e}"))
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.courses.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, document: &CourseDocument) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let mut document = document.clone();
        Box::pin(async move {
            // In-progress draws are never persisted.
            document.active_wall = None;
            document.active_measurement = None;
            document.active_tunnel = None;
            self.courses.write().map_err(lock_error)?.insert(id, document);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<CourseDocument>> {
        let id = id.to_string();
        Box::pin(async move {
            let courses = self.courses.read().map_err(lock_error)?;
            courses.get(&id).cloned().ok_or(StorageError::NotFound(id))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            self.courses.write().map_err(lock_error)?.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let courses = self.courses.read().map_err(lock_error)?;
            Ok(courses.keys().cloned().collect())
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move { Ok(self.courses.read().map_err(lock_error)?.contains_key(&id)) })
    }
}
