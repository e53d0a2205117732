//! Course files on the local filesystem.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::CourseDocument;
use crate::persist;
use std::fs;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";

/// Stores each course as `<id>.json` in one directory.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Open storage rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::Io(format!("Failed to create {}: {e}", base_path.display()))
        })?;
        Ok(Self { base_path })
    }

    /// Storage under the platform data directory, `ringdraft/courses`.
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("ringdraft").join("courses"))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn course_path(&self, id: &str) -> PathBuf {
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{safe_id}.{EXTENSION}"))
    }
}

impl Storage for FileStorage {
    fn save(&self, id: &str, document: &CourseDocument) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.course_path(id);
        let json = persist::to_json(document);
        Box::pin(async move {
            let json = json.map_err(|e| StorageError::Serialization(e.to_string()))?;
            fs::write(&path, json).map_err(|e| {
                StorageError::Io(format!("Failed to write {}: {e}", path.display()))
            })?;
            log::info!("Saved course to {}", path.display());
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<CourseDocument>> {
        let path = self.course_path(id);
        let id = id.to_string();
        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(id));
            }
            let json = fs::read_to_string(&path).map_err(|e| {
                StorageError::Io(format!("Failed to read {}: {e}", path.display()))
            })?;
            persist::from_json(&json).map_err(|e| {
                StorageError::Serialization(format!("Failed to parse {}: {e}", path.display()))
            })
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.course_path(id);
        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {e}", path.display()))
                })?;
                log::info!("Deleted {}", path.display());
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();
        Box::pin(async move {
            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {e}")))?;
            let mut ids: Vec<String> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == EXTENSION))
                .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
                .collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.course_path(id);
        Box::pin(async move { Ok(path.exists()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Bale, Entity};
    use crate::storage::block_on;
    use kurbo::Point;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let mut doc = CourseDocument::new();
        doc.name = "Open Round 2".to_string();
        doc.insert(Entity::Bale(Bale::new(Point::new(3.0, 4.5), 2)));

        block_on(storage.save("round-2", &doc)).unwrap();
        let loaded = block_on(storage.load("round-2")).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_load_legacy_file() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let legacy =
            r#"{"deadZones": [{"id": "67e55044-10b1-426f-9247-bb680e5fe0c8", "x": 2, "y": 3}]}"#;
        fs::write(dir.path().join("old.json"), legacy).unwrap();

        let loaded = block_on(storage.load("old")).unwrap();
        assert_eq!(loaded.zones.len(), 1);
        assert_eq!(loaded.name, "Untitled");
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        fs::write(dir.path().join("bad.json"), "not json").unwrap();

        let result = block_on(storage.load("bad"));
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[test]
    fn test_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_list_only_json() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let doc = CourseDocument::new();
        block_on(storage.save("b", &doc)).unwrap();
        block_on(storage.save("a", &doc)).unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        assert_eq!(block_on(storage.list()).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        block_on(storage.save("course", &CourseDocument::new())).unwrap();
        block_on(storage.delete("course")).unwrap();
        assert!(!block_on(storage.exists("course")).unwrap());
    }

    #[test]
    fn test_sanitizes_id() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let doc = CourseDocument::new();
        block_on(storage.save("trial/day:1", &doc)).unwrap();
        assert!(dir.path().join("trial_day_1.json").exists());
        assert_eq!(block_on(storage.load("trial/day:1")).unwrap().id, doc.id);
    }
}
