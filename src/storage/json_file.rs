//! JSON file backend
//!
//! All objects live in one JSON document keyed by object key:
//! `{"User.1234": {"__class__": "User", "id": "1234", ...}}`.
//! Uses file locking for concurrent access safety.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use serde_json::{Map, Value};

use super::engine::{Backend, ObjectMap};
use crate::domain::{Instance, ObjectKey};

/// Store for objects in a single JSON file
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Creates a new file backend at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Backend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    fn load(&self) -> Result<Vec<Instance>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open object store: {}", self.path.display()))?;

        // Acquire shared lock for reading
        file.lock_shared()
            .context("Failed to acquire read lock on object store")?;

        let document: Map<String, Value> = serde_json::from_reader(BufReader::new(&file))
            .with_context(|| format!("Failed to parse object store: {}", self.path.display()))?;

        let mut objects = Vec::with_capacity(document.len());
        for (raw_key, value) in document {
            let key: ObjectKey = raw_key
                .parse()
                .with_context(|| format!("Invalid key in object store: {}", raw_key))?;

            let dict = value
                .as_object()
                .with_context(|| format!("Object {} is not a JSON object", key))?;

            let instance = Instance::from_dict(dict)
                .with_context(|| format!("Failed to read object {}", key))?;

            if instance.key() != key {
                anyhow::bail!("Object {} is stored under key {}", instance.key(), key);
            }
            objects.push(instance);
        }

        // Lock is released when file is dropped
        Ok(objects)
    }

    fn persist(&mut self, objects: &ObjectMap) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut document = Map::new();
        for (key, instance) in objects {
            document.insert(key.to_string(), Value::Object(instance.to_dict()));
        }

        // Write to temp file first
        let temp_path = self.temp_path();

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            // Acquire exclusive lock
            file.lock_exclusive()
                .context("Failed to acquire write lock on object store")?;

            let mut writer = BufWriter::new(&file);
            serde_json::to_writer(&mut writer, &document)
                .context("Failed to serialize objects")?;
            writer.flush().context("Failed to flush object store")?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AttrValue;
    use tempfile::TempDir;

    fn make_map(instances: Vec<Instance>) -> ObjectMap {
        instances.into_iter().map(|i| (i.key(), i)).collect()
    }

    #[test]
    fn read_missing_store() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::new(dir.path().join("file.json"));

        assert!(backend.load().unwrap().is_empty());
    }

    #[test]
    fn write_and_read_objects() {
        let dir = TempDir::new().unwrap();
        let mut backend = FileBackend::new(dir.path().join("file.json"));

        let mut user = Instance::new("User");
        user.set("first_name", AttrValue::from("Betty")).unwrap();
        user.set("age", AttrValue::Int(30)).unwrap();
        let city = Instance::new("City");

        backend
            .persist(&make_map(vec![user.clone(), city.clone()]))
            .unwrap();

        let loaded = make_map(backend.load().unwrap());
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get(&user.key()), Some(&user));
        assert_eq!(loaded.get(&city.key()), Some(&city));
    }

    #[test]
    fn file_layout_uses_object_keys() {
        let dir = TempDir::new().unwrap();
        let mut backend = FileBackend::new(dir.path().join("file.json"));

        let user = Instance::new("User");
        backend.persist(&make_map(vec![user.clone()])).unwrap();

        let raw: Value =
            serde_json::from_str(&fs::read_to_string(backend.path()).unwrap()).unwrap();
        let entry = &raw[user.key().to_string()];
        assert_eq!(entry["__class__"], "User");
        assert_eq!(entry["id"], user.id());
    }

    #[test]
    fn persist_replaces_previous_contents() {
        let dir = TempDir::new().unwrap();
        let mut backend = FileBackend::new(dir.path().join("file.json"));

        backend
            .persist(&make_map(vec![Instance::new("User"), Instance::new("User")]))
            .unwrap();
        backend.persist(&ObjectMap::new()).unwrap();

        assert!(backend.load().unwrap().is_empty());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let mut backend = FileBackend::new(dir.path().join("nested").join("dir").join("file.json"));

        backend.persist(&ObjectMap::new()).unwrap();

        assert!(backend.path().exists());
    }

    #[test]
    fn atomic_write() {
        let dir = TempDir::new().unwrap();
        let mut backend = FileBackend::new(dir.path().join("file.json"));

        backend
            .persist(&make_map(vec![Instance::new("State")]))
            .unwrap();

        // Temp file should not exist after write
        assert!(!dir.path().join("file.json.tmp").exists());
    }

    #[test]
    fn corrupt_store_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("file.json");
        fs::write(&path, "{not json").unwrap();

        let backend = FileBackend::new(&path);
        let err = backend.load().unwrap_err();
        assert!(err.to_string().contains("Failed to parse object store"));
    }

    #[test]
    fn mismatched_key_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("file.json");

        let user = Instance::new("User");
        let mut document = Map::new();
        document.insert("User.other".to_string(), Value::Object(user.to_dict()));
        fs::write(&path, serde_json::to_string(&document).unwrap()).unwrap();

        assert!(FileBackend::new(&path).load().is_err());
    }
}
