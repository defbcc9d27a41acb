//! Keyed object store
//!
//! [`Storage`] owns the live key → instance map and a [`Backend`] that
//! knows how to load and persist it. Mutations are visible to `all()`
//! immediately; nothing reaches durable form until `save()`.

use std::collections::BTreeMap;

use anyhow::{Context, Result};

use crate::domain::{Instance, ObjectKey, Registry};

/// Live mapping from object key to instance
pub type ObjectMap = BTreeMap<ObjectKey, Instance>;

/// Durable form of the object map
pub trait Backend {
    /// Short backend name for diagnostics
    fn name(&self) -> &'static str;

    /// Reads every stored instance
    fn load(&self) -> Result<Vec<Instance>>;

    /// Replaces the durable contents with `objects`
    fn persist(&mut self, objects: &ObjectMap) -> Result<()>;
}

/// Backend that keeps nothing between runs
#[derive(Debug, Default)]
pub struct MemoryBackend;

impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn load(&self) -> Result<Vec<Instance>> {
        Ok(Vec::new())
    }

    fn persist(&mut self, _objects: &ObjectMap) -> Result<()> {
        Ok(())
    }
}

/// Storage handle owned by the command interpreter
pub struct Storage {
    objects: ObjectMap,
    backend: Box<dyn Backend>,
    registry: Registry,
}

impl Storage {
    /// Creates a storage handle and loads the backend's contents
    pub fn open(backend: Box<dyn Backend>, registry: Registry) -> Result<Self> {
        let mut storage = Self {
            objects: ObjectMap::new(),
            backend,
            registry,
        };
        storage.reload()?;
        Ok(storage)
    }

    /// Creates an empty storage that never persists
    pub fn in_memory(registry: Registry) -> Self {
        Self {
            objects: ObjectMap::new(),
            backend: Box::new(MemoryBackend),
            registry,
        }
    }

    /// Returns the backend name
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Returns the class registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the full live mapping
    pub fn all(&self) -> &ObjectMap {
        &self.objects
    }

    /// Iterates over instances whose key has the `{class_name}.` prefix
    pub fn all_of<'a>(&'a self, class_name: &'a str) -> impl Iterator<Item = &'a Instance> + 'a {
        self.objects
            .iter()
            .filter(move |(key, _)| key.has_class_prefix(class_name))
            .map(|(_, inst)| inst)
    }

    /// Counts keys with the `{class_name}.` prefix
    pub fn count(&self, class_name: &str) -> usize {
        self.all_of(class_name).count()
    }

    pub fn get(&self, key: &ObjectKey) -> Option<&Instance> {
        self.objects.get(key)
    }

    pub fn get_mut(&mut self, key: &ObjectKey) -> Option<&mut Instance> {
        self.objects.get_mut(key)
    }

    /// Adds an instance under its own key
    pub fn new_object(&mut self, instance: Instance) -> ObjectKey {
        let key = instance.key();
        self.objects.insert(key.clone(), instance);
        key
    }

    /// Removes an instance
    pub fn delete(&mut self, key: &ObjectKey) -> Option<Instance> {
        self.objects.remove(key)
    }

    /// Writes the live mapping through the backend
    pub fn save(&mut self) -> Result<()> {
        self.backend
            .persist(&self.objects)
            .with_context(|| format!("Failed to save {} storage", self.backend.name()))
    }

    /// Replaces the live mapping with the backend's contents
    pub fn reload(&mut self) -> Result<()> {
        let loaded = self
            .backend
            .load()
            .with_context(|| format!("Failed to load {} storage", self.backend.name()))?;

        let mut objects = ObjectMap::new();
        for instance in loaded {
            if !self.registry.contains(instance.class_name()) {
                anyhow::bail!(
                    "Stored object {} has unknown class '{}'",
                    instance.key(),
                    instance.class_name()
                );
            }
            objects.insert(instance.key(), instance);
        }

        self.objects = objects;
        Ok(())
    }
}
