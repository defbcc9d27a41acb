//! # Storage Layer
//!
//! Keyed object store with pluggable durable backends.
//!
//! ## Backends
//!
//! | Backend | Format | Default location |
//! |---------|--------|------------------|
//! | `file` | One JSON document keyed by `Class.id` | `./file.json` |
//! | `db` | SQLite `objects` table | `./hbnb.db` |
//! | `memory` | Nothing durable | - |
//!
//! ## Contract
//!
//! - [`Storage::all`] returns the live mapping, unfiltered
//! - Mutations ([`Storage::new_object`], [`Storage::delete`]) are visible
//!   to `all()` at once but reach disk only through [`Storage::save`]
//! - [`Storage::reload`] replaces the mapping with the backend's contents
//!
//! ## Concurrency Safety
//!
//! - [`FileBackend`] takes a shared lock to read and an exclusive lock to
//!   write (`fs2`); writes are atomic (temp file + rename)
//! - [`DbBackend`] rewrites the table inside one transaction
//!
//! ## Key Types
//!
//! - [`Storage`] - Owned store handle
//! - [`Backend`] - Durable form of the object map
//! - [`Config`] - Backend selection and console settings

mod config;
mod engine;
mod json_file;
mod sqlite;

pub use config::{Config, ConfigError, ConsoleConfig, Overrides, StorageConfig, StorageKind};
pub use engine::{Backend, MemoryBackend, ObjectMap, Storage};
pub use json_file::FileBackend;
pub use sqlite::{DbBackend, DbError};
