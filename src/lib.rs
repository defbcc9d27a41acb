//! HBnB - A command interpreter over a keyed object store
//!
//! Model instances (users, places, reviews, ...) are created, inspected and
//! mutated through a small shell language and persisted to a JSON file or a
//! SQLite database.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{AttrValue, Instance, ObjectKey, Registry};
pub use storage::Storage;
