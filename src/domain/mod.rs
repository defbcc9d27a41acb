//! Domain models for the HBnB console
//!
//! Contains object keys, instances, the class registry and attribute
//! coercion, without any I/O concerns.

mod coerce;
mod instance;
mod key;
mod registry;
mod value;

pub use coerce::{apply_params, coerce, parse_param, Applied, ParamError, SPACED_STRING_MARKER};
pub use instance::{Instance, ModelError, RESERVED_ATTRIBUTES, TIMESTAMP_FORMAT};
pub use key::{generate_id, KeyError, ObjectKey};
pub use registry::{Factory, Field, FieldKind, ModelClass, Registry, SchemaViolation};
pub use value::AttrValue;
pub(crate) use value::quote;
