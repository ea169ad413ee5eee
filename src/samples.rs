//! Best-effort construction of sample objects for property write tests.
//!
//! Some properties only accept a structured object (a DOM node, say), and
//! which object types are available depends on what is installed. The
//! resolver tries candidate type names in order and hands back the first
//! instance that constructs and has the required kind.

use crate::producer::{ObjectKind, PropertyValue};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

type SampleConstructor = Box<dyn Fn() -> Result<PropertyValue, SampleError>>;

/// Why a single candidate could not be used.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("unknown sample type `{0}`")]
    UnknownType(String),
    #[error("constructor for `{0}` is not accessible")]
    Inaccessible(String),
    #[error("failed to instantiate `{type_name}`: {reason}")]
    Instantiation { type_name: String, reason: String },
    #[error("`{type_name}` is not a {expected} object")]
    KindMismatch {
        type_name: String,
        expected: ObjectKind,
    },
}

#[derive(Default)]
/// Registry of sample object constructors keyed by type name.
pub struct SampleRegistry {
    constructors: BTreeMap<String, SampleConstructor>,
}

impl SampleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the in-memory DOM types this crate ships.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("memory.Document", || {
            Ok(PropertyValue::object("memory.Document", ObjectKind::Node))
        });
        registry.register("memory.Element", || {
            Ok(PropertyValue::object("memory.Element", ObjectKind::Node))
        });
        registry
    }

    pub fn register<F>(&mut self, type_name: impl Into<String>, constructor: F)
    where
        F: Fn() -> Result<PropertyValue, SampleError> + 'static,
    {
        self.constructors
            .insert(type_name.into(), Box::new(constructor));
    }

    /// Construct one instance of `type_name` and check it is a `required` object.
    pub fn construct(
        &self,
        type_name: &str,
        required: ObjectKind,
    ) -> Result<PropertyValue, SampleError> {
        let constructor = self
            .constructors
            .get(type_name)
            .ok_or_else(|| SampleError::UnknownType(type_name.to_string()))?;
        let value = constructor()?;
        if value.object_kind() != Some(required) {
            return Err(SampleError::KindMismatch {
                type_name: type_name.to_string(),
                expected: required,
            });
        }
        Ok(value)
    }

    /// First candidate that constructs successfully, or `None` when every
    /// candidate fails.
    pub fn resolve<S: AsRef<str>>(
        &self,
        candidates: &[S],
        required: ObjectKind,
    ) -> Option<PropertyValue> {
        for candidate in candidates {
            let candidate = candidate.as_ref();
            match self.construct(candidate, required) {
                Ok(value) => return Some(value),
                Err(err) => debug!("sample candidate skipped: {err}"),
            }
        }
        None
    }
}
