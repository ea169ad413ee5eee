//! Capability surface of a reader under test.
//!
//! A producer exposes named boolean features and named object properties.
//! Every accessor may fail with one of the two failure kinds the probe
//! protocol understands (`NotSupported`, `NotRecognized`) or with anything
//! else, which the engine refuses to classify.

use crate::catalog::EntryId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod registry;
pub mod table;

pub use registry::{DEFAULT_PRODUCERS, ProducerRegistry, ResolveError};
pub use table::{Access, TableProducer};

/// Failure returned by a single producer accessor call.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The identifier is known but the requested read or transition is
    /// rejected right now.
    #[error("not supported: {0}")]
    NotSupported(String),
    /// The identifier itself is unknown to the producer.
    #[error("not recognized: {0}")]
    NotRecognized(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AccessError {
    pub fn not_supported(id: &EntryId) -> Self {
        AccessError::NotSupported(id.to_string())
    }

    pub fn not_recognized(id: &EntryId) -> Self {
        AccessError::NotRecognized(id.to_string())
    }
}

/// The four accessors a reader-like component offers for configuration.
///
/// Getters take `&self`; setters may permanently change the producer. A
/// probed producer is left in whatever state the probe wrote and should be
/// dropped afterwards.
pub trait Producer {
    /// Human-readable implementation name used in report headers.
    fn name(&self) -> &str;

    fn get_feature(&self, id: &EntryId) -> Result<bool, AccessError>;

    fn set_feature(&mut self, id: &EntryId, value: bool) -> Result<(), AccessError>;

    fn get_property(&self, id: &EntryId) -> Result<PropertyValue, AccessError>;

    fn set_property(&mut self, id: &EntryId, value: PropertyValue) -> Result<(), AccessError>;
}

/// Broad shape of an object-valued property.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Handler,
    Node,
    Other,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Handler => "handler",
            ObjectKind::Node => "node",
            ObjectKind::Other => "other",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque object instance stored in a property slot.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ObjectValue {
    pub type_name: String,
    pub kind: ObjectKind,
}

impl ObjectValue {
    pub fn new(type_name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            type_name: type_name.into(),
            kind,
        }
    }
}

/// Value held by (or written to) a property.
///
/// `Null` is a legitimate readable value: a handler property with no handler
/// installed reads back as `Null`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Text(String),
    Object(ObjectValue),
}

impl PropertyValue {
    pub fn text(value: impl Into<String>) -> Self {
        PropertyValue::Text(value.into())
    }

    pub fn object(type_name: impl Into<String>, kind: ObjectKind) -> Self {
        PropertyValue::Object(ObjectValue::new(type_name, kind))
    }

    /// Object kind carried by this value, if it is an object.
    pub fn object_kind(&self) -> Option<ObjectKind> {
        match self {
            PropertyValue::Object(object) => Some(object.kind),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Null => f.write_str("null"),
            PropertyValue::Text(text) => f.write_str(text),
            PropertyValue::Object(object) => write!(f, "{}", object.type_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EntryKind;

    #[test]
    fn property_values_serialize_untagged() {
        assert_eq!(serde_json::to_string(&PropertyValue::Null).unwrap(), "null");
        assert_eq!(
            serde_json::to_string(&PropertyValue::text("<root/>")).unwrap(),
            "\"<root/>\""
        );
        let handler = PropertyValue::object("DefaultHandler2", ObjectKind::Handler);
        let json = serde_json::to_value(&handler).unwrap();
        assert_eq!(json["type_name"], "DefaultHandler2");
        assert_eq!(json["kind"], "handler");
        let back: PropertyValue = serde_json::from_value(json).unwrap();
        assert_eq!(back, handler);
    }

    #[test]
    fn access_errors_name_the_identifier() {
        let id = EntryId::new(EntryKind::Feature, "validation");
        let err = AccessError::not_recognized(&id);
        assert_eq!(
            err.to_string(),
            "not recognized: http://xml.org/sax/features/validation"
        );
        assert!(matches!(
            AccessError::not_supported(&id),
            AccessError::NotSupported(_)
        ));
    }
}
