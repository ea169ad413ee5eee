//! Name-to-constructor registry used to resolve producers at run time.
//!
//! Callers ask for producers by string name; each registered constructor
//! builds a fresh instance so no state leaks between scans. Names that are not
//! registered, and constructors that fail, surface as [`ResolveError`].

use crate::producer::{Access, ObjectKind, Producer, PropertyValue, TableProducer};
use std::collections::BTreeMap;
use thiserror::Error;

/// Producers scanned when the caller names none.
pub const DEFAULT_PRODUCERS: &[&str] = &["conformant", "minimal", "quirky"];

type Constructor = Box<dyn Fn() -> anyhow::Result<Box<dyn Producer>>>;

/// Failure to turn a producer name into an instance.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no producer registered as `{name}`")]
    Unknown { name: String },
    #[error("failed to construct producer `{name}`")]
    Construction {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Default)]
/// Factory mapping producer names to constructors.
pub struct ProducerRegistry {
    constructors: BTreeMap<String, Constructor>,
}

impl ProducerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the reference producers in [`DEFAULT_PRODUCERS`].
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("conformant", || Ok(Box::new(conformant())));
        registry.register("minimal", || Ok(Box::new(minimal())));
        registry.register("quirky", || Ok(Box::new(quirky())));
        registry
    }

    /// Register (or replace) the constructor for `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn() -> anyhow::Result<Box<dyn Producer>> + 'static,
    {
        self.constructors.insert(name.into(), Box::new(constructor));
    }

    /// Build a fresh producer for `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn Producer>, ResolveError> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| ResolveError::Unknown {
                name: name.to_string(),
            })?;
        constructor().map_err(|source| ResolveError::Construction {
            name: name.to_string(),
            source,
        })
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }
}

fn default_handler() -> PropertyValue {
    PropertyValue::object("DefaultHandler", ObjectKind::Handler)
}

/// A well-behaved non-validating reader following the SAX2 defaults.
fn conformant() -> TableProducer {
    TableProducer::new("conformant")
        .with_feature("namespace-prefixes", false, Access::ReadWrite)
        .with_feature("namespaces", true, Access::ReadWrite)
        .with_feature("external-general-entities", true, Access::ReadWrite)
        .with_feature("external-parameter-entities", true, Access::ReadWrite)
        // Only meaningful once a parse has started.
        .with_feature("is-standalone", false, Access::Unreadable)
        .with_feature("lexical-handler/parameter-entities", true, Access::ReadWrite)
        .with_feature("resolve-dtd-uris", true, Access::ReadWrite)
        .with_feature("string-interning", true, Access::ReadOnly)
        .with_feature("use-attributes2", true, Access::ReadOnly)
        .with_feature("use-locator2", true, Access::ReadOnly)
        .with_feature("validation", false, Access::ReadOnly)
        .with_property("declaration-handler", PropertyValue::Null, Access::ReadWrite)
        .with_property("lexical-handler", PropertyValue::Null, Access::ReadWrite)
        .with_property("xml-string", PropertyValue::Null, Access::Unreadable)
}

/// Knows only the two mandatory features.
fn minimal() -> TableProducer {
    TableProducer::new("minimal")
        .with_feature("namespace-prefixes", false, Access::ReadWrite)
        .with_feature("namespaces", true, Access::ReadWrite)
}

/// Exhibits both anomalous error-reporting patterns.
fn quirky() -> TableProducer {
    TableProducer::new("quirky")
        .with_feature("namespace-prefixes", false, Access::ReadWrite)
        .with_feature("namespaces", true, Access::Frozen)
        .with_feature("external-general-entities", true, Access::ReadOnly)
        .with_feature("validation", false, Access::Forgetful)
        .with_property("declaration-handler", default_handler(), Access::Frozen)
        .with_property("dom-node", PropertyValue::Null, Access::Forgetful)
        .with_property("lexical-handler", PropertyValue::Null, Access::ReadWrite)
}
