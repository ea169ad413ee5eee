//! Table-driven producer.
//!
//! Each known identifier maps to a stored value plus an [`Access`] policy that
//! decides how reads and writes behave. Identifiers missing from the table are
//! not recognized. The built-in reference producers and the test suite both
//! describe readers this way.

use crate::catalog::{EntryId, EntryKind};
use crate::producer::{AccessError, Producer, PropertyValue};
use std::collections::BTreeMap;

/// How a table slot responds to the probe's read and write calls.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Access {
    /// Reads and writes of any value succeed.
    ReadWrite,
    /// Writing the current value is accepted as a no-op; any other value is
    /// not supported.
    ReadOnly,
    /// Every write is not supported, including rewriting the current value.
    Frozen,
    /// Reads are not supported at this time, and neither are writes.
    Unreadable,
    /// Reads succeed but writes claim the identifier is not recognized.
    Forgetful,
}

#[derive(Clone, Debug)]
struct Slot<V> {
    value: V,
    access: Access,
}

impl<V: Clone + PartialEq> Slot<V> {
    fn read(&self, id: &EntryId) -> Result<V, AccessError> {
        match self.access {
            Access::Unreadable => Err(AccessError::not_supported(id)),
            _ => Ok(self.value.clone()),
        }
    }

    fn write(&mut self, id: &EntryId, value: V) -> Result<(), AccessError> {
        match self.access {
            Access::ReadWrite => {
                self.value = value;
                Ok(())
            }
            Access::ReadOnly if self.value == value => Ok(()),
            Access::ReadOnly | Access::Frozen | Access::Unreadable => {
                Err(AccessError::not_supported(id))
            }
            Access::Forgetful => Err(AccessError::not_recognized(id)),
        }
    }
}

/// In-memory producer configured entry by entry.
#[derive(Clone, Debug)]
pub struct TableProducer {
    name: String,
    features: BTreeMap<EntryId, Slot<bool>>,
    properties: BTreeMap<EntryId, Slot<PropertyValue>>,
}

impl TableProducer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            features: BTreeMap::new(),
            properties: BTreeMap::new(),
        }
    }

    /// Register a feature by local name.
    pub fn with_feature(mut self, local_name: &str, value: bool, access: Access) -> Self {
        self.features.insert(
            EntryId::new(EntryKind::Feature, local_name),
            Slot { value, access },
        );
        self
    }

    /// Register a property by local name.
    pub fn with_property(mut self, local_name: &str, value: PropertyValue, access: Access) -> Self {
        self.properties.insert(
            EntryId::new(EntryKind::Property, local_name),
            Slot { value, access },
        );
        self
    }

    /// Currently stored feature value, bypassing the access policy.
    pub fn feature(&self, local_name: &str) -> Option<bool> {
        self.features
            .get(&EntryId::new(EntryKind::Feature, local_name))
            .map(|slot| slot.value)
    }

    /// Currently stored property value, bypassing the access policy.
    pub fn property(&self, local_name: &str) -> Option<&PropertyValue> {
        self.properties
            .get(&EntryId::new(EntryKind::Property, local_name))
            .map(|slot| &slot.value)
    }
}

impl Producer for TableProducer {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_feature(&self, id: &EntryId) -> Result<bool, AccessError> {
        self.features
            .get(id)
            .ok_or_else(|| AccessError::not_recognized(id))?
            .read(id)
    }

    fn set_feature(&mut self, id: &EntryId, value: bool) -> Result<(), AccessError> {
        self.features
            .get_mut(id)
            .ok_or_else(|| AccessError::not_recognized(id))?
            .write(id, value)
    }

    fn get_property(&self, id: &EntryId) -> Result<PropertyValue, AccessError> {
        self.properties
            .get(id)
            .ok_or_else(|| AccessError::not_recognized(id))?
            .read(id)
    }

    fn set_property(&mut self, id: &EntryId, value: PropertyValue) -> Result<(), AccessError> {
        self.properties
            .get_mut(id)
            .ok_or_else(|| AccessError::not_recognized(id))?
            .write(id, value)
    }
}
