//! Entry catalog: which features and properties get probed, in what order,
//! and what value each property write test uses.

use crate::catalog::identity::{EntryId, EntryKind};
use crate::producer::{ObjectKind, PropertyValue};
use crate::samples::SampleRegistry;

/// Candidate DOM implementations tried for the `dom-node` write test.
pub const DOM_NODE_CANDIDATES: &[&str] = &[
    "crimson.XmlDocument",
    "xerces.DocumentImpl",
    "gnu.DomDocument",
    "memory.Document",
];

const SAX2_FEATURES: &[&str] = &[
    // must-have, default false
    "namespace-prefixes",
    // must-have, default true
    "namespaces",
    "external-general-entities",
    "external-parameter-entities",
    "is-standalone",
    "lexical-handler/parameter-entities",
    "resolve-dtd-uris",
    "string-interning",
    "use-attributes2",
    "use-locator2",
    "validation",
];

/// Value written by the third step of a property probe.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TestValue {
    /// Use this exact value.
    Literal(PropertyValue),
    /// Construct the first available candidate object of `kind`.
    Resolve {
        candidates: Vec<String>,
        kind: ObjectKind,
    },
}

impl TestValue {
    /// Materialize the value, or `None` when no candidate could be built.
    pub fn materialize(&self, samples: &SampleRegistry) -> Option<PropertyValue> {
        match self {
            TestValue::Literal(value) => Some(value.clone()),
            TestValue::Resolve { candidates, kind } => samples.resolve(candidates, *kind),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CatalogEntry {
    pub local_name: String,
    pub kind: EntryKind,
    /// Present for properties only.
    pub test_value: Option<TestValue>,
}

impl CatalogEntry {
    pub fn feature(local_name: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            kind: EntryKind::Feature,
            test_value: None,
        }
    }

    pub fn property(local_name: impl Into<String>, test_value: TestValue) -> Self {
        Self {
            local_name: local_name.into(),
            kind: EntryKind::Property,
            test_value: Some(test_value),
        }
    }

    pub fn id(&self) -> EntryId {
        EntryId::new(self.kind, &self.local_name)
    }
}

/// Ordered feature and property entries probed against every producer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntryCatalog {
    name: String,
    features: Vec<CatalogEntry>,
    properties: Vec<CatalogEntry>,
}

impl EntryCatalog {
    /// Assemble a catalog from already-validated entries.
    pub(crate) fn from_parts(
        name: String,
        features: Vec<CatalogEntry>,
        properties: Vec<CatalogEntry>,
    ) -> Self {
        Self {
            name,
            features,
            properties,
        }
    }

    /// The standard SAX2 list plus the SAX2 extensions.
    pub fn sax2() -> Self {
        let handler = || {
            TestValue::Literal(PropertyValue::object("DefaultHandler2", ObjectKind::Handler))
        };
        let features = SAX2_FEATURES
            .iter()
            .map(|name| CatalogEntry::feature(*name))
            .collect();
        let properties = vec![
            CatalogEntry::property("declaration-handler", handler()),
            CatalogEntry::property(
                "dom-node",
                TestValue::Resolve {
                    candidates: DOM_NODE_CANDIDATES.iter().map(|s| s.to_string()).collect(),
                    kind: ObjectKind::Node,
                },
            ),
            CatalogEntry::property("lexical-handler", handler()),
            CatalogEntry::property(
                "xml-string",
                TestValue::Literal(PropertyValue::text("<root/>")),
            ),
        ];
        Self::from_parts("sax2".to_string(), features, properties)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn features(&self) -> &[CatalogEntry] {
        &self.features
    }

    pub fn properties(&self) -> &[CatalogEntry] {
        &self.properties
    }

    /// Features then properties, in catalog order.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.features.iter().chain(self.properties.iter())
    }

    pub fn len(&self) -> usize {
        self.features.len() + self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EntryCatalog {
    fn default() -> Self {
        Self::sax2()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sax2_catalog_lists_mandatory_features_first() {
        let catalog = EntryCatalog::sax2();
        let names: Vec<&str> = catalog
            .features()
            .iter()
            .map(|entry| entry.local_name.as_str())
            .collect();
        assert_eq!(&names[..2], &["namespace-prefixes", "namespaces"]);
        assert_eq!(names.len(), 11);
        assert_eq!(catalog.properties().len(), 4);
        assert_eq!(catalog.len(), 15);
    }

    #[test]
    fn every_property_carries_a_test_value() {
        let catalog = EntryCatalog::sax2();
        assert!(catalog.properties().iter().all(|entry| entry.test_value.is_some()));
        assert!(catalog.features().iter().all(|entry| entry.test_value.is_none()));
        let last = catalog.entries().last().unwrap();
        assert_eq!(
            last.id().as_str(),
            "http://xml.org/sax/properties/xml-string"
        );
    }

    #[test]
    fn dom_node_materializes_from_builtin_samples() {
        let catalog = EntryCatalog::sax2();
        let dom_node = catalog
            .properties()
            .iter()
            .find(|entry| entry.local_name == "dom-node")
            .and_then(|entry| entry.test_value.as_ref())
            .unwrap();
        assert_eq!(
            dom_node.materialize(&SampleRegistry::with_builtins()),
            Some(PropertyValue::object("memory.Document", ObjectKind::Node))
        );
        assert_eq!(dom_node.materialize(&SampleRegistry::new()), None);
    }
}
