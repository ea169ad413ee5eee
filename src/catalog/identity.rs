use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Namespace prefix shared by every standard feature identifier.
pub const FEATURE_NAMESPACE: &str = "http://xml.org/sax/features/";

/// Namespace prefix shared by every standard property identifier.
pub const PROPERTY_NAMESPACE: &str = "http://xml.org/sax/properties/";

/// Whether a catalog entry is a boolean feature or an object property.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum EntryKind {
    Feature,
    Property,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Feature => "feature",
            EntryKind::Property => "property",
        }
    }

    /// Namespace prefix joined to local names of this kind.
    pub fn namespace(&self) -> &'static str {
        match self {
            EntryKind::Feature => FEATURE_NAMESPACE,
            EntryKind::Property => PROPERTY_NAMESPACE,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EntryKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntryKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        match value.as_str() {
            "feature" => Ok(EntryKind::Feature),
            "property" => Ok(EntryKind::Property),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["feature", "property"],
            )),
        }
    }
}

/// Fully qualified entry identifier (namespace prefix + local name).
///
/// Identifiers compare by exact, case-sensitive string equality; two entries
/// with the same local name but different kinds never collide because their
/// namespaces differ.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl EntryId {
    /// Join `local_name` onto the namespace for `kind`.
    pub fn new(kind: EntryKind, local_name: &str) -> Self {
        EntryId(format!("{}{}", kind.namespace(), local_name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Local name with the standard namespace stripped, if it carries one.
    pub fn local_name(&self) -> &str {
        self.0
            .strip_prefix(FEATURE_NAMESPACE)
            .or_else(|| self.0.strip_prefix(PROPERTY_NAMESPACE))
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_join_namespace_and_local_name() {
        let feature = EntryId::new(EntryKind::Feature, "namespaces");
        assert_eq!(feature.as_str(), "http://xml.org/sax/features/namespaces");
        assert_eq!(feature.local_name(), "namespaces");

        let property = EntryId::new(EntryKind::Property, "xml-string");
        assert_eq!(
            property.as_str(),
            "http://xml.org/sax/properties/xml-string"
        );
        assert_ne!(
            EntryId::new(EntryKind::Feature, "lexical-handler"),
            EntryId::new(EntryKind::Property, "lexical-handler")
        );
    }

    #[test]
    fn ids_are_case_sensitive() {
        assert_ne!(
            EntryId::new(EntryKind::Feature, "Namespaces"),
            EntryId::new(EntryKind::Feature, "namespaces")
        );
    }

    #[test]
    fn kind_serializes_as_lowercase_label() {
        let json = serde_json::to_string(&EntryKind::Property).unwrap();
        assert_eq!(json, "\"property\"");
        let back: EntryKind = serde_json::from_str("\"feature\"").unwrap();
        assert_eq!(back, EntryKind::Feature);
        assert!(serde_json::from_str::<EntryKind>("\"handler\"").is_err());
    }
}
