//! Entry catalog wiring.
//!
//! The built-in catalog is the SAX2 (+ extensions) list; alternative catalogs
//! can be loaded from JSON files that follow `schema/entry_catalog.schema.json`.
//! Identifiers are always namespace prefix + local name.

pub mod identity;
pub mod loader;
pub mod model;

pub use identity::{EntryId, EntryKind, FEATURE_NAMESPACE, PROPERTY_NAMESPACE};
pub use loader::{catalog_from_value, load_catalog_from_path};
pub use model::{CatalogEntry, DOM_NODE_CANDIDATES, EntryCatalog, TestValue};
