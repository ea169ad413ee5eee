//! Loading alternative catalogs from JSON.
//!
//! Files are checked against `schema/entry_catalog.schema.json` before they
//! are deserialized, then checked again for duplicate names so a catalog can
//! never probe the same identifier twice in one scan.

use crate::catalog::identity::EntryKind;
use crate::catalog::model::{CatalogEntry, EntryCatalog, TestValue};
use crate::producer::{ObjectKind, PropertyValue};
use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const CATALOG_SCHEMA: &str = include_str!("../../schema/entry_catalog.schema.json");

#[derive(Debug, Deserialize)]
struct CatalogFile {
    name: String,
    features: Vec<String>,
    properties: Vec<PropertyFile>,
}

#[derive(Debug, Deserialize)]
struct PropertyFile {
    name: String,
    test_value: TestValueFile,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TestValueFile {
    Text { text: String },
    Object { object: String, kind: ObjectKind },
    Resolve { resolve: Vec<String>, kind: ObjectKind },
}

impl From<TestValueFile> for TestValue {
    fn from(value: TestValueFile) -> Self {
        match value {
            TestValueFile::Text { text } => TestValue::Literal(PropertyValue::Text(text)),
            TestValueFile::Object { object, kind } => {
                TestValue::Literal(PropertyValue::object(object, kind))
            }
            TestValueFile::Resolve { resolve, kind } => TestValue::Resolve {
                candidates: resolve,
                kind,
            },
        }
    }
}

/// Read, schema-check, and validate a catalog file.
pub fn load_catalog_from_path(path: &Path) -> Result<EntryCatalog> {
    let file = File::open(path).with_context(|| format!("opening catalog {}", path.display()))?;
    let value: Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing catalog {}", path.display()))?;
    catalog_from_value(value).with_context(|| format!("loading catalog {}", path.display()))
}

/// Validate an in-memory JSON catalog and build an [`EntryCatalog`] from it.
pub fn catalog_from_value(value: Value) -> Result<EntryCatalog> {
    validate_against_schema(&value)?;
    let file: CatalogFile =
        serde_json::from_value(value).context("catalog does not match the expected layout")?;
    build_catalog(file)
}

fn validate_against_schema(value: &Value) -> Result<()> {
    let schema_value: Value =
        serde_json::from_str(CATALOG_SCHEMA).context("parsing bundled catalog schema")?;
    let schema = JSONSchema::compile(&schema_value)
        .map_err(|err| anyhow!("compiling bundled catalog schema: {err}"))?;

    if let Err(errors) = schema.validate(value) {
        let details = errors
            .map(|err| err.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        bail!("catalog failed schema validation:\n{details}");
    }
    Ok(())
}

fn build_catalog(file: CatalogFile) -> Result<EntryCatalog> {
    if file.features.is_empty() && file.properties.is_empty() {
        bail!("catalog {} contains no entries", file.name);
    }

    let mut seen: BTreeSet<(EntryKind, String)> = BTreeSet::new();
    let mut features = Vec::with_capacity(file.features.len());
    for name in file.features {
        check_local_name(EntryKind::Feature, &name, &mut seen)?;
        features.push(CatalogEntry::feature(name));
    }

    let mut properties = Vec::with_capacity(file.properties.len());
    for property in file.properties {
        check_local_name(EntryKind::Property, &property.name, &mut seen)?;
        properties.push(CatalogEntry::property(
            property.name,
            property.test_value.into(),
        ));
    }

    Ok(EntryCatalog::from_parts(file.name, features, properties))
}

fn check_local_name(
    kind: EntryKind,
    name: &str,
    seen: &mut BTreeSet<(EntryKind, String)>,
) -> Result<()> {
    if name.trim().is_empty() {
        bail!("encountered {kind} with an empty name");
    }
    if !seen.insert((kind, name.to_string())) {
        bail!("duplicate {kind} {name}");
    }
    Ok(())
}
