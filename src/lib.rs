//! Capability probe for reader components.
//!
//! Given producers that expose named boolean features and named object
//! properties, the crate works out which catalog entries each producer
//! supports and how: readable and writable, read-only, unreadable right now,
//! unknown, or one of two anomalous error patterns. It never parses documents;
//! it only calls the four accessors of [`Producer`].
//!
//! The pieces, leaves first: [`catalog`] (which identifiers to probe),
//! [`producer`] (the accessor trait, a table-driven implementation, and the
//! name registry), [`samples`] (object values for property write tests),
//! [`engine`] (the read/rewrite/change protocol and its classification),
//! [`runner`] (per-producer orchestration), [`report`] (sinks), and
//! [`summary`] (rollups of recorded runs).

use anyhow::Result;
use std::env;
use std::path::{Path, PathBuf};

pub mod catalog;
pub mod engine;
pub mod logging;
pub mod producer;
pub mod report;
pub mod runner;
pub mod samples;
pub mod summary;

pub use catalog::{
    CatalogEntry, EntryCatalog, EntryId, EntryKind, TestValue, load_catalog_from_path,
};
pub use engine::{
    Observation, ObservedValue, Outcome, ProbeError, ProbeStep, probe_feature, probe_property,
};
pub use producer::{
    Access, AccessError, DEFAULT_PRODUCERS, ObjectKind, ObjectValue, Producer, ProducerRegistry,
    PropertyValue, ResolveError, TableProducer,
};
pub use report::{
    JsonReport, ProbeRecord, RecordEvent, RecordReadError, TextReport, read_probe_records,
};
pub use runner::{ProbeRunner, ProducerStatus, ProducerSummary, ReportSink, RunSummary};
pub use samples::{SampleError, SampleRegistry};
pub use summary::{ProducerStats, render_summary, summarize};

/// Environment variable overriding the default producer list.
pub const PRODUCERS_ENV: &str = "SAXPROBE_PRODUCERS";

/// Environment variable naming a catalog file when `--catalog` is absent.
pub const CATALOG_ENV: &str = "SAXPROBE_CATALOG";

/// Split comma- or whitespace-delimited configuration lists into tokens.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .replace(',', " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Producer names to scan when none are given on the command line.
///
/// `SAXPROBE_PRODUCERS` wins when it names at least one producer; otherwise
/// the built-in [`DEFAULT_PRODUCERS`] are used.
pub fn default_producer_names() -> Vec<String> {
    env::var(PRODUCERS_ENV)
        .ok()
        .map(|raw| split_list(&raw))
        .filter(|names| !names.is_empty())
        .unwrap_or_else(|| DEFAULT_PRODUCERS.iter().map(|s| s.to_string()).collect())
}

/// Pick the catalog: explicit path, then `SAXPROBE_CATALOG`, then the
/// built-in SAX2 list.
pub fn resolve_catalog(cli_path: Option<&Path>) -> Result<EntryCatalog> {
    let path = cli_path.map(Path::to_path_buf).or_else(|| {
        env::var_os(CATALOG_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    });
    match path {
        Some(path) => load_catalog_from_path(&path),
        None => Ok(EntryCatalog::sax2()),
    }
}

/// Render an error and its sources as `outer: inner: ...`.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_accepts_commas_and_whitespace() {
        assert_eq!(
            split_list("conformant, minimal\tquirky,,"),
            vec!["conformant", "minimal", "quirky"]
        );
        assert!(split_list(" , ").is_empty());
    }

    #[test]
    fn error_chain_includes_sources() {
        let err = ResolveError::Construction {
            name: "broken".into(),
            source: anyhow::anyhow!("missing native library"),
        };
        assert_eq!(
            error_chain(&err),
            "failed to construct producer `broken`: missing native library"
        );
    }

    #[test]
    fn builtin_catalog_is_used_without_a_path() {
        // Only meaningful when the override variable is not set in the
        // test environment.
        if env::var_os(CATALOG_ENV).is_none() {
            assert_eq!(resolve_catalog(None).unwrap(), EntryCatalog::sax2());
        }
    }
}
