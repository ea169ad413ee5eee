//! Scans a list of producers against a catalog.
//!
//! Producers are resolved and scanned one at a time, in the order requested.
//! A producer that cannot be created is reported and skipped; a producer whose
//! scan hits an unclassified failure has its remaining entries abandoned. In
//! both cases the runner moves on to the next name. Only a failing report sink
//! stops the whole run.

use crate::catalog::{CatalogEntry, EntryCatalog, EntryKind};
use crate::engine::{Observation, ProbeError, probe_feature, probe_property};
use crate::error_chain;
use crate::producer::{Producer, ProducerRegistry, ResolveError};
use crate::samples::SampleRegistry;
use anyhow::Result;
use tracing::{debug, info};

/// Receives scan events in order. Formatting is entirely up to the sink.
pub trait ReportSink {
    /// A producer was created and is about to be scanned.
    fn begin_producer(&mut self, requested: &str, implementation: &str) -> Result<()>;

    /// Entries of `kind` follow.
    fn begin_section(&mut self, producer: &str, kind: EntryKind) -> Result<()>;

    fn observation(&mut self, producer: &str, observation: &Observation) -> Result<()>;

    /// The scan of `producer` stopped on an unclassified failure.
    fn producer_failed(&mut self, producer: &str, error: &ProbeError) -> Result<()>;

    /// Called after every scanned producer, including aborted ones.
    fn end_producer(&mut self, producer: &str) -> Result<()>;

    /// `requested` could not be turned into a producer; nothing was probed.
    fn producer_unavailable(&mut self, requested: &str, error: &ResolveError) -> Result<()>;
}

/// How the scan of one requested producer ended.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProducerStatus {
    Scanned,
    Unavailable { reason: String },
    Aborted { reason: String },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProducerSummary {
    pub name: String,
    pub status: ProducerStatus,
    /// Entries that produced an outcome.
    pub entries_scanned: usize,
    /// Properties omitted because no sample value could be built.
    pub properties_skipped: Vec<String>,
}

/// Per-producer results of one run, in request order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RunSummary {
    pub producers: Vec<ProducerSummary>,
}

impl RunSummary {
    pub fn entries_scanned(&self) -> usize {
        self.producers.iter().map(|p| p.entries_scanned).sum()
    }

    pub fn unavailable(&self) -> usize {
        self.count(|status| matches!(status, ProducerStatus::Unavailable { .. }))
    }

    pub fn aborted(&self) -> usize {
        self.count(|status| matches!(status, ProducerStatus::Aborted { .. }))
    }

    pub fn scanned(&self) -> usize {
        self.count(|status| matches!(status, ProducerStatus::Scanned))
    }

    fn count(&self, predicate: impl Fn(&ProducerStatus) -> bool) -> usize {
        self.producers
            .iter()
            .filter(|p| predicate(&p.status))
            .count()
    }
}

enum ScanError {
    Probe(ProbeError),
    Sink(anyhow::Error),
}

impl From<ProbeError> for ScanError {
    fn from(err: ProbeError) -> Self {
        ScanError::Probe(err)
    }
}

/// Drives the probe engine over every catalog entry of every requested producer.
pub struct ProbeRunner<'a> {
    registry: &'a ProducerRegistry,
    catalog: &'a EntryCatalog,
    samples: &'a SampleRegistry,
}

impl<'a> ProbeRunner<'a> {
    pub fn new(
        registry: &'a ProducerRegistry,
        catalog: &'a EntryCatalog,
        samples: &'a SampleRegistry,
    ) -> Self {
        Self {
            registry,
            catalog,
            samples,
        }
    }

    /// Scan every name in `names`, in order.
    pub fn run<S: AsRef<str>>(&self, names: &[S], sink: &mut dyn ReportSink) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for name in names {
            summary.producers.push(self.scan(name.as_ref(), sink)?);
        }
        Ok(summary)
    }

    /// Resolve and scan a single producer.
    pub fn scan(&self, name: &str, sink: &mut dyn ReportSink) -> Result<ProducerSummary> {
        let mut summary = ProducerSummary {
            name: name.to_string(),
            status: ProducerStatus::Scanned,
            entries_scanned: 0,
            properties_skipped: Vec::new(),
        };

        let mut producer = match self.registry.create(name) {
            Ok(producer) => producer,
            Err(err) => {
                debug!(producer = name, "unavailable: {}", error_chain(&err));
                sink.producer_unavailable(name, &err)?;
                summary.status = ProducerStatus::Unavailable {
                    reason: error_chain(&err),
                };
                return Ok(summary);
            }
        };

        info!(producer = name, implementation = producer.name(), "scanning");
        let implementation = producer.name().to_string();
        sink.begin_producer(name, &implementation)?;

        match self.scan_entries(name, producer.as_mut(), sink, &mut summary) {
            Ok(()) => {}
            Err(ScanError::Probe(err)) => {
                debug!(producer = name, "scan aborted: {}", error_chain(&err));
                sink.producer_failed(name, &err)?;
                summary.status = ProducerStatus::Aborted {
                    reason: error_chain(&err),
                };
            }
            Err(ScanError::Sink(err)) => return Err(err),
        }

        // The producer has been mutated by the probes; it is not reused.
        drop(producer);
        sink.end_producer(name)?;
        Ok(summary)
    }

    fn scan_entries(
        &self,
        name: &str,
        producer: &mut dyn Producer,
        sink: &mut dyn ReportSink,
        summary: &mut ProducerSummary,
    ) -> Result<(), ScanError> {
        sink.begin_section(name, EntryKind::Feature)
            .map_err(ScanError::Sink)?;
        for entry in self.catalog.features() {
            let observation = probe_feature(producer, &entry.local_name)?;
            record(name, observation, sink, summary)?;
        }

        sink.begin_section(name, EntryKind::Property)
            .map_err(ScanError::Sink)?;
        for entry in self.catalog.properties() {
            let Some(new_value) = self.property_test_value(entry) else {
                debug!(producer = name, property = %entry.local_name, "no sample value, skipped");
                summary.properties_skipped.push(entry.local_name.clone());
                continue;
            };
            let observation = probe_property(producer, &entry.local_name, &new_value)?;
            record(name, observation, sink, summary)?;
        }
        Ok(())
    }

    fn property_test_value(&self, entry: &CatalogEntry) -> Option<crate::producer::PropertyValue> {
        entry.test_value.as_ref()?.materialize(self.samples)
    }
}

fn record(
    name: &str,
    observation: Observation,
    sink: &mut dyn ReportSink,
    summary: &mut ProducerSummary,
) -> Result<(), ScanError> {
    debug!(producer = name, id = %observation.id, outcome = %observation.outcome, "classified");
    summary.entries_scanned += 1;
    sink.observation(name, &observation)
        .map_err(ScanError::Sink)
}
