//! Report sinks and the NDJSON record format.
//!
//! [`TextReport`] prints the classic aligned listing for people.
//! [`JsonReport`] emits one [`ProbeRecord`] per line so runs can be piped into
//! other tools (including `probe-summary`, which reads them back with
//! [`read_probe_records`]).

use crate::catalog::{EntryId, EntryKind};
use crate::engine::{Observation, ObservedValue, Outcome, ProbeError};
use crate::error_chain;
use crate::producer::ResolveError;
use crate::runner::ReportSink;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use thiserror::Error;

// Local names are right-aligned to these widths, matching the longest
// standard identifier of each kind.
const FEATURE_ALIGN: usize = 35;
const PROPERTY_ALIGN: usize = 20;

/// Human-readable label used by the text report.
pub fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::ReadAndWrite => "read and write",
        Outcome::UnreadableNow => "(can't read now)",
        Outcome::BogusReassignment => "bogus: rejects rewriting its current value",
        Outcome::ReadOnly => "readonly",
        Outcome::Unrecognized => "(unrecognized)",
        Outcome::InconsistentRecognition => "bogus: unrecognized after succeeding",
    }
}

/// Aligned plain-text listing, one block per producer.
pub struct TextReport<W: Write> {
    out: W,
    header: String,
}

impl<W: Write> TextReport<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            header: String::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for TextReport<W> {
    fn begin_producer(&mut self, requested: &str, implementation: &str) -> Result<()> {
        self.header = if requested == implementation {
            requested.to_string()
        } else {
            format!("{requested} ({implementation})")
        };
        Ok(())
    }

    fn begin_section(&mut self, _producer: &str, kind: EntryKind) -> Result<()> {
        match kind {
            EntryKind::Feature => writeln!(self.out, "FEATURES for {}", self.header)?,
            EntryKind::Property => {
                writeln!(self.out)?;
                writeln!(self.out, "PROPERTIES for {}", self.header)?;
            }
        }
        Ok(())
    }

    fn observation(&mut self, _producer: &str, observation: &Observation) -> Result<()> {
        let width = match observation.kind {
            EntryKind::Feature => FEATURE_ALIGN,
            EntryKind::Property => PROPERTY_ALIGN,
        };
        write!(
            self.out,
            "{:>width$}:  ",
            observation.id.local_name(),
            width = width
        )?;
        if let Some(value) = &observation.observed {
            write!(self.out, "{value}, ")?;
        }
        writeln!(self.out, "{}", outcome_label(observation.outcome))?;
        Ok(())
    }

    fn producer_failed(&mut self, producer: &str, error: &ProbeError) -> Result<()> {
        writeln!(
            self.out,
            "(scan of {producer} aborted: {})",
            error_chain(error)
        )?;
        Ok(())
    }

    fn end_producer(&mut self, _producer: &str) -> Result<()> {
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }

    fn producer_unavailable(&mut self, requested: &str, error: &ResolveError) -> Result<()> {
        writeln!(self.out, "(can't create {requested}: {})", error_chain(error))?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

/// What a [`ProbeRecord`] describes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordEvent {
    Started,
    Observation,
    Aborted,
    Unavailable,
}

/// One line of NDJSON output.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ProbeRecord {
    pub producer: String,
    pub event: RecordEvent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EntryKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed: Option<ObservedValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    /// Implementation name for `started`, error text for failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProbeRecord {
    fn event(producer: &str, event: RecordEvent, detail: Option<String>) -> Self {
        Self {
            producer: producer.to_string(),
            event,
            kind: None,
            id: None,
            observed: None,
            outcome: None,
            detail,
        }
    }

    pub fn from_observation(producer: &str, observation: &Observation) -> Self {
        Self {
            producer: producer.to_string(),
            event: RecordEvent::Observation,
            kind: Some(observation.kind),
            id: Some(observation.id.clone()),
            observed: observation.observed.clone(),
            outcome: Some(observation.outcome),
            detail: None,
        }
    }
}

/// NDJSON sink: one [`ProbeRecord`] per line.
pub struct JsonReport<W: Write> {
    out: W,
}

impl<W: Write> JsonReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, record: &ProbeRecord) -> Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        writeln!(self.out)?;
        Ok(())
    }
}

impl<W: Write> ReportSink for JsonReport<W> {
    fn begin_producer(&mut self, requested: &str, implementation: &str) -> Result<()> {
        self.emit(&ProbeRecord::event(
            requested,
            RecordEvent::Started,
            Some(implementation.to_string()),
        ))
    }

    fn begin_section(&mut self, _producer: &str, _kind: EntryKind) -> Result<()> {
        Ok(())
    }

    fn observation(&mut self, producer: &str, observation: &Observation) -> Result<()> {
        self.emit(&ProbeRecord::from_observation(producer, observation))
    }

    fn producer_failed(&mut self, producer: &str, error: &ProbeError) -> Result<()> {
        let ProbeError::Unexpected { id, .. } = error;
        let mut record =
            ProbeRecord::event(producer, RecordEvent::Aborted, Some(error_chain(error)));
        record.id = Some(id.clone());
        self.emit(&record)
    }

    fn end_producer(&mut self, _producer: &str) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    fn producer_unavailable(&mut self, requested: &str, error: &ResolveError) -> Result<()> {
        self.emit(&ProbeRecord::event(
            requested,
            RecordEvent::Unavailable,
            Some(error_chain(error)),
        ))?;
        self.out.flush()?;
        Ok(())
    }
}

/// Errors that can occur while reading an NDJSON record stream.
#[derive(Debug, Error)]
pub enum RecordReadError {
    #[error("failed to read NDJSON stream: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: unable to parse probe record ({error})")]
    Parse {
        line: usize,
        #[source]
        error: serde_json::Error,
    },
}

/// Read probe records from an NDJSON stream.
///
/// Whitespace-only lines are skipped; parse errors carry the 1-based line
/// number.
pub fn read_probe_records<R: BufRead>(reader: R) -> Result<Vec<ProbeRecord>, RecordReadError> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let record = serde_json::from_str::<ProbeRecord>(trimmed)
            .map_err(|error| RecordReadError::Parse {
                line: idx + 1,
                error,
            })?;
        records.push(record);
    }
    Ok(records)
}
