//! The probe protocol.
//!
//! Every entry is exercised by the same three steps, strictly in order:
//!
//! 1. read the current value,
//! 2. write that exact value back,
//! 3. write a different value (the negation for features, the catalog's test
//!    value for properties).
//!
//! The first failing step ends the sequence. Which step failed, and whether
//! the producer said "not supported" or "not recognized", decides the
//! [`Outcome`]. Any other failure is not part of the protocol and is returned
//! as [`ProbeError`] instead of being classified.
//!
//! A fully successful sequence leaves the producer holding the step-3 value.

use crate::catalog::{EntryId, EntryKind};
use crate::producer::{AccessError, Producer, PropertyValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// One step of the probe sequence.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStep {
    InitialRead,
    WriteSameValue,
    WriteDifferentValue,
}

impl fmt::Display for ProbeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProbeStep::InitialRead => "initial read",
            ProbeStep::WriteSameValue => "rewrite of the current value",
            ProbeStep::WriteDifferentValue => "write of a different value",
        })
    }
}

/// Support level inferred for one entry on one producer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    /// All three steps succeeded.
    ReadAndWrite,
    /// The initial read was not supported at this time.
    UnreadableNow,
    /// Rewriting the value just read was not supported. A read/write entry
    /// should accept that no-op, so this points at a producer bug.
    BogusReassignment,
    /// The current value can be rewritten but not changed.
    ReadOnly,
    /// The initial read reported the identifier as unknown.
    Unrecognized,
    /// A later step reported the identifier as unknown after an earlier step
    /// on the same identifier succeeded.
    InconsistentRecognition,
}

impl Outcome {
    pub const ALL: [Outcome; 6] = [
        Outcome::ReadAndWrite,
        Outcome::UnreadableNow,
        Outcome::BogusReassignment,
        Outcome::ReadOnly,
        Outcome::Unrecognized,
        Outcome::InconsistentRecognition,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::ReadAndWrite => "read-and-write",
            Outcome::UnreadableNow => "unreadable-now",
            Outcome::BogusReassignment => "bogus-reassignment",
            Outcome::ReadOnly => "read-only",
            Outcome::Unrecognized => "unrecognized",
            Outcome::InconsistentRecognition => "inconsistent-recognition",
        }
    }

    /// Outcomes that indicate the producer broke the read/write contract.
    pub fn is_anomaly(&self) -> bool {
        matches!(
            self,
            Outcome::BogusReassignment | Outcome::InconsistentRecognition
        )
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value returned by a successful initial read.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservedValue {
    Flag(bool),
    Property(PropertyValue),
}

impl fmt::Display for ObservedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservedValue::Flag(value) => write!(f, "{value}"),
            ObservedValue::Property(value) => write!(f, "{value}"),
        }
    }
}

/// Result of probing one entry: exactly one outcome, plus the observed value
/// whenever the initial read succeeded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Observation {
    pub id: EntryId,
    pub kind: EntryKind,
    pub observed: Option<ObservedValue>,
    pub outcome: Outcome,
}

/// A failure the protocol does not classify.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("unexpected failure during {step} of {id}")]
    Unexpected {
        id: EntryId,
        step: ProbeStep,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ProbeState {
    Start,
    ReadOk,
    RewroteSameOk,
}

impl ProbeState {
    /// The step that runs while in this state.
    fn pending_step(self) -> ProbeStep {
        match self {
            ProbeState::Start => ProbeStep::InitialRead,
            ProbeState::ReadOk => ProbeStep::WriteSameValue,
            ProbeState::RewroteSameOk => ProbeStep::WriteDifferentValue,
        }
    }

    fn classify(self, id: &EntryId, error: AccessError) -> Result<Outcome, ProbeError> {
        let outcome = match (error, self) {
            (AccessError::NotSupported(_), ProbeState::Start) => Outcome::UnreadableNow,
            (AccessError::NotSupported(_), ProbeState::ReadOk) => Outcome::BogusReassignment,
            (AccessError::NotSupported(_), ProbeState::RewroteSameOk) => Outcome::ReadOnly,
            (AccessError::NotRecognized(_), ProbeState::Start) => Outcome::Unrecognized,
            (AccessError::NotRecognized(_), _) => Outcome::InconsistentRecognition,
            (AccessError::Other(source), state) => {
                return Err(ProbeError::Unexpected {
                    id: id.clone(),
                    step: state.pending_step(),
                    source,
                });
            }
        };
        Ok(outcome)
    }
}

/// Typed read/write pair for one kind of entry.
trait EntryAccess {
    type Value: Clone + fmt::Debug;

    fn read(&self, producer: &dyn Producer, id: &EntryId) -> Result<Self::Value, AccessError>;

    fn write(
        &self,
        producer: &mut dyn Producer,
        id: &EntryId,
        value: Self::Value,
    ) -> Result<(), AccessError>;

    /// Value written by the last step, given the value read by the first.
    fn changed(&self, current: &Self::Value) -> Self::Value;
}

struct FeatureAccess;

impl EntryAccess for FeatureAccess {
    type Value = bool;

    fn read(&self, producer: &dyn Producer, id: &EntryId) -> Result<bool, AccessError> {
        producer.get_feature(id)
    }

    fn write(
        &self,
        producer: &mut dyn Producer,
        id: &EntryId,
        value: bool,
    ) -> Result<(), AccessError> {
        producer.set_feature(id, value)
    }

    fn changed(&self, current: &bool) -> bool {
        !*current
    }
}

struct PropertyAccess<'a> {
    new_value: &'a PropertyValue,
}

impl EntryAccess for PropertyAccess<'_> {
    type Value = PropertyValue;

    fn read(&self, producer: &dyn Producer, id: &EntryId) -> Result<PropertyValue, AccessError> {
        producer.get_property(id)
    }

    fn write(
        &self,
        producer: &mut dyn Producer,
        id: &EntryId,
        value: PropertyValue,
    ) -> Result<(), AccessError> {
        producer.set_property(id, value)
    }

    fn changed(&self, _current: &PropertyValue) -> PropertyValue {
        self.new_value.clone()
    }
}

fn run_sequence<A: EntryAccess>(
    access: &A,
    producer: &mut dyn Producer,
    id: &EntryId,
) -> Result<(Option<A::Value>, Outcome), ProbeError> {
    let mut state = ProbeState::Start;
    let observed = match access.read(&*producer, id) {
        Ok(value) => value,
        Err(err) => {
            debug!(%id, "initial read failed: {err}");
            return state.classify(id, err).map(|outcome| (None, outcome));
        }
    };
    debug!(%id, ?observed, "read");
    state = ProbeState::ReadOk;

    let outcome = match write_twice(access, producer, id, &observed, &mut state) {
        Ok(()) => Outcome::ReadAndWrite,
        Err(err) => {
            debug!(%id, step = %state.pending_step(), "write failed: {err}");
            state.classify(id, err)?
        }
    };
    Ok((Some(observed), outcome))
}

fn write_twice<A: EntryAccess>(
    access: &A,
    producer: &mut dyn Producer,
    id: &EntryId,
    observed: &A::Value,
    state: &mut ProbeState,
) -> Result<(), AccessError> {
    access.write(producer, id, observed.clone())?;
    *state = ProbeState::RewroteSameOk;
    access.write(producer, id, access.changed(observed))
}

/// Probe the feature `local_name` (joined onto the feature namespace).
///
/// On `ReadAndWrite` the producer is left holding the negated value.
pub fn probe_feature(
    producer: &mut dyn Producer,
    local_name: &str,
) -> Result<Observation, ProbeError> {
    let id = EntryId::new(EntryKind::Feature, local_name);
    let (observed, outcome) = run_sequence(&FeatureAccess, producer, &id)?;
    Ok(Observation {
        id,
        kind: EntryKind::Feature,
        observed: observed.map(ObservedValue::Flag),
        outcome,
    })
}

/// Probe the property `local_name`, using `new_value` for the final write.
///
/// On `ReadAndWrite` the producer is left holding `new_value`.
pub fn probe_property(
    producer: &mut dyn Producer,
    local_name: &str,
    new_value: &PropertyValue,
) -> Result<Observation, ProbeError> {
    let id = EntryId::new(EntryKind::Property, local_name);
    let (observed, outcome) = run_sequence(&PropertyAccess { new_value }, producer, &id)?;
    Ok(Observation {
        id,
        kind: EntryKind::Property,
        observed: observed.map(ObservedValue::Property),
        outcome,
    })
}
