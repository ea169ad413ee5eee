#![allow(dead_code)]

use anyhow::{Context, Result, anyhow, bail};
use saxprobe::{
    AccessError, EntryId, EntryKind, Observation, ProbeError, Producer, PropertyValue,
    ReportSink, ResolveError, error_chain,
};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::rc::Rc;

/// Path to one of the crate's binaries, built by cargo for integration tests.
pub fn helper_binary(name: &str) -> PathBuf {
    match name {
        "sax-probe" => PathBuf::from(env!("CARGO_BIN_EXE_sax-probe")),
        "probe-summary" => PathBuf::from(env!("CARGO_BIN_EXE_probe-summary")),
        other => panic!("unknown helper binary {other}"),
    }
}

/// `sax-probe` with configuration inherited from the caller's environment
/// cleared, so only what the test sets is in effect.
pub fn sax_probe_command() -> Command {
    let mut cmd = Command::new(helper_binary("sax-probe"));
    cmd.env_remove(saxprobe::PRODUCERS_ENV)
        .env_remove(saxprobe::CATALOG_ENV)
        .env_remove("RUST_LOG");
    cmd
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {cmd:?}"))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

/// Run `cmd` with `input` on stdin; fails unless it exits successfully.
pub fn run_with_stdin(mut cmd: Command, input: &[u8]) -> Result<Output> {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn command: {cmd:?}"))?;
    child
        .stdin
        .take()
        .context("child stdin unavailable")?
        .write_all(input)
        .context("writing child stdin")?;
    let output = child.wait_with_output().context("waiting for child")?;
    if !output.status.success() {
        bail!(
            "command {:?} failed: status {:?}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}

/// Scripted response for one protocol step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reply {
    Ok,
    NotSupported,
    NotRecognized,
    Broken,
}

impl Reply {
    fn into_result(self, id: &EntryId) -> Result<(), AccessError> {
        match self {
            Reply::Ok => Ok(()),
            Reply::NotSupported => Err(AccessError::not_supported(id)),
            Reply::NotRecognized => Err(AccessError::not_recognized(id)),
            Reply::Broken => Err(AccessError::Other(anyhow!("{id} exploded"))),
        }
    }
}

struct Script<V> {
    value: V,
    replies: [Reply; 3],
    writes: usize,
}

pub type CallLog = Rc<RefCell<Vec<String>>>;

/// Producer whose read, rewrite, and change replies are scripted per entry.
///
/// Unscripted identifiers are not recognized. Every accessor call is logged
/// as `get <local>` / `set <local>=<value>`.
pub struct ScriptedProducer {
    name: String,
    features: BTreeMap<EntryId, Script<bool>>,
    properties: BTreeMap<EntryId, Script<PropertyValue>>,
    log: CallLog,
}

impl ScriptedProducer {
    pub fn new(name: &str) -> Self {
        Self::with_log(name, CallLog::default())
    }

    pub fn with_log(name: &str, log: CallLog) -> Self {
        Self {
            name: name.to_string(),
            features: BTreeMap::new(),
            properties: BTreeMap::new(),
            log,
        }
    }

    pub fn feature(mut self, local_name: &str, value: bool, replies: [Reply; 3]) -> Self {
        self.features.insert(
            EntryId::new(EntryKind::Feature, local_name),
            Script {
                value,
                replies,
                writes: 0,
            },
        );
        self
    }

    pub fn property(mut self, local_name: &str, value: PropertyValue, replies: [Reply; 3]) -> Self {
        self.properties.insert(
            EntryId::new(EntryKind::Property, local_name),
            Script {
                value,
                replies,
                writes: 0,
            },
        );
        self
    }

    pub fn stored_feature(&self, local_name: &str) -> Option<bool> {
        self.features
            .get(&EntryId::new(EntryKind::Feature, local_name))
            .map(|script| script.value)
    }

    pub fn stored_property(&self, local_name: &str) -> Option<&PropertyValue> {
        self.properties
            .get(&EntryId::new(EntryKind::Property, local_name))
            .map(|script| &script.value)
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    fn note(&self, call: String) {
        self.log.borrow_mut().push(call);
    }
}

fn read_script<V: Clone>(
    scripts: &BTreeMap<EntryId, Script<V>>,
    id: &EntryId,
) -> Result<V, AccessError> {
    let script = scripts
        .get(id)
        .ok_or_else(|| AccessError::not_recognized(id))?;
    script.replies[0].into_result(id)?;
    Ok(script.value.clone())
}

fn write_script<V>(
    scripts: &mut BTreeMap<EntryId, Script<V>>,
    id: &EntryId,
    value: V,
) -> Result<(), AccessError> {
    let script = scripts
        .get_mut(id)
        .ok_or_else(|| AccessError::not_recognized(id))?;
    let step = (script.writes + 1).min(2);
    script.writes += 1;
    script.replies[step].into_result(id)?;
    script.value = value;
    Ok(())
}

impl Producer for ScriptedProducer {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_feature(&self, id: &EntryId) -> Result<bool, AccessError> {
        self.note(format!("get {}", id.local_name()));
        read_script(&self.features, id)
    }

    fn set_feature(&mut self, id: &EntryId, value: bool) -> Result<(), AccessError> {
        self.note(format!("set {}={value}", id.local_name()));
        write_script(&mut self.features, id, value)
    }

    fn get_property(&self, id: &EntryId) -> Result<PropertyValue, AccessError> {
        self.note(format!("get {}", id.local_name()));
        read_script(&self.properties, id)
    }

    fn set_property(&mut self, id: &EntryId, value: PropertyValue) -> Result<(), AccessError> {
        self.note(format!("set {}={value}", id.local_name()));
        write_script(&mut self.properties, id, value)
    }
}

/// Sink events captured by [`RecordingSink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Begin { requested: String, implementation: String },
    Section(EntryKind),
    Entry { producer: String, observation: Observation },
    Failed { producer: String, message: String },
    End(String),
    Unavailable { requested: String, message: String },
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<Event>,
}

impl RecordingSink {
    pub fn observations_for(&self, producer: &str) -> Vec<&Observation> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Entry {
                    producer: p,
                    observation,
                } if p == producer => Some(observation),
                _ => None,
            })
            .collect()
    }
}

impl ReportSink for RecordingSink {
    fn begin_producer(&mut self, requested: &str, implementation: &str) -> Result<()> {
        self.events.push(Event::Begin {
            requested: requested.to_string(),
            implementation: implementation.to_string(),
        });
        Ok(())
    }

    fn begin_section(&mut self, _producer: &str, kind: EntryKind) -> Result<()> {
        self.events.push(Event::Section(kind));
        Ok(())
    }

    fn observation(&mut self, producer: &str, observation: &Observation) -> Result<()> {
        self.events.push(Event::Entry {
            producer: producer.to_string(),
            observation: observation.clone(),
        });
        Ok(())
    }

    fn producer_failed(&mut self, producer: &str, error: &ProbeError) -> Result<()> {
        self.events.push(Event::Failed {
            producer: producer.to_string(),
            message: error_chain(error),
        });
        Ok(())
    }

    fn end_producer(&mut self, producer: &str) -> Result<()> {
        self.events.push(Event::End(producer.to_string()));
        Ok(())
    }

    fn producer_unavailable(&mut self, requested: &str, error: &ResolveError) -> Result<()> {
        self.events.push(Event::Unavailable {
            requested: requested.to_string(),
            message: error_chain(error),
        });
        Ok(())
    }
}

/// Sink that stops accepting observations after `limit` of them.
pub struct ClosedPipeSink {
    pub limit: usize,
    pub seen: usize,
}

impl ReportSink for ClosedPipeSink {
    fn begin_producer(&mut self, _requested: &str, _implementation: &str) -> Result<()> {
        Ok(())
    }

    fn begin_section(&mut self, _producer: &str, _kind: EntryKind) -> Result<()> {
        Ok(())
    }

    fn observation(&mut self, _producer: &str, _observation: &Observation) -> Result<()> {
        if self.seen >= self.limit {
            bail!("broken pipe");
        }
        self.seen += 1;
        Ok(())
    }

    fn producer_failed(&mut self, _producer: &str, _error: &ProbeError) -> Result<()> {
        Ok(())
    }

    fn end_producer(&mut self, _producer: &str) -> Result<()> {
        Ok(())
    }

    fn producer_unavailable(&mut self, _requested: &str, _error: &ResolveError) -> Result<()> {
        Ok(())
    }
}
