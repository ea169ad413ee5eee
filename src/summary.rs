//! Per-producer rollup of probe records, as printed by `probe-summary`.

use crate::engine::Outcome;
use crate::report::{ProbeRecord, RecordEvent};
use std::collections::BTreeMap;
use std::fmt;

/// Outcome counts and failures gathered for one producer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProducerStats {
    pub implementation: Option<String>,
    pub outcomes: BTreeMap<Outcome, usize>,
    /// `local-name (outcome)` for every anomalous entry, in record order.
    pub anomalies: Vec<String>,
    pub failure: Option<String>,
}

/// Group records by producer, keeping the order producers first appear in.
pub fn summarize(records: &[ProbeRecord]) -> Vec<(String, ProducerStats)> {
    let mut order: Vec<String> = Vec::new();
    let mut stats: BTreeMap<String, ProducerStats> = BTreeMap::new();

    for record in records {
        if !stats.contains_key(&record.producer) {
            order.push(record.producer.clone());
        }
        let entry = stats.entry(record.producer.clone()).or_default();
        match record.event {
            RecordEvent::Started => entry.implementation = record.detail.clone(),
            RecordEvent::Observation => {
                let Some(outcome) = record.outcome else {
                    continue;
                };
                *entry.outcomes.entry(outcome).or_insert(0) += 1;
                if outcome.is_anomaly() {
                    let id = record
                        .id
                        .as_ref()
                        .map(|id| id.local_name().to_string())
                        .unwrap_or_default();
                    entry.anomalies.push(format!("{id} ({outcome})"));
                }
            }
            RecordEvent::Aborted => {
                entry.failure = Some(format!(
                    "aborted: {}",
                    record.detail.as_deref().unwrap_or("unknown error")
                ))
            }
            RecordEvent::Unavailable => {
                entry.failure = Some(format!(
                    "unavailable: {}",
                    record.detail.as_deref().unwrap_or("unknown error")
                ))
            }
        }
    }

    order
        .into_iter()
        .filter_map(|name| stats.remove(&name).map(|s| (name, s)))
        .collect()
}

pub fn render_summary(records: &[ProbeRecord], writer: &mut impl fmt::Write) -> fmt::Result {
    let producers = summarize(records);
    writeln!(writer, "probe summary")?;
    writeln!(writer, "=============")?;
    writeln!(writer, "producers: {}", producers.len())?;
    writeln!(writer)?;

    for (name, stats) in &producers {
        match &stats.implementation {
            Some(implementation) if implementation != name => {
                writeln!(writer, "{name} ({implementation})")?
            }
            _ => writeln!(writer, "{name}")?,
        }
        if let Some(failure) = &stats.failure {
            writeln!(writer, "  {failure}")?;
        }
        for outcome in Outcome::ALL {
            if let Some(count) = stats.outcomes.get(&outcome) {
                writeln!(writer, "  {:<26}{count}", outcome.as_str())?;
            }
        }
        for anomaly in &stats.anomalies {
            writeln!(writer, "  ! {anomaly}")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}
