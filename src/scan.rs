use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::domain::{DatasetId, DatasetProbe, DiscoveryKind};
use crate::probe::{self, WonderClient};
use crate::progress::{ProgressEvent, ProgressSink};

/// Controls for one scan pass over the controller identifier space.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub start: u32,
    pub end: u32,
    /// Pause after every probe. WONDER rate-limits aggressive clients.
    pub delay: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            start: 1,
            end: 200,
            delay: Duration::from_millis(250),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub probed: usize,
    pub resolved: usize,
    pub errors: usize,
    pub dataset_map_path: String,
}

/// Probes every identifier in the configured range, in order. Each probe
/// yields exactly one row regardless of outcome, so the resulting map covers
/// the full range.
pub fn map_range(
    client: &dyn WonderClient,
    options: &ScanOptions,
    sink: &dyn ProgressSink,
) -> Vec<DatasetProbe> {
    let total = options.end - options.start + 1;
    let started = Instant::now();
    let mut rows = Vec::with_capacity(total as usize);
    for ordinal in options.start..=options.end {
        let id = DatasetId::from_ordinal(ordinal);
        let row = probe_dataset_row(client, &id, sink);
        if ordinal % 20 == 0 {
            sink.event(ProgressEvent::with_elapsed(
                format!("...progress {}/{}", ordinal - options.start + 1, total),
                started.elapsed(),
            ));
        }
        rows.push(row);
        thread::sleep(options.delay);
    }
    rows
}

fn probe_dataset_row(
    client: &dyn WonderClient,
    id: &DatasetId,
    sink: &dyn ProgressSink,
) -> DatasetProbe {
    let row = probe::probe_dataset(client, id);
    let discovery = row.discovery.to_string();
    let target = if row.final_url.is_empty() {
        "-"
    } else {
        row.final_url.as_str()
    };
    sink.event(ProgressEvent::message(format!(
        "{}: {discovery:>10}  {target}",
        row.id
    )));
    row
}

pub fn summarize(rows: &[DatasetProbe], dataset_map_path: String) -> ScanSummary {
    ScanSummary {
        probed: rows.len(),
        resolved: rows.iter().filter(|row| row.is_resolved()).count(),
        errors: rows
            .iter()
            .filter(|row| row.discovery == DiscoveryKind::Error)
            .count(),
        dataset_map_path,
    }
}
