use std::io::{self, Write};

use serde::Serialize;

use crate::harvest::HarvestSummary;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::report::TopicsMapping;
use crate::scan::ScanSummary;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_scan(summary: &ScanSummary) -> io::Result<()> {
        Self::print_json(summary)
    }

    pub fn print_catalog(document: &TopicsMapping) -> io::Result<()> {
        Self::print_json(document)
    }

    pub fn print_harvest(summary: &HarvestSummary) -> io::Result<()> {
        Self::print_json(summary)
    }

    pub fn print_report(document: &TopicsMapping) -> io::Result<()> {
        Self::print_json(document)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

/// Progress chatter is suppressed in JSON mode; only the final document is
/// written to stdout.
impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}
