use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::engine::EngineOutput;
use crate::errors::Result;
use crate::position::PositionReport;
use crate::report::AlertReport;

/// Trait for output handlers
pub trait OutputHandler: Send {
    /// Handle a resolved aircraft position
    fn handle_position(&mut self, report: &PositionReport) -> Result<()>;

    /// Handle an alert report. Handlers that only record positions ignore it.
    fn handle_alert(&mut self, _report: &AlertReport) -> Result<()> {
        Ok(())
    }

    fn flush(&mut self) -> Result<()>;
}

/// Feed one pass to a handler: positions first, then alerts
pub fn write_output(handler: &mut dyn OutputHandler, output: &EngineOutput) -> Result<()> {
    for position in &output.positions {
        handler.handle_position(position)?;
    }
    for alert in &output.alerts {
        handler.handle_alert(alert)?;
    }
    handler.flush()
}

/// One line of JSON output
#[derive(Serialize)]
#[serde(tag = "record", rename_all = "lowercase")]
enum Record<'a> {
    Position(&'a PositionReport),
    Alert(&'a AlertReport),
}

/// JSON lines output, one record per line
pub struct JsonOutput<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonOutput<W> {
    pub fn new(writer: W) -> Self {
        JsonOutput { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_record(&mut self, record: &Record) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl JsonOutput<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Ok(JsonOutput::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write + Send> OutputHandler for JsonOutput<W> {
    fn handle_position(&mut self, report: &PositionReport) -> Result<()> {
        self.write_record(&Record::Position(report))
    }

    fn handle_alert(&mut self, report: &AlertReport) -> Result<()> {
        self.write_record(&Record::Alert(report))
    }

    fn flush(&mut self) -> Result<()> {
        Ok(self.writer.flush()?)
    }
}

const CSV_HEADER: &str = "time,aircraft_id,lat,lon,alt_m,quality,num_receivers";

/// CSV format output, positions only. Appends to an existing file.
pub struct CsvOutput {
    writer: BufWriter<File>,
}

impl CsvOutput {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let empty = file.metadata()?.len() == 0;
        let mut writer = BufWriter::new(file);
        if empty {
            writeln!(writer, "{}", CSV_HEADER)?;
        }
        Ok(CsvOutput { writer })
    }

    /// Report time (ms since the epoch) as UTC, empty when out of range
    fn format_time(timestamp_ms: f64) -> String {
        chrono::DateTime::from_timestamp_millis(timestamp_ms as i64)
            .map(|t| t.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
            .unwrap_or_default()
    }
}

impl OutputHandler for CsvOutput {
    fn handle_position(&mut self, report: &PositionReport) -> Result<()> {
        writeln!(
            self.writer,
            "{},{},{:.5},{:.5},{:.0},{:.0},{}",
            Self::format_time(report.timestamp),
            report.aircraft_id,
            report.lat,
            report.lon,
            report.alt,
            report.quality,
            report.num_receivers
        )?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(self.writer.flush()?)
    }
}
