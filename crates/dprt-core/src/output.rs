//! JSON and JSONL output for reduction records.
//!
//! JSONL records are written as they arrive so a long batch can be tailed;
//! JSON output is collected and written as one array by [`RecordWriter::finish`].

use serde::Serialize;
use std::io::{self, Write};

use crate::types::ReductionRecord;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON object or array
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Writes a stream of [`ReductionRecord`]s.
pub struct RecordWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    pending: Vec<ReductionRecord>,
    succeeded: usize,
    failed: usize,
}

impl<W: Write> RecordWriter<W> {
    /// `pretty` only affects JSON output; JSONL is always one line per record.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            pending: Vec::new(),
            succeeded: 0,
            failed: 0,
        }
    }

    /// Record one reduction.
    pub fn push(&mut self, record: ReductionRecord) -> io::Result<()> {
        if record.success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        match self.format {
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, &record).map_err(io::Error::other)?;
                writeln!(self.writer)?;
                self.writer.flush()
            }
            OutputFormat::Json => {
                self.pending.push(record);
                Ok(())
            }
        }
    }

    /// Write anything still buffered and return the underlying writer.
    ///
    /// A single JSON record is written as an object, several as an array.
    pub fn finish(mut self) -> io::Result<W> {
        if self.format == OutputFormat::Json {
            match self.pending.as_slice() {
                [] => {}
                [single] => write_json(&mut self.writer, single, self.pretty)?,
                records => write_json(&mut self.writer, records, self.pretty)?,
            }
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }
}

fn write_json<W: Write, T: Serialize + ?Sized>(writer: &mut W, item: &T, pretty: bool) -> io::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, item).map_err(io::Error::other)?;
    } else {
        serde_json::to_writer(&mut *writer, item).map_err(io::Error::other)?;
    }
    writeln!(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CalibrationResult, ReductionOutput, RequestKind};
    use std::path::PathBuf;

    fn record(name: &str, success: bool) -> ReductionRecord {
        ReductionRecord {
            input: PathBuf::from(name),
            success,
            error_number: if success { 0 } else { 1202 },
            error_string: (!success).then(|| "Wrong BITPIX 8 (expected 16)".to_string()),
            output: if success {
                ReductionOutput::Calibration(CalibrationResult {
                    mean_counts: 25.0,
                    peak_counts: 40.0,
                    output_filename: Some(name.to_string()),
                })
            } else {
                ReductionOutput::zeroed(RequestKind::Calibration)
            },
        }
    }

    #[test]
    fn test_jsonl_streams_each_record() {
        let mut writer = RecordWriter::new(Vec::new(), OutputFormat::JsonLines, true);
        writer.push(record("a.fits", true)).unwrap();
        writer.push(record("b.fits", false)).unwrap();
        assert_eq!((writer.succeeded(), writer.failed()), (1, 1));

        let output = String::from_utf8(writer.finish().unwrap()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["error_number"], 1202);
        assert_eq!(second["output"]["kind"], "calibration");
    }

    #[test]
    fn test_json_single_record_is_object() {
        let mut writer = RecordWriter::new(Vec::new(), OutputFormat::Json, false);
        writer.push(record("a.fits", true)).unwrap();
        let output = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert!(output.starts_with('{'));
        assert!(output.contains("\"mean_counts\":25.0"));
    }

    #[test]
    fn test_json_many_records_is_array() {
        let mut writer = RecordWriter::new(Vec::new(), OutputFormat::Json, true);
        writer.push(record("a.fits", true)).unwrap();
        writer.push(record("b.fits", true)).unwrap();
        let output = String::from_utf8(writer.finish().unwrap()).unwrap();
        let parsed: Vec<ReductionRecord> = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_json_nothing_written_when_empty() {
        let writer = RecordWriter::new(Vec::new(), OutputFormat::Json, false);
        assert!(writer.finish().unwrap().is_empty());
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("jsonl"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("NDJSON"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("xml"), None);
    }
}
