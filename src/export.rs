//! Snapshot export and re-import.
//!
//! JSON exports serialize the full snapshot as a nested document; CSV
//! exports flatten it into one record per address under a header row.
//! Sink failures surface as [`ExportError`] and leave the in-memory
//! snapshot untouched, so a failed export can simply be retried.

use crate::error::{ExportError, ExportResult};
use crate::probe::{ProbeResult, ProbeStatus, Snapshot};
use chrono::{DateTime, Utc};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::net::IpAddr;
use std::path::Path;
use tracing::info;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// Nested JSON document carrying every snapshot field.
    Json,
    /// One record per address with a header row.
    Csv,
}

impl Default for ExportFormat {
    fn default() -> Self {
        Self::Json
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(format!("unknown export format: {}", s)),
        }
    }
}

/// Column order of the tabular format.
pub const CSV_HEADER: [&str; 5] = ["address", "status", "response_time_ms", "timestamp", "detail"];

/// Write a snapshot to any sink in the given format.
pub fn write_snapshot<W: Write>(
    snapshot: &Snapshot,
    writer: W,
    format: ExportFormat,
) -> ExportResult<()> {
    match format {
        ExportFormat::Json => write_json(snapshot, writer),
        ExportFormat::Csv => write_csv(snapshot, writer),
    }
}

fn write_json<W: Write>(snapshot: &Snapshot, writer: W) -> ExportResult<()> {
    serde_json::to_writer_pretty(writer, snapshot)
        .map_err(|e| ExportError::Serialize(e.to_string()))
}

fn write_csv<W: Write>(snapshot: &Snapshot, writer: W) -> ExportResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(CSV_HEADER)?;

    for result in snapshot.results.values() {
        wtr.write_record([
            result.address.to_string(),
            result.status.to_string(),
            result
                .response_time_ms
                .map_or(String::new(), |t| t.to_string()),
            result.timestamp.to_rfc3339(),
            result.detail.clone().unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Export a snapshot to a file.
pub fn export_to_file(snapshot: &Snapshot, path: &Path, format: ExportFormat) -> ExportResult<()> {
    let file = File::create(path)?;
    write_snapshot(snapshot, BufWriter::new(file), format)?;
    info!("exported {} results to {}", snapshot.len(), path.display());
    Ok(())
}

/// Re-import probe results from a CSV export.
pub fn read_csv<R: Read>(reader: R) -> ExportResult<Vec<ProbeResult>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut results = Vec::new();

    for record in rdr.records() {
        let record = record?;

        let address: IpAddr = field(&record, 0)
            .parse()
            .map_err(|_| ExportError::InvalidRecord(format!("bad address: {}", field(&record, 0))))?;
        let status: ProbeStatus = field(&record, 1)
            .parse()
            .map_err(ExportError::InvalidRecord)?;
        let response_time_ms = match field(&record, 2) {
            "" => None,
            raw => Some(raw.parse::<f64>().map_err(|_| {
                ExportError::InvalidRecord(format!("bad response time: {}", raw))
            })?),
        };
        let timestamp = DateTime::parse_from_rfc3339(field(&record, 3))
            .map_err(|e| ExportError::InvalidRecord(format!("bad timestamp: {}", e)))?
            .with_timezone(&Utc);
        let detail = match field(&record, 4) {
            "" => None,
            raw => Some(raw.to_string()),
        };

        results.push(ProbeResult {
            address,
            status,
            response_time_ms,
            timestamp,
            detail,
        });
    }

    Ok(results)
}

fn field<'a>(record: &'a csv::StringRecord, index: usize) -> &'a str {
    record.get(index).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn snapshot() -> Snapshot {
        let results: Vec<ProbeResult> = vec![
            ProbeResult::new("10.0.0.2".parse().unwrap(), ProbeStatus::Online)
                .with_response_time(1.25)
                .with_detail(Some("64 bytes from 10.0.0.2".to_string())),
            ProbeResult::new("10.0.0.10".parse().unwrap(), ProbeStatus::Timeout)
                .with_detail(Some("probe exceeded 8s watchdog cutoff".to_string())),
        ];
        Snapshot {
            started_at: Utc::now(),
            duration_ms: 17,
            results: results.into_iter().map(|r| (r.address, r)).collect(),
        }
    }

    #[test]
    fn test_json_export_is_nested_and_complete() {
        let mut buf = Vec::new();
        write_snapshot(&snapshot(), &mut buf, ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert!(value["results"]["10.0.0.2"]["response_time_ms"].is_number());
        assert_eq!(value["results"]["10.0.0.10"]["status"], "timeout");
        assert!(value["started_at"].is_string());
    }

    #[test]
    fn test_csv_export_has_header_and_rows() {
        let mut buf = Vec::new();
        write_snapshot(&snapshot(), &mut buf, ExportFormat::Csv).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "address,status,response_time_ms,timestamp,detail"
        );
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn test_csv_roundtrip_preserves_key_fields() {
        let original = snapshot();
        let mut buf = Vec::new();
        write_snapshot(&original, &mut buf, ExportFormat::Csv).unwrap();

        let imported = read_csv(buf.as_slice()).unwrap();
        assert_eq!(imported.len(), original.len());

        for result in &imported {
            let source = original.get(&result.address).unwrap();
            assert_eq!(result.address, source.address);
            assert_eq!(result.status, source.status);
            assert_eq!(result.timestamp, source.timestamp);
            assert_eq!(result.response_time_ms, source.response_time_ms);
        }
    }

    #[test]
    fn test_csv_import_rejects_bad_record() {
        let data = "address,status,response_time_ms,timestamp,detail\n\
                    not-an-address,online,1.0,2026-01-01T00:00:00Z,\n";
        assert!(matches!(
            read_csv(data.as_bytes()),
            Err(ExportError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_export_to_unwritable_sink_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");

        let err = export_to_file(&snapshot(), &path, ExportFormat::Json).unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
    }

    #[test]
    fn test_export_to_file_writes_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = snapshot();

        for format in [ExportFormat::Json, ExportFormat::Csv] {
            let path = dir.path().join(format!("out.{}", format));
            export_to_file(&snapshot, &path, format).unwrap();
            assert!(std::fs::metadata(&path).unwrap().len() > 0);
        }
    }

    #[test]
    fn test_empty_snapshot_exports_header_only() {
        let empty = Snapshot {
            started_at: Utc::now(),
            duration_ms: 0,
            results: BTreeMap::new(),
        };
        let mut buf = Vec::new();
        write_snapshot(&empty, &mut buf, ExportFormat::Csv).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(text.lines().count(), 1);
    }
}
