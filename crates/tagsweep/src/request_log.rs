//! Failed-deletion log
//!
//! Each failed deletion is appended to a dated JSON Lines file in the
//! working directory and kept in memory for the end-of-run report.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tagsweep_common::LogEntry;
use tagsweep_common::defaults::LOG_FILE_PREFIX;
use tracing::{debug, warn};

/// Log file name for a run on `date`: `delete-log-data-YYYY-M-D.log`
pub fn log_file_name(date: NaiveDate) -> String {
    format!(
        "{LOG_FILE_PREFIX}-{}-{}-{}.log",
        date.year(),
        date.month(),
        date.day()
    )
}

/// Append-only record of failed deletions, cheap to clone and share
#[derive(Debug, Clone, Default)]
pub struct RequestLog {
    entries: Arc<Mutex<Vec<LogEntry>>>,
    file: Option<Arc<Mutex<File>>>,
    path: Option<PathBuf>,
}

impl RequestLog {
    /// Log kept only in memory
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Log that also appends to `path`, creating it if needed
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;

        debug!(path = %path.display(), "Opened failure log");
        Ok(Self {
            entries: Arc::default(),
            file: Some(Arc::new(Mutex::new(file))),
            path: Some(path.to_path_buf()),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Record a failure. File write errors are logged, not returned.
    pub fn record(&self, entry: LogEntry) {
        if let Some(file) = &self.file {
            match serde_json::to_string(&entry) {
                Ok(line) => {
                    let mut file = file.lock().unwrap_or_else(|p| p.into_inner());
                    if let Err(e) = writeln!(file, "{line}") {
                        warn!(error = %e, "Failed to write failure log entry");
                    }
                }
                Err(e) => warn!(error = %e, "Failed to serialize failure log entry"),
            }
        }
        self.entries
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(entry);
    }

    /// Entries recorded through this log during the run
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

/// Read every parseable entry from a JSON Lines log.
///
/// Unparseable lines are skipped with a warning.
pub fn read_log_entries(reader: impl BufRead) -> Result<Vec<LogEntry>> {
    let mut entries = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read log file")?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<LogEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!(line = number + 1, error = %e, "Skipping unparseable log line"),
        }
    }
    Ok(entries)
}

/// Read the log file at `path`
pub fn read_log_file(path: &Path) -> Result<Vec<LogEntry>> {
    let file = File::open(path).with_context(|| format!("Failed to open log file {}", path.display()))?;
    read_log_entries(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagsweep_common::ResourceType;

    #[test]
    fn test_log_file_name_is_unpadded() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(log_file_name(date), "delete-log-data-2026-3-7.log");

        let date = NaiveDate::from_ymd_opt(2026, 12, 25).unwrap();
        assert_eq!(log_file_name(date), "delete-log-data-2026-12-25.log");
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failures.log");

        let log = RequestLog::open(&path).unwrap();
        log.record(
            LogEntry::new(ResourceType::Ec2Subnet, "subnet-1".into())
                .with_aws_error("DependencyViolation", "in use"),
        );
        log.record(
            LogEntry::new(ResourceType::Ec2InternetGateway, "igw-1".into())
                .with_parent(ResourceType::Ec2Vpc, "vpc-1".into()),
        );

        let from_disk = read_log_file(&path).unwrap();
        assert_eq!(from_disk, log.entries());
        assert_eq!(from_disk.len(), 2);
        assert_eq!(from_disk[1].parent().map(|p| p.as_str()), Some("vpc-1"));
    }

    #[test]
    fn test_reopening_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failures.log");

        RequestLog::open(&path)
            .unwrap()
            .record(LogEntry::new(ResourceType::Ec2Vpc, "vpc-1".into()).with_err_msg("first"));
        let second = RequestLog::open(&path).unwrap();
        second.record(LogEntry::new(ResourceType::Ec2Vpc, "vpc-2".into()).with_err_msg("second"));

        assert_eq!(read_log_file(&path).unwrap().len(), 2);
        assert_eq!(second.entries().len(), 1);
    }

    #[test]
    fn test_unparseable_lines_skipped() {
        let input = "not json\n\n{\"TimeStamp\":\"2026-10-16T00:00:00Z\",\"ResourceType\":\"AWS::S3::Bucket\",\"ResourceName\":\"b\"}\n";
        let entries = read_log_entries(input.as_bytes()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].resource_type, ResourceType::S3Bucket);
    }

    #[test]
    fn test_in_memory_has_no_path() {
        let log = RequestLog::in_memory();
        log.record(LogEntry::new(ResourceType::Ec2Vpc, "vpc-1".into()));
        assert!(log.path().is_none());
        assert_eq!(log.entries().len(), 1);
    }
}
