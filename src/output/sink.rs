//! Partitioned CSV output
//!
//! Each destination file gets its own writer behind its own lock. The header
//! is written when the file is created and every row is flushed immediately,
//! so the files stay readable while the run is still going.

use super::record::{columns, PlaceRecord};
use super::stats::PipelineStats;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Output errors
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to open output file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Output flush failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output writer lock poisoned")]
    Poisoned,
}

/// Paths of the two output partitions for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub with_emails: PathBuf,
    pub without_emails: PathBuf,
}

impl OutputPaths {
    /// `{prefix}_{session}_with_emails.csv` and `{prefix}_{session}_without_emails.csv`
    pub fn for_session(directory: &Path, prefix: &str, session: &str) -> Self {
        Self {
            with_emails: directory.join(format!("{}_{}_with_emails.csv", prefix, session)),
            without_emails: directory.join(format!("{}_{}_without_emails.csv", prefix, session)),
        }
    }
}

/// An 8-character session id derived from the run start time
pub fn session_id(started_at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(started_at.to_rfc3339().as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..8].to_string()
}

/// Thread-safe, append-only writer for enriched records
pub struct ResultSink {
    with_email: Mutex<csv::Writer<File>>,
    without_email: Mutex<csv::Writer<File>>,
    paths: OutputPaths,
    stats: Arc<PipelineStats>,
}

impl ResultSink {
    /// Creates both files (truncating any previous content) and writes their headers
    pub fn create(paths: OutputPaths, stats: Arc<PipelineStats>) -> Result<Self, SinkError> {
        let with_email = open_with_header(&paths.with_emails)?;
        let without_email = open_with_header(&paths.without_emails)?;

        tracing::info!(
            with_emails = %paths.with_emails.display(),
            without_emails = %paths.without_emails.display(),
            "Output files created"
        );

        Ok(Self {
            with_email: Mutex::new(with_email),
            without_email: Mutex::new(without_email),
            paths,
            stats,
        })
    }

    /// Appends the record to the partition chosen by its email set, then counts it
    pub fn write(&self, record: &PlaceRecord) -> Result<(), SinkError> {
        let has_email = record.has_email();
        let destination = if has_email {
            &self.with_email
        } else {
            &self.without_email
        };

        {
            let mut writer = destination.lock().map_err(|_| SinkError::Poisoned)?;
            writer.write_record(record.to_row())?;
            writer.flush()?;
        }

        self.stats.record_written(has_email);
        Ok(())
    }

    pub fn paths(&self) -> &OutputPaths {
        &self.paths
    }

    pub fn stats(&self) -> &Arc<PipelineStats> {
        &self.stats
    }
}

fn open_with_header(path: &Path) -> Result<csv::Writer<File>, SinkError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| SinkError::Open {
                path: parent.display().to_string(),
                source,
            })?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|source| SinkError::Open {
            path: path.display().to_string(),
            source,
        })?;

    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    writer.write_record(columns())?;
    writer.flush()?;
    Ok(writer)
}
