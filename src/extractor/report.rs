use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Per-database outcome of an export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseSummary {
    pub path: PathBuf,
    pub column: String,
    pub rows_scanned: u64,
    pub hashes_written: u64,
    pub rows_skipped: u64,
}

impl DatabaseSummary {
    pub fn new<P: AsRef<Path>>(path: P, column: &str) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            column: column.to_string(),
            rows_scanned: 0,
            hashes_written: 0,
            rows_skipped: 0,
        }
    }

    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub output_path: PathBuf,
    pub hash_type: String,
    pub table: String,
    pub databases: Vec<DatabaseSummary>,
    pub total_hashes: u64,
    pub started_at: DateTime<Utc>,
    #[serde(rename = "duration_ms", with = "duration_ms")]
    pub duration: Duration,
}

impl ExtractionReport {
    pub fn total_rows_scanned(&self) -> u64 {
        self.databases.iter().map(|d| d.rows_scanned).sum()
    }

    pub fn total_rows_skipped(&self) -> u64 {
        self.databases.iter().map(|d| d.rows_skipped).sum()
    }

    pub fn display_summary(&self) -> String {
        format!(
            "{} {} hashes from {} database(s) written to {}",
            self.total_hashes,
            self.hash_type,
            self.databases.len(),
            self.output_path.display()
        )
    }
}

/// Durations travel as whole milliseconds.
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
