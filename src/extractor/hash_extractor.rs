use crate::config::{ExportConfig, DEFAULT_TABLE};
use crate::error::{NsrlError, Result};
use crate::extractor::database::NsrlDatabase;
use crate::extractor::hash_writer::HashWriter;
use crate::extractor::report::{DatabaseSummary, ExtractionReport};
use chrono::Utc;
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct ExtractionProgress {
    pub databases_processed: usize,
    pub total_databases: usize,
    pub current_database: Option<String>,
    pub current_rows: u64,
    pub hashes_written: u64,
    pub start_time: Instant,
}

impl ExtractionProgress {
    pub fn new(total_databases: usize) -> Self {
        Self {
            databases_processed: 0,
            total_databases,
            current_database: None,
            current_rows: 0,
            hashes_written: 0,
            start_time: Instant::now(),
        }
    }

    fn start_database(&mut self, name: String) {
        self.current_database = Some(name);
        self.current_rows = 0;
    }

    fn finish_database(&mut self) {
        self.databases_processed += 1;
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Copies one hash column out of a batch of NSRL databases into a text file.
///
/// Databases are processed strictly in the order given, one open connection
/// at a time. The first failure aborts the batch; whatever was written for
/// earlier databases is flushed and left in place.
pub struct HashExtractor {
    table: String,
    buffer_size: usize,
    progress_interval: u64,
}

impl HashExtractor {
    pub fn new() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            buffer_size: 64 * 1024, // 64KB buffer
            progress_interval: 10_000,
        }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new()
            .with_table(config.table.clone())
            .with_buffer_size(config.buffer_size)
            .with_progress_interval(config.progress_interval)
    }

    pub fn with_table<S: Into<String>>(mut self, table: S) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(4096); // Minimum 4KB buffer
        self
    }

    pub fn with_progress_interval(mut self, rows: u64) -> Self {
        self.progress_interval = rows.max(1);
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn extract<P: AsRef<Path>>(
        &self,
        sources: &[P],
        output: &Path,
        hash_type: &str,
        progress_callback: Option<&dyn Fn(&ExtractionProgress)>,
    ) -> Result<ExtractionReport> {
        if sources.is_empty() {
            return Err(NsrlError::NoInputSelected);
        }

        let started_at = Utc::now();
        let mut progress = ExtractionProgress::new(sources.len());
        let mut databases = Vec::with_capacity(sources.len());

        let mut writer = HashWriter::create(output, self.buffer_size)?;
        log::info!(
            "Extracting {} hashes from {} database(s) into {}",
            hash_type,
            sources.len(),
            output.display()
        );

        let outcome = sources.iter().try_for_each(|source| -> Result<()> {
            let summary = self.extract_database(
                source.as_ref(),
                hash_type,
                &mut writer,
                &mut progress,
                progress_callback,
            )?;
            databases.push(summary);
            Ok(())
        });

        // Flush before reporting so earlier databases survive a failure.
        let finished = writer.finish();
        outcome?;
        let total_hashes = finished?;

        Ok(ExtractionReport {
            output_path: output.to_path_buf(),
            hash_type: hash_type.to_string(),
            table: self.table.clone(),
            databases,
            total_hashes,
            started_at,
            duration: progress.elapsed(),
        })
    }

    fn extract_database(
        &self,
        path: &Path,
        hash_type: &str,
        writer: &mut HashWriter,
        progress: &mut ExtractionProgress,
        progress_callback: Option<&dyn Fn(&ExtractionProgress)>,
    ) -> Result<DatabaseSummary> {
        let database = NsrlDatabase::open(path)?;
        let column = database.resolve_column(&self.table, hash_type)?;
        log::debug!(
            "Resolved {} to column {:?} ({}) in {}",
            hash_type,
            column.name,
            column.declared_type,
            path.display()
        );

        let mut summary = DatabaseSummary::new(path, &column.name);
        progress.start_database(summary.display_name());
        if let Some(callback) = progress_callback {
            callback(progress);
        }

        let interval = self.progress_interval;
        let lines_before = writer.lines_written();
        database.for_each_value(&self.table, &column.name, |value| {
            summary.rows_scanned += 1;
            progress.current_rows += 1;

            match value.map(str::trim) {
                Some(hash) if !hash.is_empty() => {
                    writer.write_hash(hash)?;
                    progress.hashes_written += 1;
                }
                _ => summary.rows_skipped += 1,
            }

            if summary.rows_scanned % interval == 0 {
                if let Some(callback) = progress_callback {
                    callback(progress);
                }
            }
            Ok(())
        })?;
        summary.hashes_written = writer.lines_written() - lines_before;

        database.close()?;

        progress.finish_database();
        if let Some(callback) = progress_callback {
            callback(progress);
        }

        log::info!(
            "{}: {} hashes written, {} rows skipped",
            path.display(),
            summary.hashes_written,
            summary.rows_skipped
        );

        Ok(summary)
    }
}

impl Default for HashExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts `hash_type` values from `db_paths` into `output_path` using default settings.
pub fn extract_hashes<P: AsRef<Path>>(
    db_paths: &[P],
    output_path: &Path,
    hash_type: &str,
) -> Result<ExtractionReport> {
    HashExtractor::new().extract(db_paths, output_path, hash_type, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use std::cell::RefCell;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_nsrl_db(dir: &Path, name: &str, column: &str, values: &[Option<&str>]) -> PathBuf {
        let path = dir.join(name);
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(&format!(
            "CREATE TABLE NSRLFile (\"{}\" VARCHAR, FileName VARCHAR);",
            column
        ))
        .unwrap();

        for (index, value) in values.iter().enumerate() {
            conn.execute(
                &format!("INSERT INTO NSRLFile (\"{}\", FileName) VALUES (?1, ?2)", column),
                rusqlite::params![value, format!("file{}.bin", index)],
            )
            .unwrap();
        }

        path
    }

    #[test]
    fn test_single_database_skips_empty_values() {
        let temp_dir = TempDir::new().unwrap();
        let db = create_nsrl_db(
            temp_dir.path(),
            "rds.db",
            "MD5",
            &[Some("AAAA"), Some(""), Some("BBBB")],
        );
        let output = temp_dir.path().join("hashes.txt");

        let report = extract_hashes(&[&db], &output, "md5").unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), "AAAA\nBBBB\n");
        assert_eq!(report.total_hashes, 2);
        assert_eq!(report.databases[0].column, "MD5");
        assert_eq!(report.databases[0].rows_scanned, 3);
        assert_eq!(report.databases[0].rows_skipped, 1);
    }

    #[test]
    fn test_multiple_databases_concatenate_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let first = create_nsrl_db(temp_dir.path(), "first.db", "SHA-1", &[Some("1111")]);
        let second = create_nsrl_db(
            temp_dir.path(),
            "second.db",
            "SHA-1",
            &[Some("2222"), Some("3333")],
        );
        let output = temp_dir.path().join("hashes.txt");

        let report = extract_hashes(&[first, second], &output, "sha1").unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), "1111\n2222\n3333\n");
        assert_eq!(report.databases.len(), 2);
        assert_eq!(report.total_hashes, 3);
    }

    #[test]
    fn test_values_are_trimmed_and_blank_rows_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let db = create_nsrl_db(
            temp_dir.path(),
            "rds.db",
            "MD5",
            &[Some("  AAAA\t"), None, Some("   "), Some("BBBB\r\n")],
        );
        let output = temp_dir.path().join("hashes.txt");

        extract_hashes(&[&db], &output, "md5").unwrap();

        let content = fs::read_to_string(&output).unwrap();
        assert_eq!(content, "AAAA\nBBBB\n");
        assert!(!content.lines().any(|line| line.is_empty()));
    }

    #[test]
    fn test_duplicates_across_databases_are_kept() {
        let temp_dir = TempDir::new().unwrap();
        let first = create_nsrl_db(temp_dir.path(), "a.db", "MD5", &[Some("DUP")]);
        let second = create_nsrl_db(temp_dir.path(), "b.db", "MD5", &[Some("DUP")]);
        let output = temp_dir.path().join("hashes.txt");

        extract_hashes(&[first, second], &output, "md5").unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), "DUP\nDUP\n");
    }

    #[test]
    fn test_missing_column_aborts_batch() {
        let temp_dir = TempDir::new().unwrap();
        let good = create_nsrl_db(temp_dir.path(), "good.db", "SHA-1", &[Some("1111")]);
        let bad = create_nsrl_db(temp_dir.path(), "bad.db", "MD5", &[Some("AAAA")]);
        let never = create_nsrl_db(temp_dir.path(), "never.db", "SHA-1", &[Some("9999")]);
        let output = temp_dir.path().join("hashes.txt");

        let result = extract_hashes(&[good, bad, never], &output, "sha1");

        match result {
            Err(NsrlError::ColumnNotFound { hash_type, .. }) => assert_eq!(hash_type, "sha1"),
            other => panic!("expected ColumnNotFound, got {:?}", other.map(|r| r.total_hashes)),
        }
        assert_eq!(fs::read_to_string(&output).unwrap(), "1111\n");
    }

    #[test]
    fn test_missing_column_message_names_hash_type() {
        let temp_dir = TempDir::new().unwrap();
        let db = create_nsrl_db(temp_dir.path(), "rds.db", "MD5", &[Some("AAAA")]);
        let output = temp_dir.path().join("hashes.txt");

        let error = extract_hashes(&[db], &output, "sha1").unwrap_err();
        assert!(error.to_string().contains("sha1"));
        assert_eq!(fs::read_to_string(&output).unwrap(), "");
    }

    #[test]
    fn test_empty_source_list_is_rejected_before_io() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("hashes.txt");
        let sources: Vec<PathBuf> = Vec::new();

        let result = extract_hashes(&sources, &output, "md5");

        assert!(matches!(result, Err(NsrlError::NoInputSelected)));
        assert!(!output.exists());
    }

    #[test]
    fn test_unreadable_source_aborts() {
        let temp_dir = TempDir::new().unwrap();
        let good = create_nsrl_db(temp_dir.path(), "good.db", "MD5", &[Some("AAAA")]);
        let missing = temp_dir.path().join("missing.db");
        let output = temp_dir.path().join("hashes.txt");

        let result = extract_hashes(&[good, missing], &output, "md5");

        assert!(matches!(result, Err(NsrlError::SourceNotFound { .. })));
        assert_eq!(fs::read_to_string(&output).unwrap(), "AAAA\n");
    }

    #[test]
    fn test_custom_table_name() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("modern.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE FILE (sha1 TEXT, md5 TEXT);
             INSERT INTO FILE VALUES ('S1', 'M1'), ('S2', 'M2');",
        )
        .unwrap();
        drop(conn);
        let output = temp_dir.path().join("hashes.txt");

        let extractor = HashExtractor::new().with_table("FILE");
        extractor.extract(&[&path], &output, "md5", None).unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), "M1\nM2\n");
    }

    #[test]
    fn test_progress_callback() {
        let temp_dir = TempDir::new().unwrap();
        let db = create_nsrl_db(
            temp_dir.path(),
            "rds.db",
            "MD5",
            &[Some("A"), Some("B"), Some("C"), Some("D")],
        );
        let output = temp_dir.path().join("hashes.txt");

        let updates = RefCell::new(Vec::new());
        let callback = |progress: &ExtractionProgress| {
            updates
                .borrow_mut()
                .push((progress.databases_processed, progress.current_rows));
        };

        let extractor = HashExtractor::new().with_progress_interval(2);
        extractor
            .extract(&[&db], &output, "md5", Some(&callback))
            .unwrap();

        assert_eq!(updates.into_inner(), vec![(0, 0), (0, 2), (0, 4), (1, 4)]);
    }

    #[test]
    fn test_extractor_from_config() {
        let mut config = ExportConfig::default();
        config.table = "FILE".to_string();
        config.buffer_size = 10;

        let extractor = HashExtractor::from_config(&config);
        assert_eq!(extractor.table(), "FILE");
        assert_eq!(extractor.buffer_size, 4096);
    }

    #[test]
    fn test_summaries_count_per_database() {
        let temp_dir = TempDir::new().unwrap();
        let first = create_nsrl_db(
            temp_dir.path(),
            "a.db",
            "MD5",
            &[Some("A1"), None, Some("A2")],
        );
        let second = create_nsrl_db(temp_dir.path(), "b.db", "MD5", &[Some("B1"), Some(" ")]);
        let output = temp_dir.path().join("hashes.txt");

        let report = extract_hashes(&[first, second], &output, "md5").unwrap();

        assert_eq!(report.databases[0].hashes_written, 2);
        assert_eq!(report.databases[0].rows_skipped, 1);
        assert_eq!(report.databases[1].hashes_written, 1);
        assert_eq!(report.databases[1].rows_skipped, 1);
        assert_eq!(report.total_hashes, 3);
    }
}
