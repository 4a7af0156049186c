pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, HashType, OutputFormat};
pub use config::{CliOverrides, Config, ExportConfig, SourceConfig};
pub use error::{NsrlError, Result, UserFriendlyError};

// Core functionality re-exports
pub use extractor::{
    extract_hashes, ColumnInfo, DatabaseSummary, ExtractionProgress, ExtractionReport,
    HashExtractor, NsrlDatabase,
};
pub use scanner::{DatabaseFile, SourceScanner};
pub use ui::{OutputFormatter, OutputMode, ProgressManager};

use std::path::{Path, PathBuf};

/// Column a database would be exported from, as found by a dry run.
#[derive(Debug, Clone)]
pub struct PlannedSource {
    pub database: DatabaseFile,
    pub column: ColumnInfo,
}

/// Main library interface: configuration, terminal output and the extractor.
pub struct NsrlExtract {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl NsrlExtract {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
        }
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(Self::new(
            config,
            output_mode,
            cli_args.verbose,
            cli_args.quiet,
        ))
    }

    /// Expands the user's inputs into the ordered database list.
    pub fn resolve_sources<P: AsRef<Path>>(&self, inputs: &[P]) -> Result<Vec<DatabaseFile>> {
        if inputs.is_empty() {
            return Err(NsrlError::NoInputSelected);
        }

        let scanner = SourceScanner::new(&self.config.sources)?;
        let databases = scanner.resolve(inputs)?;

        for database in &databases {
            self.output_formatter.debug(&format!(
                "{} ({})",
                database.path.display(),
                database.format_size()
            ));
        }

        Ok(databases)
    }

    /// Exports the configured hash column of every input database into `output`.
    pub fn export<P: AsRef<Path>>(&self, inputs: &[P], output: &Path) -> Result<ExtractionReport> {
        let databases = self.resolve_sources(inputs)?;
        let paths: Vec<PathBuf> = databases.iter().map(|d| d.path.clone()).collect();
        let hash_type = self.config.export.hash_type.as_str();

        self.output_formatter.start_operation(&format!(
            "Exporting {} hashes from {} database(s)",
            hash_type,
            paths.len()
        ));

        let export_progress = self
            .progress_manager
            .create_export_progress(paths.len() as u64);
        let progress_callback = {
            let pb = export_progress.clone();
            move |progress: &ExtractionProgress| {
                ui::progress::update_export_progress(&pb, progress);
            }
        };

        let extractor = HashExtractor::from_config(&self.config.export);
        let report = match extractor.extract(&paths, output, hash_type, Some(&progress_callback)) {
            Ok(report) => report,
            Err(e) => {
                export_progress.abandon();
                self.progress_manager.clear();
                return Err(e);
            }
        };

        ui::progress::finish_progress_with_summary(
            &export_progress,
            &format!("Wrote {} hashes", report.total_hashes),
            report.duration,
        );
        if report.total_hashes == 0 {
            self.output_formatter.warning(&format!(
                "No {} values found; {} is empty",
                hash_type,
                output.display()
            ));
        }
        self.output_formatter.success(&report.display_summary());

        Ok(report)
    }

    /// Opens every input and resolves its hash column without writing output.
    pub fn plan<P: AsRef<Path>>(&self, inputs: &[P]) -> Result<Vec<PlannedSource>> {
        let databases = self.resolve_sources(inputs)?;
        let hash_type = self.config.export.hash_type.as_str();
        let table = self.config.export.table.as_str();

        let spinner = self
            .progress_manager
            .create_spinner("Inspecting database schemas...");

        let mut planned = Vec::with_capacity(databases.len());
        for database in databases {
            let column = match inspect_database(&database.path, table, hash_type) {
                Ok(column) => column,
                Err(e) => {
                    spinner.abandon();
                    return Err(e);
                }
            };

            self.progress_manager.suspend(|| {
                self.output_formatter.debug(&format!(
                    "{}: {} -> column {:?}",
                    database.filename, hash_type, column.name
                ))
            });
            planned.push(PlannedSource { database, column });
        }

        spinner.finish_and_clear();
        Ok(planned)
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn progress_manager(&self) -> &ProgressManager {
        &self.progress_manager
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &NsrlError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

fn inspect_database(path: &Path, table: &str, hash_type: &str) -> Result<ColumnInfo> {
    let database = NsrlDatabase::open(path)?;
    let column = database.resolve_column(table, hash_type)?;
    database.close()?;
    Ok(column)
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
