use crate::error::{NsrlError, UserFriendlyError};
use crate::extractor::ExtractionReport;
use crate::ui::progress::format_duration;
use crate::PlannedSource;
use console::{style, Emoji, StyledObject, Term};
use serde_json::json;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");

#[derive(Debug, Clone, Copy, PartialEq)]
enum Level {
    Operation,
    Success,
    Warning,
    Info,
    Debug,
    Error,
}

impl Level {
    fn min_verbosity(self) -> u8 {
        match self {
            Level::Info => 1,
            Level::Debug => 2,
            _ => 0,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Level::Operation => "STARTING",
            Level::Success => "SUCCESS",
            Level::Warning => "WARNING",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Error => "ERROR",
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Level::Operation => ">",
            Level::Success => "✓",
            Level::Warning => "!",
            Level::Info => "i",
            Level::Debug => "  DEBUG:",
            Level::Error => "✗",
        }
    }

    fn paint(self, message: &str) -> String {
        let styled: StyledObject<&str> = match self {
            Level::Operation => style(message).bold(),
            Level::Success => style(message).green().bold(),
            Level::Warning => style(message).yellow().bold(),
            Level::Info => style(message).cyan(),
            Level::Debug => style(message).dim(),
            Level::Error => style(message).red().bold(),
        };
        let emoji = match self {
            Level::Operation => ROCKET.to_string(),
            Level::Success => CHECKMARK.to_string(),
            Level::Warning => WARNING.to_string(),
            Level::Info => INFO.to_string(),
            Level::Debug => "  ".to_string(),
            Level::Error => CROSS.to_string(),
        };
        format!("{}{}", emoji, styled)
    }
}

/// Terminal output for the three `--output-format` modes.
///
/// In JSON mode stdout carries exactly one document (the report or the
/// export plan); every status line goes to stderr as a one-line object.
pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors =
            mode == OutputMode::Human && !quiet && Term::stdout().features().colors_supported();

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn start_operation(&self, message: &str) {
        self.emit(Level::Operation, message);
    }

    pub fn success(&self, message: &str) {
        self.emit(Level::Success, message);
    }

    pub fn warning(&self, message: &str) {
        self.emit(Level::Warning, message);
    }

    pub fn info(&self, message: &str) {
        self.emit(Level::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.emit(Level::Debug, message);
    }

    pub fn error(&self, message: &str) {
        self.emit(Level::Error, message);
    }

    pub fn print_user_friendly_error(&self, error: &NsrlError) {
        let suggestion = error.suggestion();

        if self.mode == OutputMode::Json {
            eprintln!(
                "{}",
                json!({
                    "type": "error",
                    "message": error.user_message(),
                    "suggestion": suggestion,
                })
            );
            return;
        }

        self.error(&error.user_message());
        if let Some(suggestion) = suggestion {
            match (self.mode, self.use_colors) {
                (OutputMode::Human, true) => eprintln!(
                    "{}{}",
                    INFO,
                    style(format!("Suggestion: {}", suggestion)).cyan()
                ),
                (OutputMode::Human, false) => eprintln!("Suggestion: {}", suggestion),
                _ => eprintln!("SUGGESTION: {}", suggestion),
            }
        }
    }

    pub fn print_extraction_report(&self, report: &ExtractionReport) {
        match self.mode {
            OutputMode::Human if !self.quiet => self.print_human_report(report),
            OutputMode::Human => {}
            OutputMode::Json => print_json_document(report),
            OutputMode::Plain => print_plain_report(report),
        }
    }

    /// Prints what a dry run found: one line per database and its column.
    pub fn print_export_plan(
        &self,
        hash_type: &str,
        table: &str,
        output: &Path,
        planned: &[PlannedSource],
    ) {
        if self.mode == OutputMode::Json {
            let databases: Vec<_> = planned
                .iter()
                .map(|source| {
                    json!({
                        "path": source.database.path,
                        "size": source.database.size,
                        "column": source.column.name,
                    })
                })
                .collect();
            print_json_document(&json!({
                "hash_type": hash_type,
                "table": table,
                "output_path": output,
                "databases": databases,
            }));
            return;
        }

        println!("  Hash type: {}", hash_type);
        println!("  Table: {}", table);
        println!("  Output: {}", output.display());
        for source in planned {
            println!(
                "  {} ({}) -> column {}",
                source.database.path.display(),
                source.database.format_size(),
                source.column.name
            );
        }
    }

    pub fn print_separator(&self) {
        if self.quiet || self.mode == OutputMode::Json {
            return;
        }

        if self.use_colors {
            println!("{}", style("─".repeat(60)).dim());
        } else {
            println!("{}", "-".repeat(60));
        }
    }

    fn should_show(&self, level: Level) -> bool {
        if level == Level::Error {
            return true;
        }
        !self.quiet && self.verbose_level >= level.min_verbosity()
    }

    fn emit(&self, level: Level, message: &str) {
        if !self.should_show(level) {
            return;
        }

        let line = match self.mode {
            OutputMode::Json => {
                eprintln!(
                    "{}",
                    json!({
                        "type": "message",
                        "level": level.tag().to_lowercase(),
                        "message": message,
                        "timestamp": chrono::Utc::now().to_rfc3339(),
                    })
                );
                return;
            }
            OutputMode::Human if self.use_colors => level.paint(message),
            OutputMode::Human => format!("{} {}", level.symbol(), message),
            OutputMode::Plain => format!("{}: {}", level.tag(), message),
        };

        if level == Level::Error {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    fn print_human_report(&self, report: &ExtractionReport) {
        println!();
        if self.use_colors {
            println!("{}", style("Export Report").bold().cyan());
        } else {
            println!("=== Export Report ===");
        }
        println!();

        println!("Hash type:  {}", report.hash_type);
        println!("Table:      {}", report.table);
        println!("Output:     {}", report.output_path.display());
        println!(
            "Started at: {}",
            report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!();

        for database in &report.databases {
            println!(
                "  {} [{}]: {} hashes, {} rows skipped",
                database.display_name(),
                database.column,
                self.highlight(database.hashes_written),
                database.rows_skipped
            );
        }

        println!();
        self.print_separator();
        println!("  Hashes written: {}", self.highlight(report.total_hashes));
        println!("  Rows scanned:   {}", report.total_rows_scanned());
        println!("  Time taken:     {}", format_duration(report.duration));
        self.print_separator();
    }

    fn highlight(&self, count: u64) -> String {
        if self.use_colors {
            style(count).cyan().bold().to_string()
        } else {
            count.to_string()
        }
    }
}

fn print_json_document<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(document) => println!("{}", document),
        Err(e) => eprintln!("{}", json!({ "type": "error", "message": e.to_string() })),
    }
}

fn print_plain_report(report: &ExtractionReport) {
    println!("REPORT: Export completed");
    println!("Hash type: {}", report.hash_type);
    println!("Output: {}", report.output_path.display());
    for database in &report.databases {
        println!(
            "Database: {} column={} written={} skipped={}",
            database.path.display(),
            database.column,
            database.hashes_written,
            database.rows_skipped
        );
    }
    println!("Hashes: {}", report.total_hashes);
    println!("Duration: {}", format_duration(report.duration));
}
