use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "nsrl-extract")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract MD5 or SHA1 hash lists from NSRL reference databases")]
#[command(
    long_about = "nsrl-extract reads the file-record table of one or more NSRL reference \
                  databases and writes every MD5 or SHA1 value to a plain-text file, one hash per line."
)]
#[command(after_help = "EXAMPLES:\n  \
    nsrl-extract RDS_modern.db -o known_md5.txt\n  \
    nsrl-extract RDS_modern.db RDS_legacy.db --hash-type sha1 -o known_sha1\n  \
    nsrl-extract ./rds/ --hash-type sha1 --output-format json\n  \
    nsrl-extract RDS_android.db --table FILE --dry-run")]
pub struct Cli {
    /// NSRL database files, or directories containing them
    pub databases: Vec<PathBuf>,

    /// Output file (defaults to nsrl_<hash-type>.txt)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Hash column to extract
    #[arg(short = 't', long, value_enum)]
    pub hash_type: Option<HashType>,

    /// Name of the file-record table
    #[arg(long, help = "File-record table to read (default: NSRLFile)")]
    pub table: Option<String>,

    /// Database file extensions picked up from directories (comma-separated)
    #[arg(long, help = "Extensions treated as databases when scanning directories (e.g., db,sqlite)")]
    pub extensions: Option<String>,

    /// Maximum directory depth when scanning directories
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (resolve databases and columns without writing anything)
    #[arg(long, help = "Check every database and report what would be exported")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HashType {
    /// MD5 column
    Md5,
    /// SHA-1 column
    Sha1,
}

impl HashType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashType::Md5 => "md5",
            HashType::Sha1 => "sha1",
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_hash_type(self.hash_type.map(|h| h.as_str().to_string()))
            .with_table(self.table.clone())
            .with_extensions(self.extensions.clone())
            .with_max_depth(self.max_depth)
    }

    /// Output location after applying the default name and extension.
    pub fn resolve_output_path(&self, config: &Config) -> PathBuf {
        let path = self.output.clone().unwrap_or_else(|| {
            PathBuf::from(format!("nsrl_{}", config.export.hash_type.to_lowercase()))
        });

        normalize_output_path(&path, &config.export.default_extension)
    }

    /// Log level forced by -v/-q, or `None` to defer to `RUST_LOG`.
    pub fn log_level(&self) -> Option<log::LevelFilter> {
        if self.quiet {
            return Some(log::LevelFilter::Error);
        }

        match self.verbose {
            0 => None,
            1 => Some(log::LevelFilter::Info),
            2 => Some(log::LevelFilter::Debug),
            _ => Some(log::LevelFilter::Trace),
        }
    }
}

/// Appends `default_extension` when `path` has none.
pub fn normalize_output_path(path: &Path, default_extension: &str) -> PathBuf {
    let extension = default_extension.trim_start_matches('.');

    if path.extension().is_some() || extension.is_empty() {
        path.to_path_buf()
    } else {
        path.with_extension(extension)
    }
}
