use crate::error::{NsrlError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TABLE: &str = "NSRLFile";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub sources: SourceConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    pub extensions: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub max_depth: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    pub hash_type: String,
    pub table: String,
    pub default_extension: String,
    pub buffer_size: usize,
    pub progress_interval: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            extensions: vec![
                "db".to_string(),
                "sqlite".to_string(),
                "sqlite3".to_string(),
            ],
            exclude_patterns: vec![r".*-journal$".to_string(), r".*-wal$".to_string()],
            max_depth: 4,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            hash_type: "md5".to_string(),
            table: DEFAULT_TABLE.to_string(),
            default_extension: "txt".to_string(),
            buffer_size: 64 * 1024, // 64KB
            progress_interval: 10_000,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(NsrlError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| NsrlError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| NsrlError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["nsrl-extract.toml", ".nsrl-extract.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        log::debug!("Using configuration file {}", default_path);
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref hash_type) = cli_args.hash_type {
            self.export.hash_type = hash_type.clone();
        }

        if let Some(ref table) = cli_args.table {
            self.export.table = table.clone();
        }

        if let Some(ref extensions) = cli_args.extensions {
            self.sources.extensions = extensions
                .split(',')
                .map(|s| s.trim().trim_start_matches('.').to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(max_depth) = cli_args.max_depth {
            self.sources.max_depth = max_depth;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.export.hash_type.trim().is_empty() {
            return Err(NsrlError::Config {
                message: "Hash type must not be empty".to_string(),
            });
        }

        if self.export.table.trim().is_empty() {
            return Err(NsrlError::Config {
                message: "Table name must not be empty".to_string(),
            });
        }

        if self.export.buffer_size == 0 {
            return Err(NsrlError::Config {
                message: "Output buffer size must be greater than 0".to_string(),
            });
        }

        if self.export.progress_interval == 0 {
            return Err(NsrlError::Config {
                message: "Progress interval must be greater than 0".to_string(),
            });
        }

        if self.sources.max_depth == 0 {
            return Err(NsrlError::Config {
                message: "Maximum directory depth must be greater than 0".to_string(),
            });
        }

        for pattern in &self.sources.exclude_patterns {
            Regex::new(pattern)?;
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub hash_type: Option<String>,
    pub table: Option<String>,
    pub extensions: Option<String>,
    pub max_depth: Option<usize>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hash_type(mut self, hash_type: Option<String>) -> Self {
        self.hash_type = hash_type;
        self
    }

    pub fn with_table(mut self, table: Option<String>) -> Self {
        self.table = table;
        self
    }

    pub fn with_extensions(mut self, extensions: Option<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.export.hash_type, "md5");
        assert_eq!(config.export.table, "NSRLFile");
        assert_eq!(config.export.default_extension, "txt");
        assert!(config.sources.extensions.contains(&"db".to_string()));
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.export.table = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sources.exclude_patterns.push("(unclosed".to_string());
        assert!(matches!(config.validate(), Err(NsrlError::Config { .. })));
    }

    #[test]
    fn test_sample_config_loads_back() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", Config::create_sample_config()).unwrap();

        let loaded_config = Config::load_from_file(temp_file.path()).unwrap();
        let defaults = Config::default();
        assert_eq!(loaded_config.export.hash_type, defaults.export.hash_type);
        assert_eq!(loaded_config.export.buffer_size, defaults.export.buffer_size);
        assert_eq!(loaded_config.sources.extensions, defaults.sources.extensions);
    }

    #[test]
    fn test_malformed_config_reports_path() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[export\nhash_type = ").unwrap();

        match Config::load_from_file(temp_file.path()) {
            Err(NsrlError::Config { message }) => {
                assert!(message.contains(&temp_file.path().display().to_string()));
            }
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[export]\nhash_type = \"sha1\"").unwrap();

        let config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.export.hash_type, "sha1");
        assert_eq!(config.export.table, DEFAULT_TABLE);
        assert_eq!(config.sources.max_depth, 4);
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::load_from_file("/definitely/not/here.toml");
        assert!(matches!(result, Err(NsrlError::Config { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        let overrides = CliOverrides::new()
            .with_hash_type(Some("sha1".to_string()))
            .with_table(Some("FILE".to_string()))
            .with_extensions(Some(".DB, sqlite".to_string()))
            .with_max_depth(Some(1));

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.export.hash_type, "sha1");
        assert_eq!(config.export.table, "FILE");
        assert_eq!(config.sources.extensions, vec!["db", "sqlite"]);
        assert_eq!(config.sources.max_depth, 1);
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config();
        assert!(sample.contains("[sources]"));
        assert!(sample.contains("[export]"));
        assert!(sample.contains("NSRLFile"));
    }
}
