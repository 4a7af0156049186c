use crate::config::SourceConfig;
use crate::error::Result;
use regex::Regex;
use std::path::Path;

/// Decides which files found under a directory are treated as NSRL databases.
pub struct SourceFilter {
    extensions: Vec<String>,
    exclude_patterns: Vec<Regex>,
}

impl SourceFilter {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let exclude_patterns = config
            .exclude_patterns
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            extensions: config
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns,
        })
    }

    pub fn is_database_file(&self, path: &Path) -> bool {
        let has_extension = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext.to_lowercase()));

        has_extension && !self.matches_any_pattern(&path.to_string_lossy())
    }

    pub fn matches_any_pattern(&self, text: &str) -> bool {
        self.exclude_patterns
            .iter()
            .any(|pattern| pattern.is_match(text))
    }
}
