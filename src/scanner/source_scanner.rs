use crate::config::SourceConfig;
use crate::error::{NsrlError, Result};
use crate::scanner::source_filter::SourceFilter;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseFile {
    pub path: PathBuf,
    pub filename: String,
    pub size: u64,
}

impl DatabaseFile {
    pub fn new(path: PathBuf, size: u64) -> Self {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();

        Self {
            path,
            filename,
            size,
        }
    }

    pub fn format_size(&self) -> String {
        format_bytes(self.size)
    }
}

/// Turns user-supplied paths into the ordered list of databases to export.
///
/// Files are kept as given. Directories are expanded to the database files
/// beneath them, sorted by path.
pub struct SourceScanner {
    filter: SourceFilter,
    max_depth: usize,
}

impl SourceScanner {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        Ok(Self {
            filter: SourceFilter::new(config)?,
            max_depth: config.max_depth,
        })
    }

    pub fn resolve<P: AsRef<Path>>(&self, inputs: &[P]) -> Result<Vec<DatabaseFile>> {
        let mut databases = Vec::new();

        for input in inputs {
            let path = input.as_ref();

            if path.is_dir() {
                let found = self.scan_directory(path)?;
                if found.is_empty() {
                    log::warn!("No database files found in {}", path.display());
                }
                databases.extend(found);
            } else if path.is_file() {
                let size = path.metadata()?.len();
                databases.push(DatabaseFile::new(path.to_path_buf(), size));
            } else {
                return Err(NsrlError::SourceNotFound {
                    path: path.display().to_string(),
                });
            }
        }

        if databases.is_empty() {
            return Err(NsrlError::NoInputSelected);
        }

        Ok(databases)
    }

    pub fn scan_directory<P: AsRef<Path>>(&self, root: P) -> Result<Vec<DatabaseFile>> {
        let root_path = root.as_ref();

        if !root_path.is_dir() {
            return Err(NsrlError::InvalidPath {
                path: format!("{} is not a directory", root_path.display()),
            });
        }

        let walker = WalkDir::new(root_path)
            .max_depth(self.max_depth)
            .follow_links(false)
            .sort_by_file_name();

        let mut databases = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("Skipping unreadable entry: {}", err);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.filter.is_database_file(entry.path()) {
                continue;
            }

            let size = entry
                .metadata()
                .map_err(|e| NsrlError::Io(e.into()))?
                .len();
            databases.push(DatabaseFile::new(entry.into_path(), size));
        }

        databases.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(databases)
    }
}

pub(crate) fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn scanner() -> SourceScanner {
        SourceScanner::new(&SourceConfig::default()).unwrap()
    }

    #[test]
    fn test_explicit_files_keep_their_order() {
        let temp_dir = TempDir::new().unwrap();
        let b = temp_dir.path().join("b.db");
        let a = temp_dir.path().join("a.bin");
        fs::write(&b, "x").unwrap();
        fs::write(&a, "yy").unwrap();

        let databases = scanner().resolve(&[&b, &a]).unwrap();

        assert_eq!(databases.len(), 2);
        assert_eq!(databases[0].path, b);
        assert_eq!(databases[1].filename, "a.bin");
        assert_eq!(databases[1].size, 2);
    }

    #[test]
    fn test_directory_expansion_is_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("nested")).unwrap();
        fs::write(root.join("zeta.db"), "").unwrap();
        fs::write(root.join("alpha.sqlite"), "").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();
        fs::write(root.join("alpha.sqlite-wal"), "").unwrap();
        fs::write(root.join("nested").join("mid.db"), "").unwrap();

        let databases = scanner().resolve(&[root]).unwrap();
        let names: Vec<_> = databases
            .iter()
            .map(|d| d.path.strip_prefix(root).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            names,
            vec![
                PathBuf::from("alpha.sqlite"),
                PathBuf::from("nested").join("mid.db"),
                PathBuf::from("zeta.db"),
            ]
        );
    }

    #[test]
    fn test_max_depth_limits_directory_walk() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("one").join("two")).unwrap();
        fs::write(root.join("top.db"), "").unwrap();
        fs::write(root.join("one").join("two").join("deep.db"), "").unwrap();

        let config = SourceConfig {
            max_depth: 1,
            ..SourceConfig::default()
        };
        let scanner = SourceScanner::new(&config).unwrap();
        let databases = scanner.scan_directory(root).unwrap();

        assert_eq!(databases.len(), 1);
        assert_eq!(databases[0].filename, "top.db");
    }

    #[test]
    fn test_missing_input_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.db");

        let result = scanner().resolve(&[missing]);
        assert!(matches!(result, Err(NsrlError::SourceNotFound { .. })));
    }

    #[test]
    fn test_no_input_selected() {
        let inputs: Vec<PathBuf> = Vec::new();
        assert!(matches!(
            scanner().resolve(&inputs),
            Err(NsrlError::NoInputSelected)
        ));

        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            scanner().resolve(&[temp_dir.path()]),
            Err(NsrlError::NoInputSelected)
        ));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
        let file = DatabaseFile::new(PathBuf::from("rds.db"), 2 * 1024 * 1024);
        assert_eq!(file.format_size(), "2.0 MB");
    }
}
