use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NsrlError {
    #[error("{hash_type} column not found in {table} table")]
    ColumnNotFound {
        hash_type: String,
        table: String,
        database: String,
    },

    #[error("No database selected")]
    NoInputSelected,

    #[error("Source database not found: {path}")]
    SourceNotFound { path: String },

    #[error("Database error in {path}: {message}")]
    Database {
        path: String,
        message: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },
}

impl NsrlError {
    /// Wrap a SQLite failure with the database it came from.
    pub fn database<P: AsRef<Path>>(path: P, source: rusqlite::Error) -> Self {
        NsrlError::Database {
            path: path.as_ref().display().to_string(),
            message: source.to_string(),
            source,
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for NsrlError {
    fn user_message(&self) -> String {
        match self {
            NsrlError::ColumnNotFound {
                hash_type,
                table,
                database,
            } => {
                format!(
                    "{} column not found in {} table of {}",
                    hash_type, table, database
                )
            }
            NsrlError::NoInputSelected => "No database selected".to_string(),
            NsrlError::SourceNotFound { path } => {
                format!("Source database does not exist: {}", path)
            }
            NsrlError::Database { path, message, .. } => {
                format!("Could not read database {}: {}", path, message)
            }
            NsrlError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            NsrlError::InvalidPath { path } => {
                format!("Invalid file path: {}", path)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            NsrlError::ColumnNotFound { .. } => Some(
                "Check that the file is an NSRL database and choose a hash type it provides (e.g., --hash-type md5).".to_string()
            ),
            NsrlError::NoInputSelected => Some(
                "Pass one or more NSRL database files (or a directory containing .db files) as arguments.".to_string()
            ),
            NsrlError::SourceNotFound { .. } => Some(
                "Verify the path and make sure the database file has been downloaded and unpacked.".to_string()
            ),
            NsrlError::Database { .. } => Some(
                "The file may be corrupt or not an SQLite database. Try re-downloading the NSRL release.".to_string()
            ),
            NsrlError::Io(_) => Some(
                "Ensure the output location is writable and the disk has enough free space.".to_string()
            ),
            NsrlError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<regex::Error> for NsrlError {
    fn from(error: regex::Error) -> Self {
        NsrlError::Config {
            message: format!("Invalid exclude pattern: {}", error),
        }
    }
}

pub type Result<T> = std::result::Result<T, NsrlError>;
