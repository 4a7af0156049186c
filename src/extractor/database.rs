use crate::error::{NsrlError, Result};
use crate::extractor::schema::{self, ColumnInfo};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Read-only handle on one NSRL reference database.
///
/// The connection is closed explicitly by [`NsrlDatabase::close`] on the
/// success path and by `Drop` on every other path.
pub struct NsrlDatabase {
    path: PathBuf,
    conn: Connection,
}

impl NsrlDatabase {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(NsrlError::SourceNotFound {
                path: path.display().to_string(),
            });
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| NsrlError::database(path, e))?;

        log::debug!("Opened database {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            conn,
        })
    }

    pub fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        schema::table_columns(&self.conn, table).map_err(|e| NsrlError::database(&self.path, e))
    }

    /// Resolves the column holding `hash_type` values in `table`.
    pub fn resolve_column(&self, table: &str, hash_type: &str) -> Result<ColumnInfo> {
        let columns = self.columns(table)?;

        schema::resolve_hash_column(&columns, hash_type)
            .cloned()
            .ok_or_else(|| NsrlError::ColumnNotFound {
                hash_type: hash_type.to_string(),
                table: table.to_string(),
                database: self.path.display().to_string(),
            })
    }

    /// Streams every value of `column` to `visit`, one row at a time.
    ///
    /// Values are passed stringified and untrimmed; `None` stands for SQL NULL.
    /// Returns the number of rows visited.
    pub fn for_each_value<F>(&self, table: &str, column: &str, mut visit: F) -> Result<u64>
    where
        F: FnMut(Option<&str>) -> Result<()>,
    {
        let sql = format!(
            "SELECT {} FROM {}",
            schema::quote_identifier(column),
            schema::quote_identifier(table)
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| NsrlError::database(&self.path, e))?;
        let mut rows = stmt
            .query([])
            .map_err(|e| NsrlError::database(&self.path, e))?;

        let mut visited = 0u64;
        while let Some(row) = rows.next().map_err(|e| NsrlError::database(&self.path, e))? {
            let value = row
                .get_ref(0)
                .map_err(|e| NsrlError::database(&self.path, e))?;
            let text = value_to_text(value);
            visit(text.as_deref())?;
            visited += 1;
        }

        Ok(visited)
    }

    pub fn close(self) -> Result<()> {
        let path = self.path;
        self.conn
            .close()
            .map_err(|(_, e)| NsrlError::database(&path, e))?;
        log::debug!("Closed database {}", path.display());
        Ok(())
    }
}

fn value_to_text(value: ValueRef<'_>) -> Option<Cow<'_, str>> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(Cow::Owned(i.to_string())),
        ValueRef::Real(f) => Some(Cow::Owned(format_real(f))),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Some(String::from_utf8_lossy(bytes)),
    }
}

// Whole reals keep a trailing ".0" so 1.0 is not written as the integer 1.
fn format_real(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
