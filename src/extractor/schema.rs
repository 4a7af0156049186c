//! Column metadata for the file-record table of an NSRL database.
//!
//! NSRL releases name their hash columns after the algorithm, with or
//! without a hyphen (`MD5`, `SHA-1`, `sha1`). Lookup therefore compares
//! lower-cased, hyphen-stripped column names against the lower-cased
//! hash type.

use rusqlite::Connection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub declared_type: String,
}

impl ColumnInfo {
    pub fn new<N: Into<String>, T: Into<String>>(name: N, declared_type: T) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
        }
    }

    /// Lower-cased name with hyphens removed.
    pub fn normalized_name(&self) -> String {
        self.name.to_lowercase().replace('-', "")
    }
}

/// Returns the first column whose normalized name equals the lower-cased hash type.
pub fn resolve_hash_column<'a>(columns: &'a [ColumnInfo], hash_type: &str) -> Option<&'a ColumnInfo> {
    let wanted = hash_type.to_lowercase();
    columns
        .iter()
        .find(|column| column.normalized_name() == wanted)
}

/// Lists the columns of `table` in declaration order. A missing table yields an empty list.
pub fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<ColumnInfo>> {
    let mut stmt = conn.prepare("SELECT name, type FROM pragma_table_info(?1)")?;
    let rows = stmt.query_map([table], |row| {
        Ok(ColumnInfo {
            name: row.get(0)?,
            declared_type: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        })
    })?;

    rows.collect()
}

pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
