pub mod database;
pub mod hash_extractor;
pub mod hash_writer;
pub mod report;
pub mod schema;

pub use database::NsrlDatabase;
pub use hash_extractor::{extract_hashes, ExtractionProgress, HashExtractor};
pub use hash_writer::HashWriter;
pub use report::{DatabaseSummary, ExtractionReport};
pub use schema::{resolve_hash_column, ColumnInfo};
