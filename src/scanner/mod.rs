pub mod source_filter;
pub mod source_scanner;

pub use source_filter::SourceFilter;
pub use source_scanner::{DatabaseFile, SourceScanner};
