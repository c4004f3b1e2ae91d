//src/error.rs

use thiserror::Error;

/// Errors that abort an extraction run.
///
/// Per-entry anomalies (missing optional properties, unexpected seed
/// reference types) are handled locally with defaults or warnings and never
/// surface here; only structural failures do.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed XML attribute: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error("unexpected end of document inside entry {0}")]
    TruncatedEntry(String),

    #[error("malformed taxonomy line {line}: {reason}")]
    Taxonomy { line: usize, reason: String },
}
