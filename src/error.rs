//! Structured error types for tablemaster.
//!
//! The `Display` text of every variant doubles as the user-facing diagnostic
//! that replaces a table when an upload cannot be read.

/// All errors that can occur while resolving or decoding a table source.
#[derive(Debug, thiserror::Error)]
pub enum TableMasterError {
    /// XML parsing error from quick-xml.
    #[error("XML parsing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings record could not be decoded.
    #[error("Invalid settings: {0}")]
    Json(#[from] serde_json::Error),

    /// The file is a spreadsheet format this crate cannot decode.
    #[error("Unsupported spreadsheet format: {0}")]
    UnsupportedFormat(String),

    /// The uploaded attachment could not be mapped to a readable file.
    #[error("Attachment error: {0}")]
    Attachment(String),

    /// Structurally invalid workbook content.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TableMasterError>;

impl From<TableMasterError> for wasm_bindgen::JsValue {
    fn from(e: TableMasterError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
