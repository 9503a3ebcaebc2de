//! tablemaster - page-builder widgets rendered to HTML
//!
//! Two stateless widgets, each turning a settings record into an HTML fragment:
//! - Table: a hand-authored heading/row table, or the first sheet of an
//!   uploaded XLSX workbook with row 1 as the header
//! - Navigation: an ordered list of `#anchor` links with optional labels
//!
//! Text from the settings and from spreadsheet cells is HTML-escaped unless the
//! host opts into [`TextMode::Trusted`].
//!
//! # Usage (Rust)
//!
//! ```
//! use tablemaster::{NavListRenderer, NavSettings};
//!
//! let settings = NavSettings::from_json(
//!     r##"{"sh_show_label": "yes", "sh_nav_list": [{"sh_nav_label": "Intro", "sh_nav_anchor": "intro"}]}"##,
//! ).unwrap();
//! let html = NavListRenderer::new().render(&settings.into_list());
//! assert_eq!(html, r##"<div class="table-master"><ul><li><a href="#intro">Intro</a></li></ul></div>"##);
//! ```
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { render_table_with_file, render_nav } from 'tablemaster';
//! await init();
//! container.innerHTML = render_table_with_file(JSON.stringify(settings), bytes);
//! ```

pub mod attachments;
pub mod cell_ref;
pub mod error;
pub mod grid;
pub mod markup;
pub mod nav;
pub mod numfmt;
pub mod parser;
pub mod settings;
pub mod table;
pub mod xml_helpers;

use std::path::PathBuf;

use wasm_bindgen::prelude::*;

pub use attachments::{AttachmentMap, AttachmentResolver, FileRef, UploadsDirResolver};
pub use error::{Result, TableMasterError};
pub use grid::{ParsedGrid, SpreadsheetParser};
pub use markup::TextMode;
pub use nav::{NavEntry, NavList, NavListRenderer};
pub use parser::{PreloadedWorkbook, XlsxParser};
pub use settings::{NavSettings, RenderOptions, TableSettings};
pub use table::{ManualRow, TableRenderer, TableSource};

/// Render the table widget from its settings JSON.
///
/// Upload mode has no file bytes to read here and renders the attachment
/// diagnostic; use [`render_table_with_file`] for uploads.
///
/// # Errors
/// Returns an error if the settings JSON cannot be decoded.
#[wasm_bindgen]
pub fn render_table(settings_json: &str) -> std::result::Result<String, JsValue> {
    let settings = TableSettings::from_json(settings_json)?;
    let no_files = |_: &FileRef| -> Option<PathBuf> { None };
    Ok(TableRenderer::default().render(&settings.into_source(&no_files)))
}

/// Render the table widget with the uploaded workbook's bytes.
///
/// # Errors
/// Returns an error if the settings JSON cannot be decoded. Workbook problems
/// are rendered as a diagnostic, not returned.
#[wasm_bindgen]
pub fn render_table_with_file(
    settings_json: &str,
    data: &[u8],
) -> std::result::Result<String, JsValue> {
    let settings = TableSettings::from_json(settings_json)?;
    let in_memory = |file: &FileRef| Some(PathBuf::from(&file.url));
    let renderer = TableRenderer::new(PreloadedWorkbook::new(data.to_vec()));
    Ok(renderer.render(&settings.into_source(&in_memory)))
}

/// Render the navigation widget from its settings JSON.
///
/// # Errors
/// Returns an error if the settings JSON cannot be decoded.
#[wasm_bindgen]
pub fn render_nav(settings_json: &str) -> std::result::Result<String, JsValue> {
    let settings = NavSettings::from_json(settings_json)?;
    Ok(NavListRenderer::new().render(&settings.into_list()))
}

/// Render the navigation widget from a settings object.
///
/// # Errors
/// Returns an error if the object does not have the settings shape.
#[wasm_bindgen]
pub fn render_nav_js(settings: JsValue) -> std::result::Result<String, JsValue> {
    let settings: NavSettings = serde_wasm_bindgen::from_value(settings)
        .map_err(|e| JsValue::from_str(&format!("Invalid settings: {e}")))?;
    Ok(NavListRenderer::new().render(&settings.into_list()))
}

/// Parse an XLSX file and return its first sheet's rows as a JSON string.
///
/// # Errors
/// Returns an error if the XLSX file is invalid or cannot be parsed.
#[wasm_bindgen]
pub fn parse_xlsx_grid(data: &[u8]) -> std::result::Result<String, JsValue> {
    let grid = parser::parse(data)?;

    serde_json::to_string(&grid)
        .map_err(|e| JsValue::from_str(&format!("JSON serialization error: {e}")))
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
