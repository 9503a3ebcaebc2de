//! Common test utilities and assertion helpers.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use std::fs;
use std::path::{Path, PathBuf};

use tablemaster::ParsedGrid;

// Re-export fixtures for convenience
pub use super::fixtures::*;

/// Parse XLSX bytes, panicking with the error text on failure.
#[must_use]
pub fn parse_grid(data: &[u8]) -> ParsedGrid {
    tablemaster::parser::parse(data).unwrap_or_else(|e| panic!("parse failed: {e}"))
}

/// Build a grid from string literals.
#[must_use]
pub fn grid(rows: &[&[&str]]) -> ParsedGrid {
    rows.iter()
        .map(|r| r.iter().map(|c| (*c).to_string()).collect())
        .collect::<Vec<Vec<String>>>()
        .into()
}

/// Write `data` to `dir/relative`, creating parent directories.
pub fn write_upload(dir: &Path, relative: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, data).unwrap();
    path
}

/// Table settings for upload mode pointing at `url`.
#[must_use]
pub fn upload_settings(url: &str) -> String {
    serde_json::json!({
        "sh_tabe_or_file": "",
        "sh_file_upload_excel": { "url": url, "id": 17 }
    })
    .to_string()
}

/// Text of every `<th>` cell, in order.
#[must_use]
pub fn header_cells(html: &str) -> Vec<String> {
    cells_of(html, "th")
}

/// Text of every `<td>` cell, in order.
#[must_use]
pub fn body_cells(html: &str) -> Vec<String> {
    cells_of(html, "td")
}

fn cells_of(html: &str, tag: &str) -> Vec<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    html.split(open.as_str())
        .skip(1)
        .map(|rest| rest.split(close.as_str()).next().unwrap().to_string())
        .collect()
}

/// Assert the fragment has the table wrapper and balanced table tags.
pub fn assert_table_shell(html: &str) {
    assert!(
        html.starts_with(r#"<div class="sh_table_master"><table><thead>"#),
        "unexpected start: {html}"
    );
    assert!(
        html.ends_with("</tbody></table></div>"),
        "unexpected end: {html}"
    );
    for tag in ["tr", "th", "td"] {
        assert_eq!(
            html.matches(&format!("<{tag}>")).count(),
            html.matches(&format!("</{tag}>")).count(),
            "unbalanced <{tag}> in {html}"
        );
    }
}
