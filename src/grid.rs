//! Parsed spreadsheet grid and the parser contract the table widget consumes.

use std::path::Path;

use serde::Serialize;

use crate::error::Result;

/// Rows of cell text in sheet order.
///
/// When non-empty, `rows[0]` is the header row. Rows are not padded to a
/// common width.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ParsedGrid {
    pub rows: Vec<Vec<String>>,
}

impl ParsedGrid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The header row, if the grid has any rows.
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Every row after the header, in original order.
    pub fn body(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }
}

impl From<Vec<Vec<String>>> for ParsedGrid {
    fn from(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }
}

/// Turns a spreadsheet file into a [`ParsedGrid`].
///
/// The `Display` text of the error is shown to the page visitor in place of
/// the table.
pub trait SpreadsheetParser {
    fn parse(&self, path: &Path) -> Result<ParsedGrid>;
}

impl<F> SpreadsheetParser for F
where
    F: Fn(&Path) -> Result<ParsedGrid>,
{
    fn parse(&self, path: &Path) -> Result<ParsedGrid> {
        self(path)
    }
}
