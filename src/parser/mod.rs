//! Main XLSX parser
//!
//! Opens the workbook package, finds the requested worksheet through the
//! workbook relationships and flattens it into a [`ParsedGrid`].

mod relationships;
mod styles;
mod worksheet;

use std::io::Cursor;
use std::path::Path;
use zip::ZipArchive;

use crate::error::{Result, TableMasterError};
use crate::grid::{ParsedGrid, SpreadsheetParser};

use relationships::{get_sheet_info, parse_shared_strings, parse_workbook_relationships};
use styles::parse_cell_formats;
use worksheet::{parse_rows, SheetContext};

pub use worksheet::MAX_GRID_CELLS;

/// Compound File Binary signature used by legacy BIFF `.xls` workbooks.
const OLE2_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Reject inputs that are recognisably not an XLSX package before unzipping.
fn sniff_format(data: &[u8]) -> Result<()> {
    if data.starts_with(&OLE2_MAGIC) {
        return Err(TableMasterError::UnsupportedFormat(
            "legacy XLS (BIFF) workbooks cannot be read, re-save the file as .xlsx".to_string(),
        ));
    }
    if data.is_empty() {
        return Err(TableMasterError::Parse("file is empty".to_string()));
    }
    Ok(())
}

/// Parse the first worksheet of an XLSX file from bytes.
pub fn parse(data: &[u8]) -> Result<ParsedGrid> {
    parse_sheet(data, 0)
}

/// Parse the worksheet at `index` (tab order, 0-based) of an XLSX file from bytes.
pub fn parse_sheet(data: &[u8], index: usize) -> Result<ParsedGrid> {
    sniff_format(data)?;

    let mut archive = ZipArchive::new(Cursor::new(data))?;

    let relationships = parse_workbook_relationships(&mut archive);
    let workbook = get_sheet_info(&mut archive, &relationships.worksheets)?;
    let Some(info) = workbook.sheets.get(index) else {
        return Err(TableMasterError::Parse(format!(
            "workbook has {} sheet(s), no sheet at position {}",
            workbook.sheets.len(),
            index + 1
        )));
    };

    let shared_strings =
        parse_shared_strings(&mut archive, relationships.shared_strings.as_deref())?;
    let formats = parse_cell_formats(&mut archive, relationships.styles.as_deref())?;
    let ctx = SheetContext {
        shared_strings: &shared_strings,
        formats: &formats,
        date1904: workbook.date1904,
    };
    let rows = parse_rows(&mut archive, &info.path, &ctx, MAX_GRID_CELLS)?;

    log::debug!(
        "parsed sheet {:?}: {} rows, {} shared strings",
        info.name,
        rows.len(),
        shared_strings.len()
    );

    Ok(ParsedGrid::new(rows))
}

/// Read an XLSX file from disk and parse its first worksheet.
pub fn parse_file(path: &Path) -> Result<ParsedGrid> {
    let data = std::fs::read(path)?;
    parse(&data)
}

/// Names of the worksheets in tab order.
pub fn sheet_names(data: &[u8]) -> Result<Vec<String>> {
    sniff_format(data)?;
    let mut archive = ZipArchive::new(Cursor::new(data))?;
    let relationships = parse_workbook_relationships(&mut archive);
    let workbook = get_sheet_info(&mut archive, &relationships.worksheets)?;
    Ok(workbook.sheets.into_iter().map(|s| s.name).collect())
}

/// Disk-backed XLSX parser used by the table widget.
#[derive(Clone, Copy, Debug, Default)]
pub struct XlsxParser {
    /// Worksheet to read, in tab order.
    pub sheet_index: usize,
}

impl XlsxParser {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_sheet(mut self, index: usize) -> Self {
        self.sheet_index = index;
        self
    }
}

impl SpreadsheetParser for XlsxParser {
    fn parse(&self, path: &Path) -> Result<ParsedGrid> {
        let data = std::fs::read(path)?;
        parse_sheet(&data, self.sheet_index)
    }
}

/// Workbook bytes the host already holds in memory.
///
/// The path handed to [`SpreadsheetParser::parse`] is ignored; this is how a
/// host without a filesystem (the wasm build) feeds an upload to the widget.
#[derive(Clone, Debug)]
pub struct PreloadedWorkbook {
    data: Vec<u8>,
    sheet_index: usize,
}

impl PreloadedWorkbook {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            sheet_index: 0,
        }
    }

    #[must_use]
    pub fn with_sheet(mut self, index: usize) -> Self {
        self.sheet_index = index;
        self
    }
}

impl SpreadsheetParser for PreloadedWorkbook {
    fn parse(&self, _path: &Path) -> Result<ParsedGrid> {
        parse_sheet(&self.data, self.sheet_index)
    }
}
