//! Worksheet parsing - streams one sheet's `<sheetData>` into rows of text.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{BufReader, Read, Seek};
use zip::ZipArchive;

use super::styles::CellFormats;
use crate::cell_ref::{parse_cell_ref_bytes, parse_row_number, MAX_COLS};
use crate::error::{Result, TableMasterError};
use crate::numfmt::format_date_time;
use crate::xml_helpers::{attr_bytes, text_content};

/// Most grid slots (cells, including gap padding, plus rows) one sheet may
/// expand into. A few kilobytes of XML can reference `XFD1048576`.
pub const MAX_GRID_CELLS: usize = 1_000_000;

/// Workbook-wide lookups a cell value is resolved against.
#[derive(Debug)]
pub(super) struct SheetContext<'a> {
    pub shared_strings: &'a [String],
    pub formats: &'a CellFormats,
    pub date1904: bool,
}

/// Cell type tag from the `t` attribute of a `<c>` element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum CellTypeTag {
    Shared,
    Inline,
    Str,
    Bool,
    Error,
    Default,
}

pub(super) fn parse_cell_type_tag(value: &[u8]) -> CellTypeTag {
    match value {
        b"s" => CellTypeTag::Shared,
        b"b" => CellTypeTag::Bool,
        b"e" => CellTypeTag::Error,
        b"str" => CellTypeTag::Str,
        b"inlineStr" => CellTypeTag::Inline,
        _ => CellTypeTag::Default,
    }
}

pub(super) fn parse_u32_bytes(value: &[u8]) -> Option<u32> {
    let mut num: u32 = 0;
    let mut seen = false;
    for &b in value {
        if !b.is_ascii_digit() {
            return None;
        }
        seen = true;
        num = num.saturating_mul(10).saturating_add(u32::from(b - b'0'));
    }
    if seen {
        Some(num)
    } else {
        None
    }
}

/// Turn the stored text of a cell into what a reader of the sheet sees.
///
/// Numbers with a date or time format become `YYYY-MM-DD HH:MM:SS`; other
/// numbers keep the digits as stored.
pub(super) fn resolve_cell_value(
    raw: &str,
    tag: CellTypeTag,
    style: u32,
    ctx: &SheetContext<'_>,
) -> String {
    match tag {
        CellTypeTag::Shared => parse_u32_bytes(raw.trim().as_bytes())
            .and_then(|idx| ctx.shared_strings.get(idx as usize))
            .cloned()
            .unwrap_or_default(),
        CellTypeTag::Default if ctx.formats.is_date(style) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(|serial| format_date_time(serial, ctx.date1904))
            .unwrap_or_else(|| raw.to_string()),
        CellTypeTag::Bool => match raw.trim() {
            "1" | "true" => "TRUE".to_string(),
            "0" | "false" => "FALSE".to_string(),
            other => other.to_string(),
        },
        CellTypeTag::Inline | CellTypeTag::Str | CellTypeTag::Error | CellTypeTag::Default => {
            raw.to_string()
        }
    }
}

/// A `<c>` element whose children are still being read.
struct PendingCell {
    col: u32,
    tag: CellTypeTag,
    style: u32,
    text: String,
    has_value: bool,
}

/// Rows under construction, with a cap on how far they may grow.
struct GridBuilder {
    rows: Vec<Vec<String>>,
    slots: usize,
    max_slots: usize,
}

impl GridBuilder {
    fn new(max_slots: usize) -> Self {
        Self {
            rows: Vec::new(),
            slots: 0,
            max_slots,
        }
    }

    fn reserve(&mut self, extra: usize, path: &str) -> Result<()> {
        match self.slots.checked_add(extra) {
            Some(total) if total <= self.max_slots => {
                self.slots = total;
                Ok(())
            }
            _ => Err(TableMasterError::Parse(format!(
                "{path} is too large to display (more than {} cells)",
                self.max_slots
            ))),
        }
    }

    fn start_row(&mut self, row: usize, path: &str) -> Result<()> {
        if row >= self.rows.len() {
            self.reserve(row + 1 - self.rows.len(), path)?;
            self.rows.resize_with(row + 1, Vec::new);
        }
        Ok(())
    }

    fn place(&mut self, row: usize, col: u32, value: String, path: &str) -> Result<()> {
        let col = col as usize;
        let len = match self.rows.get(row) {
            Some(cells) => cells.len(),
            None => return Ok(()),
        };
        if col >= len {
            self.reserve(col + 1 - len, path)?;
        }
        let Some(cells) = self.rows.get_mut(row) else {
            return Ok(());
        };
        if col >= cells.len() {
            cells.resize(col, String::new());
            cells.push(value);
        } else if let Some(slot) = cells.get_mut(col) {
            *slot = value;
        }
        Ok(())
    }
}

/// Parse a single worksheet into rows of cell text.
///
/// Rows are placed by their `r` attribute; skipped rows come back as empty
/// rows and skipped cells as empty strings. A row ends at its last cell that
/// carries a value. Growing past `max_cells` slots is a parse error.
#[allow(clippy::too_many_lines)]
pub(super) fn parse_rows<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
    ctx: &SheetContext<'_>,
    max_cells: usize,
) -> Result<Vec<Vec<String>>> {
    let file = archive.by_name(path)?;

    let mut xml = Reader::from_reader(BufReader::new(file));
    xml.trim_text(false);

    let mut grid = GridBuilder::new(max_cells);
    let mut buf = Vec::new();
    let mut current_row: Option<usize> = None;
    let mut next_col: u32 = 0;
    let mut pending: Option<PendingCell> = None;
    let mut capturing = false;
    let mut in_inline = false;
    let mut in_phonetic = false;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(ref event @ (Event::Start(_) | Event::Empty(_))) => {
                let (Event::Start(ref e) | Event::Empty(ref e)) = event else {
                    continue;
                };
                let is_start_event = matches!(event, Event::Start(_));

                match e.local_name().as_ref() {
                    b"row" => {
                        let row_idx = match attr_bytes(e, b"r") {
                            Some(r) => parse_row_number(&r).ok_or_else(|| {
                                TableMasterError::Parse(format!(
                                    "invalid row number {:?} in {path}",
                                    String::from_utf8_lossy(&r)
                                ))
                            })? as usize,
                            None => grid.rows.len(),
                        };
                        grid.start_row(row_idx, path)?;
                        current_row = Some(row_idx);
                        next_col = 0;
                    }
                    b"c" => {
                        let col = match attr_bytes(e, b"r") {
                            Some(r) => {
                                parse_cell_ref_bytes(&r).map(|(c, _)| c).ok_or_else(|| {
                                    TableMasterError::Parse(format!(
                                        "invalid cell reference {:?} in {path}",
                                        String::from_utf8_lossy(&r)
                                    ))
                                })?
                            }
                            None => next_col,
                        };
                        if col >= MAX_COLS {
                            return Err(TableMasterError::Parse(format!(
                                "cell beyond column limit in {path}"
                            )));
                        }
                        next_col = col.saturating_add(1);

                        if is_start_event {
                            let tag = attr_bytes(e, b"t")
                                .map_or(CellTypeTag::Default, |t| parse_cell_type_tag(&t));
                            let style = attr_bytes(e, b"s")
                                .and_then(|s| parse_u32_bytes(&s))
                                .unwrap_or(0);
                            pending = Some(PendingCell {
                                col,
                                tag,
                                style,
                                text: String::new(),
                                has_value: false,
                            });
                        }
                    }
                    b"v" if is_start_event && pending.is_some() && !in_inline => {
                        capturing = true;
                    }
                    b"is" if is_start_event && pending.is_some() => in_inline = true,
                    b"rPh" if is_start_event => in_phonetic = true,
                    b"t" if is_start_event && in_inline && !in_phonetic => {
                        capturing = true;
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref t)) if capturing => {
                if let Some(cell) = pending.as_mut() {
                    cell.text.push_str(&text_content(t));
                    cell.has_value = true;
                }
            }
            Ok(Event::CData(ref t)) if capturing => {
                if let Some(cell) = pending.as_mut() {
                    cell.text.push_str(&String::from_utf8_lossy(t));
                    cell.has_value = true;
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"v" | b"t" => capturing = false,
                b"rPh" => in_phonetic = false,
                b"is" => in_inline = false,
                b"c" => {
                    capturing = false;
                    in_inline = false;
                    if let (Some(cell), Some(row)) = (pending.take(), current_row) {
                        if cell.has_value {
                            let value = resolve_cell_value(&cell.text, cell.tag, cell.style, ctx);
                            grid.place(row, cell.col, value, path)?;
                        }
                    }
                }
                b"row" => current_row = None,
                b"sheetData" => break,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(grid.rows)
}
