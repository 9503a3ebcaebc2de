//! Cell formats from xl/styles.xml.
//!
//! Only number formats matter for a text table, and of those only whether a
//! format shows a date. Fonts, fills, borders and alignment are skipped.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{BufReader, Read, Seek};
use zip::ZipArchive;

use crate::error::Result;
use crate::numfmt::is_date_format_id;
use crate::xml_helpers::attr_string;

/// Per-`cellXfs` entry: does a cell with `s="<index>"` hold a date?
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(super) struct CellFormats {
    date_styles: Vec<bool>,
}

impl CellFormats {
    pub fn is_date(&self, style: u32) -> bool {
        self.date_styles
            .get(style as usize)
            .copied()
            .unwrap_or(false)
    }

    #[cfg(test)]
    pub fn from_flags(date_styles: Vec<bool>) -> Self {
        Self { date_styles }
    }
}

/// Read `numFmts` and `cellXfs` from the styles part.
///
/// A workbook without a styles part formats nothing as a date.
pub(super) fn parse_cell_formats<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: Option<&str>,
) -> Result<CellFormats> {
    let styles_path = path.unwrap_or("xl/styles.xml");
    let Ok(file) = archive.by_name(styles_path) else {
        return Ok(CellFormats::default());
    };

    let mut xml = Reader::from_reader(BufReader::new(file));
    xml.trim_text(true);

    let mut custom_formats: HashMap<u32, String> = HashMap::new();
    let mut xf_formats: Vec<u32> = Vec::new();
    let mut in_num_fmts = false;
    let mut in_cell_xfs = false;
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(ref event @ (Event::Start(ref e) | Event::Empty(ref e))) => {
                let is_start = matches!(event, Event::Start(_));
                match e.local_name().as_ref() {
                    b"numFmts" => in_num_fmts = is_start,
                    b"cellXfs" => in_cell_xfs = is_start,
                    b"numFmt" if in_num_fmts => {
                        let id = attr_string(e, b"numFmtId").and_then(|v| v.parse().ok());
                        let code = attr_string(e, b"formatCode");
                        if let (Some(id), Some(code)) = (id, code) {
                            custom_formats.insert(id, code);
                        }
                    }
                    b"xf" if in_cell_xfs => {
                        let id = attr_string(e, b"numFmtId")
                            .and_then(|v| v.parse().ok())
                            .unwrap_or(0);
                        xf_formats.push(id);
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"numFmts" => in_num_fmts = false,
                b"cellXfs" => in_cell_xfs = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    let date_styles = xf_formats
        .iter()
        .map(|id| is_date_format_id(*id, custom_formats.get(id).map(String::as_str)))
        .collect();

    Ok(CellFormats { date_styles })
}
