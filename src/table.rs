//! Table widget: a hand-authored two-column table or an uploaded spreadsheet.

use std::path::PathBuf;

use crate::error::TableMasterError;
use crate::grid::{ParsedGrid, SpreadsheetParser};
use crate::markup::{Markup, TextMode};
use crate::parser::XlsxParser;
use crate::settings::RenderOptions;

/// Class on the `<div>` wrapping every rendered table.
pub const TABLE_WRAPPER_CLASS: &str = "sh_table_master";

/// Upload extensions the widget hands to the parser.
pub const ALLOWED_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Shown in upload mode when no file, or a file of another type, is attached.
pub const UNSUPPORTED_FILE_MESSAGE: &str = "<div>Please upload either xlsx or xls file.</div>";

/// One title/description pair of the manual table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualRow {
    pub title: String,
    pub description: String,
}

impl ManualRow {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Where the table's content comes from for one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSource {
    Manual {
        heading_details: String,
        heading_data: String,
        rows: Vec<ManualRow>,
    },
    Upload {
        file_url: String,
        file_extension: String,
        local_path: Option<PathBuf>,
    },
}

impl TableSource {
    /// Upload source with the extension taken from the URL.
    pub fn upload(file_url: impl Into<String>, local_path: Option<PathBuf>) -> Self {
        let file_url = file_url.into();
        let file_extension = file_extension(&file_url).to_string();
        Self::Upload {
            file_url,
            file_extension,
            local_path,
        }
    }
}

/// Everything after the last `.` of the URL. A URL without a dot is returned
/// whole, which is never an allowed extension.
pub fn file_extension(url: &str) -> &str {
    url.rsplit('.').next().unwrap_or_default()
}

/// Exact, case-sensitive match against [`ALLOWED_EXTENSIONS`].
pub fn is_allowed_extension(extension: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&extension)
}

/// Render a parsed grid: row 0 as header cells, the rest as body rows.
///
/// An empty grid gives an empty table shell.
pub fn render_grid(grid: &ParsedGrid, text_mode: TextMode) -> String {
    let cells: usize = grid.rows.iter().map(Vec::len).sum();
    let mut m = Markup::with_capacity(text_mode, 96 + cells * 16);

    m.open_with("div", "class", TABLE_WRAPPER_CLASS)
        .open("table")
        .open("thead")
        .open("tr");
    for heading in grid.header().unwrap_or_default() {
        m.element("th", heading);
    }
    m.close("tr").close("thead").open("tbody");
    for row in grid.body() {
        m.open("tr");
        for value in row {
            m.element("td", value);
        }
        m.close("tr");
    }
    m.close("tbody").close("table").close("div");

    m.into_string()
}

/// Renders [`TableSource`]s with an injected spreadsheet parser.
#[derive(Debug, Clone)]
pub struct TableRenderer<P = XlsxParser> {
    parser: P,
    options: RenderOptions,
}

impl Default for TableRenderer<XlsxParser> {
    fn default() -> Self {
        Self::new(XlsxParser::default())
    }
}

impl<P: SpreadsheetParser> TableRenderer<P> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            options: RenderOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Render one source to an HTML fragment. Never fails: bad input becomes
    /// an empty string or a diagnostic in place of the table.
    pub fn render(&self, source: &TableSource) -> String {
        match source {
            TableSource::Manual {
                heading_details,
                heading_data,
                rows,
            } => self.render_manual(heading_details, heading_data, rows),
            TableSource::Upload {
                file_url,
                file_extension,
                local_path,
            } => self.render_upload(file_url, file_extension, local_path.as_ref()),
        }
    }

    fn render_manual(&self, heading_details: &str, heading_data: &str, rows: &[ManualRow]) -> String {
        if heading_details.is_empty() || heading_data.is_empty() {
            log::debug!("manual table skipped: a heading is empty");
            return String::new();
        }

        let mut m = Markup::new(self.options.text_mode);
        m.open_with("div", "class", TABLE_WRAPPER_CLASS)
            .open("table")
            .open("thead")
            .open("tr")
            .element("th", heading_details)
            .element("th", heading_data)
            .close("tr")
            .close("thead")
            .open("tbody");
        for row in rows {
            m.open("tr")
                .element("td", &row.title)
                .element("td", &row.description)
                .close("tr");
        }
        m.close("tbody").close("table").close("div");

        log::debug!("rendered manual table with {} rows", rows.len());
        m.into_string()
    }

    fn render_upload(&self, file_url: &str, extension: &str, local_path: Option<&PathBuf>) -> String {
        if !is_allowed_extension(extension) {
            if file_url.is_empty() {
                log::debug!("upload table: no file attached");
            } else {
                log::debug!("upload table: rejected extension {extension:?}");
            }
            return UNSUPPORTED_FILE_MESSAGE.to_string();
        }
        if file_url.is_empty() {
            return String::new();
        }

        let parsed = match local_path {
            Some(path) => self.parser.parse(path),
            None => Err(TableMasterError::Attachment(format!(
                "the file behind {file_url} could not be located"
            ))),
        };

        match parsed {
            Ok(grid) => {
                log::debug!("upload table: {} rows from {file_url}", grid.rows.len());
                render_grid(&grid, self.options.text_mode)
            }
            Err(err) => {
                log::warn!("upload table: {file_url}: {err}");
                let mut m = Markup::new(self.options.text_mode);
                m.text(&err.to_string());
                m.into_string()
            }
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::error::Result;
    use std::path::Path;
    use test_case::test_case;

    fn grid(rows: &[&[&str]]) -> ParsedGrid {
        rows.iter()
            .map(|r| r.iter().map(|c| (*c).to_string()).collect())
            .collect::<Vec<Vec<String>>>()
            .into()
    }

    fn never_called(_: &Path) -> Result<ParsedGrid> {
        panic!("parser must not run")
    }

    fn manual(details: &str, data: &str, rows: &[(&str, &str)]) -> TableSource {
        TableSource::Manual {
            heading_details: details.into(),
            heading_data: data.into(),
            rows: rows.iter().map(|(t, d)| ManualRow::new(*t, *d)).collect(),
        }
    }

    #[test_case("https://x.test/a.xlsx", "xlsx" ; "xlsx")]
    #[test_case("https://x.test/a.b.xls", "xls" ; "last dot wins")]
    #[test_case("https://x.test/a.XLSX", "XLSX" ; "case kept")]
    #[test_case("noextension", "noextension" ; "no dot")]
    #[test_case("", "" ; "empty")]
    fn test_file_extension(url: &str, expected: &str) {
        assert_eq!(file_extension(url), expected);
    }

    #[test_case("xlsx", true ; "xlsx")]
    #[test_case("xls", true ; "xls")]
    #[test_case("XLSX", false ; "uppercase")]
    #[test_case("csv", false ; "csv")]
    #[test_case("", false ; "empty")]
    fn test_allowed_extension(ext: &str, allowed: bool) {
        assert_eq!(is_allowed_extension(ext), allowed);
    }

    #[test]
    fn test_manual_table_markup() {
        let renderer = TableRenderer::new(never_called);
        let html = renderer.render(&manual(
            "Feature",
            "Detail",
            &[("Speed", "Fast"), ("Cost", "Low")],
        ));
        assert_eq!(
            html,
            "<div class=\"sh_table_master\"><table><thead><tr><th>Feature</th><th>Detail</th></tr></thead>\
             <tbody><tr><td>Speed</td><td>Fast</td></tr><tr><td>Cost</td><td>Low</td></tr></tbody></table></div>"
        );
    }

    #[test_case("", "Detail" ; "details missing")]
    #[test_case("Feature", "" ; "data missing")]
    #[test_case("", "" ; "both missing")]
    fn test_manual_without_headings_is_empty(details: &str, data: &str) {
        let renderer = TableRenderer::new(never_called);
        assert_eq!(renderer.render(&manual(details, data, &[("a", "b")])), "");
    }

    #[test]
    fn test_manual_with_no_rows_has_empty_body() {
        let renderer = TableRenderer::new(never_called);
        let html = renderer.render(&manual("A", "B", &[]));
        assert!(html.ends_with("</thead><tbody></tbody></table></div>"));
    }

    #[test]
    fn test_manual_text_is_escaped() {
        let renderer = TableRenderer::new(never_called);
        let html = renderer.render(&manual("A", "B", &[("<img src=x onerror=alert(1)>", "a & b")]));
        assert!(html.contains("<td>&lt;img src=x onerror=alert(1)&gt;</td>"));
        assert!(html.contains("<td>a &amp; b</td>"));
    }

    #[test]
    fn test_manual_trusted_text_is_verbatim() {
        let renderer = TableRenderer::new(never_called).with_options(RenderOptions::trusted());
        let html = renderer.render(&manual("A", "B", &[("<b>Speed</b>", "Fast")]));
        assert!(html.contains("<td><b>Speed</b></td>"));
    }

    #[test_case("https://x.test/data.csv" ; "csv")]
    #[test_case("https://x.test/data.XLSX" ; "uppercase")]
    #[test_case("" ; "nothing uploaded")]
    fn test_unsupported_upload_message(url: &str) {
        let renderer = TableRenderer::new(never_called);
        let source = TableSource::upload(url, Some(PathBuf::from("/tmp/whatever")));
        assert_eq!(renderer.render(&source), UNSUPPORTED_FILE_MESSAGE);
    }

    #[test]
    fn test_allowed_extension_with_empty_url_renders_nothing() {
        let renderer = TableRenderer::new(never_called);
        let source = TableSource::Upload {
            file_url: String::new(),
            file_extension: "xlsx".into(),
            local_path: None,
        };
        assert_eq!(renderer.render(&source), "");
    }

    #[test]
    fn test_upload_renders_grid() {
        let renderer = TableRenderer::new(|path: &Path| -> Result<ParsedGrid> {
            assert_eq!(path, Path::new("/uploads/q.xlsx"));
            Ok(grid(&[&["Name", "Qty"], &["Bolt", "4"], &["Nut"]]))
        });
        let html = renderer.render(&TableSource::upload(
            "https://x.test/q.xlsx",
            Some(PathBuf::from("/uploads/q.xlsx")),
        ));
        assert_eq!(
            html,
            "<div class=\"sh_table_master\"><table><thead><tr><th>Name</th><th>Qty</th></tr></thead>\
             <tbody><tr><td>Bolt</td><td>4</td></tr><tr><td>Nut</td></tr></tbody></table></div>"
        );
    }

    #[test]
    fn test_empty_grid_renders_shell() {
        let renderer = TableRenderer::new(|_: &Path| -> Result<ParsedGrid> { Ok(ParsedGrid::default()) });
        let html = renderer.render(&TableSource::upload(
            "https://x.test/q.xls",
            Some(PathBuf::from("/uploads/q.xls")),
        ));
        assert_eq!(
            html,
            "<div class=\"sh_table_master\"><table><thead><tr></tr></thead><tbody></tbody></table></div>"
        );
    }

    #[test]
    fn test_parse_failure_renders_diagnostic_only() {
        let renderer = TableRenderer::new(|_: &Path| -> Result<ParsedGrid> {
            Err(TableMasterError::Parse("sheet <1> is broken".into()))
        });
        let html = renderer.render(&TableSource::upload(
            "https://x.test/q.xlsx",
            Some(PathBuf::from("/uploads/q.xlsx")),
        ));
        assert_eq!(html, "Parse error: sheet &lt;1&gt; is broken");
    }

    #[test]
    fn test_unresolved_attachment_is_a_diagnostic() {
        let renderer = TableRenderer::new(never_called);
        let html = renderer.render(&TableSource::upload("https://x.test/q.xlsx", None));
        assert_eq!(
            html,
            "Attachment error: the file behind https://x.test/q.xlsx could not be located"
        );
    }

    #[test]
    fn test_render_grid_ragged_rows() {
        let g = grid(&[&["A"], &["1", "2", "3"], &[]]);
        let html = render_grid(&g, TextMode::Escaped);
        assert!(html.contains("<thead><tr><th>A</th></tr></thead>"));
        assert!(html.contains("<tr><td>1</td><td>2</td><td>3</td></tr><tr></tr>"));
    }

    #[test]
    fn test_render_is_repeatable() {
        let renderer = TableRenderer::new(|_: &Path| -> Result<ParsedGrid> { Ok(grid(&[&["h"], &["v"]])) });
        let source = TableSource::upload("https://x.test/q.xlsx", Some(PathBuf::from("q.xlsx")));
        assert_eq!(renderer.render(&source), renderer.render(&source));
    }
}
