//! Utilities for parsing Excel-style cell references.

/// Number of rows in an XLSX worksheet.
pub const MAX_ROWS: u32 = 1_048_576;

/// Number of columns in an XLSX worksheet (`A` through `XFD`).
pub const MAX_COLS: u32 = 16_384;

/// Parse a cell reference like "A1" into (col, row) where col and row are 0-indexed.
pub fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    parse_cell_ref_bytes(cell_ref.trim().as_bytes())
}

/// Parse a cell reference from raw bytes (ASCII) into (col, row) where col and row are 0-indexed.
///
/// This is the bytes equivalent of [`parse_cell_ref`] for use when working with
/// raw XML attribute values (e.g., `attr.value` from quick-xml). Absolute markers
/// (`$B$7`) are accepted. References outside the sheet bounds, letters after
/// digits, and any other characters yield `None`.
pub fn parse_cell_ref_bytes(ref_bytes: &[u8]) -> Option<(u32, u32)> {
    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut saw_col = false;
    let mut saw_row = false;

    for &b in ref_bytes {
        if b == b'$' {
            continue;
        }
        if b.is_ascii_alphabetic() {
            if saw_row {
                return None;
            }
            let upper = b.to_ascii_uppercase();
            col = col
                .checked_mul(26)?
                .checked_add(u32::from(upper - b'A') + 1)?;
            saw_col = true;
        } else if b.is_ascii_digit() {
            row = row.checked_mul(10)?.checked_add(u32::from(b - b'0'))?;
            saw_row = true;
        } else {
            return None;
        }
    }

    if !saw_col || !saw_row || col == 0 || row == 0 || col > MAX_COLS || row > MAX_ROWS {
        return None;
    }

    Some((col - 1, row - 1))
}

/// Parse a 1-based row number (the `r` attribute of `<row>`) into a 0-indexed row.
pub fn parse_row_number(value: &[u8]) -> Option<u32> {
    let text = std::str::from_utf8(value).ok()?;
    let row: u32 = text.trim().parse().ok()?;
    if row == 0 || row > MAX_ROWS {
        return None;
    }
    Some(row - 1)
}

/// Convert a 0-indexed column into its letter name (`0` → `A`, `27` → `AB`).
pub fn column_name(col: u32) -> String {
    let mut letters = Vec::new();
    let mut n = col.saturating_add(1);
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + u8::try_from(rem).unwrap_or(0)));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}
