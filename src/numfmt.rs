//! Number format codes, as far as the table needs them.
//!
//! Cells are shown as stored text, except numbers whose format is a date or
//! time: those hold an Excel serial day count and are written out as
//! `YYYY-MM-DD HH:MM:SS`.

/// First serial past 9999-12-31, the last date Excel shows.
const MAX_SERIAL: f64 = 2_958_466.0;

const SECONDS_PER_DAY: i64 = 86_400;

/// Built-in number format IDs (0-49 are predefined by Excel)
/// See: ECMA-376 Part 1, Section 18.8.30
pub const fn get_builtin_format(id: u32) -> Option<&'static str> {
    match id {
        0 => Some("General"),
        1 => Some("0"),
        2 => Some("0.00"),
        3 => Some("#,##0"),
        4 => Some("#,##0.00"),
        5 => Some("$#,##0_);($#,##0)"),
        6 => Some("$#,##0_);[Red]($#,##0)"),
        7 => Some("$#,##0.00_);($#,##0.00)"),
        8 => Some("$#,##0.00_);[Red]($#,##0.00)"),
        9 => Some("0%"),
        10 => Some("0.00%"),
        11 => Some("0.00E+00"),
        12 => Some("# ?/?"),
        13 => Some("# ??/??"),
        14 => Some("mm-dd-yy"),
        15 => Some("d-mmm-yy"),
        16 => Some("d-mmm"),
        17 => Some("mmm-yy"),
        18 => Some("h:mm AM/PM"),
        19 => Some("h:mm:ss AM/PM"),
        20 => Some("h:mm"),
        21 => Some("h:mm:ss"),
        22 => Some("m/d/yy h:mm"),
        37 => Some("#,##0 ;(#,##0)"),
        38 => Some("#,##0 ;[Red](#,##0)"),
        39 => Some("#,##0.00;(#,##0.00)"),
        40 => Some("#,##0.00;[Red](#,##0.00)"),
        45 => Some("mm:ss"),
        46 => Some("[h]:mm:ss"),
        47 => Some("mmss.0"),
        48 => Some("##0.0E+0"),
        49 => Some("@"),
        _ => None,
    }
}

/// Locale-dependent built-in IDs that Excel reserves for dates and times
/// (East Asian calendars). Their codes are not stored in the file.
const fn is_locale_date_id(id: u32) -> bool {
    matches!(id, 27..=36 | 50..=58)
}

/// Check if a format code is a date/time format
pub fn is_date_format(format_code: &str) -> bool {
    let lower = format_code.to_lowercase();

    // Drop quoted literals, [colour]/[condition] blocks, and the character
    // after `\`, `_` or `*`
    let mut in_quotes = false;
    let mut in_brackets = false;
    let mut skip_next = false;
    let mut cleaned = String::new();

    for c in lower.chars() {
        if skip_next {
            skip_next = false;
            continue;
        }
        match c {
            '"' => in_quotes = !in_quotes,
            _ if in_quotes => {}
            '[' => in_brackets = true,
            ']' => in_brackets = false,
            '\\' | '_' | '*' => skip_next = true,
            _ if !in_brackets => cleaned.push(c),
            _ => {}
        }
    }

    cleaned.contains('y')
        || cleaned.contains('m') && !cleaned.contains('#') // m is month if no # (number format)
        || cleaned.contains('d')
        || cleaned.contains('h')
        || cleaned.contains('s') && cleaned.contains(':') // s is seconds if with colon
}

/// Whether a cell with this `numFmtId` (and the workbook's custom code for
/// it, if any) holds a date or time.
pub fn is_date_format_id(id: u32, custom_code: Option<&str>) -> bool {
    match custom_code.or(get_builtin_format(id)) {
        Some(code) => is_date_format(code),
        None => is_locale_date_id(id),
    }
}

/// Render an Excel serial date as `YYYY-MM-DD HH:MM:SS`.
///
/// Returns `None` for serials outside 0..=9999-12-31, which Excel itself
/// shows as `#####`.
pub fn format_date_time(serial: f64, date1904: bool) -> Option<String> {
    if !serial.is_finite() || serial < 0.0 || serial >= MAX_SERIAL {
        return None;
    }

    // Round to the second first so 23:59:59.9 carries into the next day
    #[allow(clippy::cast_possible_truncation)]
    let total_seconds = (serial * 86_400.0).round() as i64;
    let days = total_seconds / SECONDS_PER_DAY;
    let seconds = total_seconds % SECONDS_PER_DAY;

    let (year, month, day) = jdn_to_ymd(serial_day_to_jdn(days, date1904));
    Some(format!(
        "{year:04}-{month:02}-{day:02} {:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    ))
}

/// Convert a whole serial day to a Julian Day Number.
fn serial_day_to_jdn(days: i64, date1904: bool) -> i64 {
    if date1904 {
        // 1904 system: day 0 = Jan 1, 1904
        days + 2_416_481
    } else if days <= 60 {
        // 1900 system: day 1 = Jan 1, 1900. Day 60 is Excel's phantom
        // Feb 29, 1900
        days + 2_415_020
    } else {
        days + 2_415_019
    }
}

/// Julian Day Number to (year, month, day) in the proleptic Gregorian calendar
fn jdn_to_ymd(jdn: i64) -> (i64, i64, i64) {
    // https://en.wikipedia.org/wiki/Julian_day#Julian_or_Gregorian_calendar_from_Julian_day_number
    let f = jdn + 1401 + (((4 * jdn + 274_277) / 146_097) * 3) / 4 - 38;
    let e = 4 * f + 3;
    let g = (e % 1461) / 4;
    let h = 5 * g + 2;

    let day = (h % 153) / 5 + 1;
    let month = ((h / 153 + 2) % 12) + 1;
    let year = e / 1461 - 4716 + (12 + 2 - month) / 12;

    (year, month, day)
}
