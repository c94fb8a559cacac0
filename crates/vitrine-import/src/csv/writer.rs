const BOM: &str = "\u{feff}";
const LINE_END: &str = "\r\n";

/// Quote a field when it holds a comma, quote, CR or LF; inner quotes are
/// doubled.
pub fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn push_line<I, S>(out: &mut String, cells: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut count = 0;
    let mut last_empty = false;
    for cell in cells {
        let cell = cell.as_ref();
        if count > 0 {
            out.push(',');
        }
        count += 1;
        last_empty = cell.is_empty();
        out.push_str(&escape_field(cell));
    }
    // A lone empty cell would read back as a blank line.
    if count == 1 && last_empty {
        out.push_str("\"\"");
    }
    out.push_str(LINE_END);
}

/// Serialize a header line and data rows: UTF-8 BOM, CRLF line endings.
/// Each row's cells are written in header order.
pub fn generate<H, R, S>(headers: &[H], rows: &[R]) -> String
where
    H: AsRef<str>,
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let mut out = String::from(BOM);
    push_line(&mut out, headers.iter().map(|h| h.as_ref()));
    for row in rows {
        push_line(&mut out, row.as_ref().iter().map(|cell| cell.as_ref()));
    }
    out
}
