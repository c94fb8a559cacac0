use super::row::Row;

const BOM: char = '\u{feff}';

/// Result of tokenizing one CSV document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCsv {
    /// Trimmed header cells; empty when the input had no header line.
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    /// Physical lines in the input, blank ones included.
    pub total_lines: usize,
}

struct Record {
    line: usize,
    fields: Vec<String>,
    quoted: bool,
}

impl Record {
    /// A line holding one empty unquoted field.
    fn is_blank(&self) -> bool {
        !self.quoted && self.fields.len() == 1 && self.fields[0].is_empty()
    }
}

/// Split normalized text into records, tracking the line each one starts on.
fn tokenize(text: &str) -> (Vec<Record>, usize) {
    let mut records = Vec::new();
    let mut chars = text.chars().peekable();

    let mut line = 1;
    let mut record_line = 1;
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_quoted = false;
    let mut record_quoted = false;

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push('\n');
                }
                _ => field.push(ch),
            }
            continue;
        }

        match ch {
            '"' if field.is_empty() && !field_quoted => {
                in_quotes = true;
                field_quoted = true;
                record_quoted = true;
            }
            ',' => {
                fields.push(std::mem::take(&mut field));
                field_quoted = false;
            }
            '\n' => {
                fields.push(std::mem::take(&mut field));
                records.push(Record {
                    line: record_line,
                    fields: std::mem::take(&mut fields),
                    quoted: record_quoted,
                });
                line += 1;
                record_line = line;
                field_quoted = false;
                record_quoted = false;
            }
            _ => field.push(ch),
        }
    }

    // Last line without a trailing newline, or an unterminated quote.
    if !field.is_empty() || !fields.is_empty() || record_quoted {
        fields.push(field);
        records.push(Record {
            line: record_line,
            fields,
            quoted: record_quoted,
        });
    }

    let total_lines = if text.is_empty() {
        0
    } else if text.ends_with('\n') {
        line - 1
    } else {
        line
    };

    (records, total_lines)
}

/// Parse CSV text into header-keyed rows.
///
/// Strips a UTF-8 BOM, accepts `\r\n`, `\r` and `\n` line endings and trims
/// every header and value. Blank lines are skipped but still counted, so
/// `Row::line` always points at the physical source line.
pub fn parse(text: &str) -> ParsedCsv {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let (records, total_lines) = tokenize(&normalized);

    let mut records = records.into_iter().filter(|record| !record.is_blank());

    let headers: Vec<String> = match records.next() {
        Some(header) => header
            .fields
            .iter()
            .map(|h| h.trim().to_string())
            .collect(),
        None => {
            return ParsedCsv {
                headers: Vec::new(),
                rows: Vec::new(),
                total_lines,
            }
        }
    };

    let rows = records
        .map(|record| {
            Row::from_pairs(
                record.line,
                headers.iter().enumerate().map(|(i, header)| {
                    let value = record.fields.get(i).map(|v| v.trim()).unwrap_or("");
                    (header.clone(), value.to_string())
                }),
            )
        })
        .collect();

    ParsedCsv {
        headers,
        rows,
        total_lines,
    }
}
