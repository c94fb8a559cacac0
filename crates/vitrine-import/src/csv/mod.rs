//! RFC4180 CSV codec.
//!
//! The parser imposes no schema: every header becomes a column and every
//! data line a [`Row`] keyed by those headers. The writer produces the BOM +
//! CRLF flavour spreadsheet tools open without an import dialog.

mod parser;
mod row;
mod writer;

pub use parser::{parse, ParsedCsv};
pub use row::Row;
pub use writer::{escape_field, generate};
