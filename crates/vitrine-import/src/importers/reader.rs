use std::str::FromStr;

use vitrine_core::models::ImportError;
use vitrine_core::money::parse_money;
use vitrine_core::slug::slugify;

use crate::csv::Row;

/// Accepts `1/0`, `true/false`, `yes/no`, `да/нет`, case-insensitively.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "да" => Some(true),
        "0" | "false" | "no" | "нет" => Some(false),
        _ => None,
    }
}

/// Typed access to one row's cells, producing [`ImportError`]s tagged with
/// the row's source line.
///
/// Optional getters return `None` when the column is missing from the header
/// (the stored value is kept). For nullable columns `Some(None)` means the
/// cell was present but empty (the stored value is cleared).
pub struct RowReader<'a> {
    row: &'a Row,
}

impl<'a> RowReader<'a> {
    pub fn new(row: &'a Row) -> Self {
        Self { row }
    }

    pub fn line(&self) -> usize {
        self.row.line
    }

    pub fn error(&self, field: &str, message: impl Into<String>) -> ImportError {
        ImportError::new(self.row.line, field, message)
    }

    /// Non-empty cell value, or `None` for missing and empty cells.
    pub fn value(&self, column: &str) -> Option<&'a str> {
        let value = self.row.get(column);
        (!value.is_empty()).then_some(value)
    }

    pub fn required(&self, column: &str) -> Result<String, ImportError> {
        self.value(column)
            .map(str::to_string)
            .ok_or_else(|| self.error(column, format!("{} is required", column)))
    }

    pub fn text(&self, column: &str) -> Option<Option<String>> {
        self.row
            .has(column)
            .then(|| self.value(column).map(str::to_string))
    }

    pub fn slug_or(&self, column: &str, source: &str) -> Result<String, ImportError> {
        let slug = match self.value(column) {
            Some(explicit) => slugify(explicit),
            None => slugify(source),
        };
        if slug.is_empty() {
            return Err(self.error(column, format!("Cannot derive a slug from '{}'", source)));
        }
        Ok(slug)
    }

    fn parse_with<T>(
        &self,
        column: &str,
        parse: impl Fn(&str) -> Option<T>,
        expected: &str,
    ) -> Result<Option<T>, ImportError> {
        match self.value(column) {
            None => Ok(None),
            Some(raw) => parse(raw).map(Some).ok_or_else(|| {
                self.error(column, format!("Invalid {} '{}': expected {}", column, raw, expected))
            }),
        }
    }

    /// Non-nullable integer: missing and empty both mean "not supplied".
    pub fn int(&self, column: &str) -> Result<Option<i64>, ImportError> {
        self.parse_with(column, |raw| i64::from_str(raw).ok(), "an integer")
    }

    pub fn non_negative_int(&self, column: &str) -> Result<Option<i64>, ImportError> {
        self.parse_with(
            column,
            |raw| i64::from_str(raw).ok().filter(|n| *n >= 0),
            "a non-negative integer",
        )
    }

    pub fn nullable_int(&self, column: &str) -> Result<Option<Option<i64>>, ImportError> {
        if !self.row.has(column) {
            return Ok(None);
        }
        self.int(column).map(Some)
    }

    pub fn bool(&self, column: &str) -> Result<Option<bool>, ImportError> {
        self.parse_with(column, parse_bool, "1/0, true/false, yes/no or да/нет")
    }

    pub fn money(&self, column: &str) -> Result<Option<i64>, ImportError> {
        match self.value(column) {
            None => Ok(None),
            Some(raw) => parse_money(raw)
                .map(Some)
                .map_err(|reason| self.error(column, reason)),
        }
    }

    pub fn nullable_money(&self, column: &str) -> Result<Option<Option<i64>>, ImportError> {
        if !self.row.has(column) {
            return Ok(None);
        }
        self.money(column).map(Some)
    }

    /// Nullable JSON text, validated but stored verbatim.
    pub fn json(&self, column: &str) -> Result<Option<Option<String>>, ImportError> {
        match self.text(column) {
            Some(Some(raw)) => match serde_json::from_str::<serde_json::Value>(&raw) {
                Ok(_) => Ok(Some(Some(raw))),
                Err(e) => Err(self.error(column, format!("Invalid JSON in {}: {}", column, e))),
            },
            other => Ok(other),
        }
    }

    /// `|`-separated list; empty segments dropped.
    pub fn list(&self, column: &str) -> Vec<String> {
        self.row
            .get(column)
            .split('|')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row::from_pairs(
            7,
            [
                ("name", "Omega"),
                ("description", ""),
                ("price", "12 500,50"),
                ("stock", "-1"),
                ("is_active", "Да"),
                ("specs", "{not json"),
                ("gallery_images", "a.jpg| |b.jpg"),
            ],
        )
    }

    #[test]
    fn test_parse_bool_variants() {
        for raw in ["1", "true", "YES", "да", "Да"] {
            assert_eq!(parse_bool(raw), Some(true), "{}", raw);
        }
        for raw in ["0", "False", "no", "нет"] {
            assert_eq!(parse_bool(raw), Some(false), "{}", raw);
        }
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_text_distinguishes_absent_empty_and_set() {
        let row = row();
        let reader = RowReader::new(&row);

        assert_eq!(reader.text("country"), None);
        assert_eq!(reader.text("description"), Some(None));
        assert_eq!(reader.text("name"), Some(Some("Omega".to_string())));
    }

    #[test]
    fn test_required_and_typed_errors_carry_line_and_field() {
        let row = row();
        let reader = RowReader::new(&row);

        let err = reader.required("description").unwrap_err();
        assert_eq!((err.row, err.field.as_str()), (7, "description"));

        let err = reader.non_negative_int("stock").unwrap_err();
        assert_eq!(err.field, "stock");
        assert_eq!(err.row, 7);

        assert!(reader.json("specs").is_err());
    }

    #[test]
    fn test_money_bool_and_list() {
        let row = row();
        let reader = RowReader::new(&row);

        assert_eq!(reader.money("price").unwrap(), Some(1_250_050));
        assert_eq!(reader.nullable_money("old_price").unwrap(), None);
        assert_eq!(reader.bool("is_active").unwrap(), Some(true));
        assert_eq!(reader.list("gallery_images"), ["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_slug_derivation() {
        let row = Row::from_pairs(2, [("name", "Мужские часы"), ("slug", "")]);
        let reader = RowReader::new(&row);
        assert_eq!(reader.slug_or("slug", "Мужские часы").unwrap(), "muzhskie-chasy");

        let row = Row::from_pairs(2, [("name", "!!!")]);
        let reader = RowReader::new(&row);
        assert!(reader.slug_or("slug", "!!!").is_err());
    }
}
