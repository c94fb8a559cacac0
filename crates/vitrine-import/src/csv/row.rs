/// One data line of a parsed CSV.
///
/// Keys are exactly the header columns in header order; a cell missing from
/// the source line is an empty string, never an absent key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    /// 1-based source line the record started on (the header is line 1).
    pub line: usize,
    values: Vec<(String, String)>,
}

impl Row {
    pub fn new(line: usize) -> Self {
        Self {
            line,
            values: Vec::new(),
        }
    }

    /// Build a row from `(column, value)` pairs in column order.
    pub fn from_pairs<K, V>(line: usize, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut row = Row::new(line);
        for (key, value) in pairs {
            row.set(key, value);
        }
        row
    }

    /// Cell value, or `""` when the column is absent.
    pub fn get(&self, column: &str) -> &str {
        self.values
            .iter()
            .find(|(key, _)| key == column)
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }

    /// True when the column is part of the row's header set.
    pub fn has(&self, column: &str) -> bool {
        self.values.iter().any(|(key, _)| key == column)
    }

    /// Replace a cell value, appending the column when it is new.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.values.iter_mut().find(|(key, _)| *key == column) {
            Some((_, slot)) => *slot = value,
            None => self.values.push((column, value)),
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(key, _)| key.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
