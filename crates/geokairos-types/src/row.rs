use crate::SqlValue;

/// A single row of data - vector of SqlValues
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub values: Vec<SqlValue>,
}

impl Row {
    /// Create a new row from values
    pub fn new(values: Vec<SqlValue>) -> Self {
        Row { values }
    }

    /// Get value at column index
    pub fn get(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// Get number of columns in this row
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if row is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Integer at `index`, `None` for NULL, missing or non-integral values
    pub fn get_i64(&self, index: usize) -> Option<i64> {
        self.get(index).and_then(SqlValue::as_i64)
    }

    /// String at `index`, `None` for NULL or missing values
    pub fn get_string(&self, index: usize) -> Option<String> {
        match self.get(index)? {
            SqlValue::Null => None,
            SqlValue::Varchar(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Bytes at `index`, `None` for NULL or non-binary values
    pub fn get_bytes(&self, index: usize) -> Option<&[u8]> {
        self.get(index).and_then(SqlValue::as_bytes)
    }
}

/// Rows returned by a query, with the column labels the engine reported
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        ResultSet { columns, rows }
    }

    /// An empty result with the given column labels
    pub fn empty(columns: Vec<String>) -> Self {
        ResultSet { columns, rows: Vec::new() }
    }

    /// Index of a column label, compared case-insensitively
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
