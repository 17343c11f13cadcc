//! SQL value representation for fixture rows.

/// A single rendered column value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Null,
    Int(i64),
    String(String),
}

impl SqlValue {
    pub fn string(s: impl Into<String>) -> Self {
        SqlValue::String(s.into())
    }

    /// Text when set, NULL otherwise
    pub fn string_or_null(s: Option<&str>) -> Self {
        s.map_or(SqlValue::Null, SqlValue::string)
    }

    /// Format for an INSERT statement
    pub fn to_sql(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Int(n) => n.to_string(),
            SqlValue::String(s) => format!("'{}'", escape_string(s)),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

fn escape_string(s: &str) -> String {
    s.replace('\'', "''")
}

/// A row of fixture values
pub type Row = Vec<SqlValue>;

/// Render one row as it appears inside a batch insert
pub fn render_row(row: &[SqlValue]) -> String {
    let values: Vec<String> = row.iter().map(SqlValue::to_sql).collect();
    format!("  ({})", values.join(", "))
}
