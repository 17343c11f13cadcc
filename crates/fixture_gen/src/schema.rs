//! Schema model for fixture tables.
//!
//! Fixture DDL is a compatibility contract with existing benchmark scripts,
//! so rendering reproduces the established layout exactly, including the
//! two historical ways a `create table` statement is closed.

use std::fmt::Write as _;

/// Column types used by fixture tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Int,
    VarChar(u16),
    DateTime,
}

impl SqlType {
    pub fn to_sql(&self) -> String {
        match self {
            SqlType::Int => "int".to_string(),
            SqlType::VarChar(n) => format!("varchar({})", n),
            SqlType::DateTime => "datetime".to_string(),
        }
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: SqlType,
}

impl Column {
    pub fn new(name: &'static str, sql_type: SqlType) -> Self {
        Self { name, sql_type }
    }
}

/// How the `create table` body and the query wrapper are closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloseStyle {
    /// `)` flush left, then an indented `]])`
    #[default]
    IndentedBrackets,
    /// An indented `)`, then `]])` flush left
    IndentedParen,
}

/// Table schema definition
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableSchema {
    pub columns: Vec<Column>,
    pub primary_key: Vec<&'static str>,
    pub indexes: Vec<&'static str>,
    pub close: CloseStyle,
}

impl TableSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, name: &'static str, sql_type: SqlType) -> Self {
        self.columns.push(Column::new(name, sql_type));
        self
    }

    pub fn primary_key(mut self, columns: &[&'static str]) -> Self {
        self.primary_key = columns.to_vec();
        self
    }

    pub fn index(mut self, column: &'static str) -> Self {
        self.indexes.push(column);
        self
    }

    pub fn close_style(mut self, close: CloseStyle) -> Self {
        self.close = close;
        self
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    /// Render the `create table` statement wrapped in a script query call
    pub fn render(&self, table: &str) -> String {
        let mut lines: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("  {} {}", c.name, c.sql_type.to_sql()))
            .collect();
        if !self.primary_key.is_empty() {
            lines.push(format!("  primary key ({})", self.primary_key.join(", ")));
        }
        for index in &self.indexes {
            lines.push(format!("  index ({})", index));
        }

        let mut out = String::new();
        out.push_str("  con:query([[\n");
        let _ = writeln!(out, "create table {} (", table);
        out.push_str(&lines.join(",\n"));
        out.push('\n');
        match self.close {
            CloseStyle::IndentedBrackets => out.push_str(")\n  ]])\n"),
            CloseStyle::IndentedParen => out.push_str("  )\n]])\n"),
        }
        out
    }
}
