use crate::core::Value;
use serde::{Deserialize, Serialize};

/// How positional parameters are written in statement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStyle {
    /// `?` (JDBC, ODBC, SQLite, MySQL).
    #[default]
    Question,
    /// `$1`, `$2`, ... (PostgreSQL).
    Numbered,
}

/// Hands out placeholders in bind order.
#[derive(Debug)]
pub(crate) struct Placeholders {
    style: PlaceholderStyle,
    issued: usize,
}

impl Placeholders {
    pub(crate) fn new(style: PlaceholderStyle) -> Self {
        Self { style, issued: 0 }
    }

    pub(crate) fn next(&mut self) -> String {
        self.issued += 1;
        match self.style {
            PlaceholderStyle::Question => "?".to_string(),
            PlaceholderStyle::Numbered => format!("${}", self.issued),
        }
    }
}

/// A single-row statement and its parameters, index-aligned with the placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: String, params: Vec<Value>) -> Self {
        Self { sql, params }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }
}

/// One statement executed once per row of a rectangular value matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchStatement {
    sql: String,
    rows: Vec<Vec<Value>>,
}

impl BatchStatement {
    pub fn new(sql: String, rows: Vec<Vec<Value>>) -> Self {
        Self { sql, rows }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
