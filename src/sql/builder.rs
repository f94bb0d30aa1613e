use super::statement::{PlaceholderStyle, Placeholders};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("INSERT into '{0}' has no insertable columns")]
    NoInsertColumns(String),

    #[error("UPDATE of '{0}' has no updatable columns")]
    NoAssignments(String),
}

/// `INSERT INTO <table> (<c1>,<c2>) VALUES (?,?)`, columns in the order given.
pub fn build_insert(
    table: &str,
    columns: &[&str],
    style: PlaceholderStyle,
) -> Result<String, BuildError> {
    if columns.is_empty() {
        return Err(BuildError::NoInsertColumns(table.to_string()));
    }

    let mut placeholders = Placeholders::new(style);
    let values: Vec<String> = columns.iter().map(|_| placeholders.next()).collect();

    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(","),
        values.join(",")
    ))
}

/// `UPDATE <table> SET <c1>=?,<c2>=? WHERE <key> = ?`.
///
/// The key placeholder is issued after every SET placeholder, so the key
/// value must be bound last.
pub fn build_update(
    table: &str,
    assignments: &[&str],
    key_column: &str,
    style: PlaceholderStyle,
) -> Result<String, BuildError> {
    if assignments.is_empty() {
        return Err(BuildError::NoAssignments(table.to_string()));
    }

    let mut placeholders = Placeholders::new(style);
    let set_clause: Vec<String> = assignments
        .iter()
        .map(|column| format!("{}={}", column, placeholders.next()))
        .collect();
    let predicate = key_predicate(key_column, &mut placeholders);

    Ok(format!(
        "UPDATE {} SET {} WHERE {}",
        table,
        set_clause.join(","),
        predicate
    ))
}

/// `DELETE FROM <table> WHERE <key> = ?`.
pub fn build_delete(table: &str, key_column: &str, style: PlaceholderStyle) -> String {
    let mut placeholders = Placeholders::new(style);
    format!(
        "DELETE FROM {} WHERE {}",
        table,
        key_predicate(key_column, &mut placeholders)
    )
}

fn key_predicate(column: &str, placeholders: &mut Placeholders) -> String {
    format!("{} = {}", column, placeholders.next())
}
