use rusqlite::types::Value;
use thiserror::Error;

use crate::schema::Table;

#[derive(Debug, Error)]
pub enum QueryBuilderError {
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("insert into {0} has no rows")]
    EmptyInsert(&'static str),
    #[error("row {row} has {found} values, expected {expected}")]
    Arity {
        row: usize,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Clone)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

fn is_safe_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    for ch in chars {
        if !(ch.is_ascii_alphanumeric() || ch == '_') {
            return false;
        }
    }
    true
}

fn sanitize_identifier(name: &str) -> Result<&str, QueryBuilderError> {
    if !is_safe_identifier(name) {
        return Err(QueryBuilderError::InvalidIdentifier(name.to_string()));
    }
    Ok(name)
}

/// Anything that can be written as one row of a table, in the table's column order.
pub trait ToRow {
    fn to_row(&self) -> Vec<Value>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SelectBuilder;

#[must_use]
pub const fn select() -> SelectBuilder {
    SelectBuilder
}

impl SelectBuilder {
    /// Select every column of `table`, oldest rows first.
    ///
    /// # Errors
    /// Returns `QueryBuilderError` if the table name fails validation.
    pub fn from(self, table: &Table) -> Result<BuiltQuery, QueryBuilderError> {
        let name = sanitize_identifier(table.name)?;
        Ok(BuiltQuery {
            sql: format!("SELECT * FROM {name} ORDER BY id"),
            params: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InsertBuilder<'t> {
    table: &'t Table,
}

#[must_use]
pub const fn insert(table: &Table) -> InsertBuilder<'_> {
    InsertBuilder { table }
}

impl InsertBuilder<'_> {
    /// Build one multi-row `INSERT` covering every record.
    ///
    /// # Errors
    /// Returns `QueryBuilderError` for an empty record set, a row whose width
    /// differs from the table's column list, or an invalid identifier.
    pub fn values<R: ToRow>(self, records: &[R]) -> Result<BuiltQuery, QueryBuilderError> {
        let table = sanitize_identifier(self.table.name)?;
        if records.is_empty() {
            return Err(QueryBuilderError::EmptyInsert(self.table.name));
        }

        let mut columns = Vec::with_capacity(self.table.columns.len());
        for column in self.table.columns {
            columns.push(sanitize_identifier(column)?);
        }
        let width = columns.len();

        let placeholders = format!("({})", vec!["?"; width].join(", "));
        let mut sql = format!("INSERT INTO {table} ({}) VALUES ", columns.join(", "));
        let mut params = Vec::with_capacity(records.len() * width);

        for (idx, record) in records.iter().enumerate() {
            let row = record.to_row();
            if row.len() != width {
                return Err(QueryBuilderError::Arity {
                    row: idx,
                    expected: width,
                    found: row.len(),
                });
            }
            if idx > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&placeholders);
            params.extend(row);
        }

        Ok(BuiltQuery { sql, params })
    }
}

/// Delete every row of `table`.
///
/// # Errors
/// Returns `QueryBuilderError` if the table name fails validation.
pub fn delete(table: &Table) -> Result<BuiltQuery, QueryBuilderError> {
    let name = sanitize_identifier(table.name)?;
    Ok(BuiltQuery {
        sql: format!("DELETE FROM {name}"),
        params: Vec::new(),
    })
}
