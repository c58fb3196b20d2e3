use rusqlite::{params_from_iter, Connection};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::products::{Product, SampleProduct};
use crate::query_builder::{self, BuiltQuery, QueryBuilderError};
use crate::schema::{Table, PRODUCTS};

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("query error: {0}")]
    Query(#[from] QueryBuilderError),
}

/// Read/write access to the `products` table.
pub trait ProductStore {
    /// # Errors
    /// Returns `DbError` if the select fails.
    fn list_products(&self) -> Result<Vec<Product>, DbError>;

    /// Insert every record in one statement. Returns the number of rows written.
    ///
    /// # Errors
    /// Returns `DbError` if the insert fails; no rows are written in that case.
    fn insert_products(&mut self, records: &[SampleProduct]) -> Result<usize, DbError>;

    /// Remove every row. Returns the number of rows deleted.
    ///
    /// # Errors
    /// Returns `DbError` if the delete fails.
    fn delete_products(&mut self) -> Result<usize, DbError>;
}

/// Open (or create) the `SQLite` database at `path` and ensure the schema exists.
///
/// # Errors
/// Returns `DbError` if the file cannot be opened or the schema cannot be created.
pub fn open(path: &Path) -> Result<Connection, DbError> {
    let conn = Connection::open(path)?;
    let _ = conn.pragma_update(None, "journal_mode", "WAL");
    create_schema(&conn)?;
    debug!(path = %path.display(), "database opened");
    Ok(conn)
}

/// Create every table the crate uses, leaving existing data alone.
///
/// # Errors
/// Returns `DbError` if a `CREATE TABLE` statement fails.
pub fn create_schema(conn: &Connection) -> Result<(), DbError> {
    for table in [&PRODUCTS] {
        ensure_table(conn, table)?;
    }
    Ok(())
}

fn ensure_table(conn: &Connection, table: &Table) -> Result<(), DbError> {
    conn.execute_batch(table.create_sql)?;
    Ok(())
}

/// Count the rows of `products`.
///
/// # Errors
/// Returns `DbError` if the count query fails.
pub fn count_products(conn: &Connection) -> Result<i64, DbError> {
    let count = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
    Ok(count)
}

/// Fetch every product, ordered by id.
///
/// # Errors
/// Returns `DbError` if the select fails.
pub fn fetch_products(conn: &Connection) -> Result<Vec<Product>, DbError> {
    let BuiltQuery { sql, params } = query_builder::select().from(&PRODUCTS)?;
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(params.iter()), Product::from_row)?;

    let mut products = Vec::new();
    for row in rows {
        products.push(row?);
    }
    Ok(products)
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    #[must_use]
    pub const fn new(conn: Connection) -> Self {
        Self { conn }
    }

    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl ProductStore for SqliteStore {
    fn list_products(&self) -> Result<Vec<Product>, DbError> {
        fetch_products(&self.conn)
    }

    fn insert_products(&mut self, records: &[SampleProduct]) -> Result<usize, DbError> {
        if records.is_empty() {
            return Ok(0);
        }

        let BuiltQuery { sql, params } = query_builder::insert(&PRODUCTS).values(records)?;
        let tx = self.conn.transaction()?;
        let inserted = tx.execute(&sql, params_from_iter(params.iter()))?;
        tx.commit()?;

        debug!(inserted, "products inserted");
        Ok(inserted)
    }

    fn delete_products(&mut self) -> Result<usize, DbError> {
        let BuiltQuery { sql, params } = query_builder::delete(&PRODUCTS)?;
        let deleted = self.conn.execute(&sql, params_from_iter(params.iter()))?;

        debug!(deleted, "products deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::SAMPLE_PRODUCTS;

    fn memory_store() -> SqliteStore {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        SqliteStore::new(conn)
    }

    #[test]
    fn fresh_table_is_empty() {
        let store = memory_store();
        assert!(store.list_products().unwrap().is_empty());
        assert_eq!(count_products(store.connection()).unwrap(), 0);
    }

    #[test]
    fn insert_then_list_preserves_fields_and_order() {
        let mut store = memory_store();
        let inserted = store.insert_products(SAMPLE_PRODUCTS).unwrap();
        assert_eq!(inserted, SAMPLE_PRODUCTS.len());

        let listed = store.list_products().unwrap();
        assert_eq!(listed.len(), SAMPLE_PRODUCTS.len());
        for (row, sample) in listed.iter().zip(SAMPLE_PRODUCTS) {
            assert_eq!(row.name, sample.name);
            assert_eq!(row.description.as_deref(), Some(sample.description));
            assert!((row.price - sample.price).abs() < f64::EPSILON);
            assert_eq!(row.category, sample.category);
            assert_eq!(row.stock, sample.stock);
            assert!(!row.created_at.is_empty());
        }
    }

    #[test]
    fn empty_insert_writes_nothing() {
        let mut store = memory_store();
        assert_eq!(store.insert_products(&[]).unwrap(), 0);
        assert_eq!(count_products(store.connection()).unwrap(), 0);
    }

    #[test]
    fn delete_clears_table() {
        let mut store = memory_store();
        store.insert_products(SAMPLE_PRODUCTS).unwrap();
        let deleted = store.delete_products().unwrap();
        assert_eq!(deleted, SAMPLE_PRODUCTS.len());
        assert_eq!(count_products(store.connection()).unwrap(), 0);
    }

    #[test]
    fn schema_creation_is_idempotent() {
        let mut store = memory_store();
        store.insert_products(SAMPLE_PRODUCTS).unwrap();
        create_schema(store.connection()).unwrap();
        assert_eq!(
            count_products(store.connection()).unwrap(),
            i64::try_from(SAMPLE_PRODUCTS.len()).unwrap()
        );
    }

    #[test]
    fn open_creates_file_backed_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        let conn = open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(count_products(&conn).unwrap(), 0);
    }
}
