/// A table the store knows how to create and address.
#[derive(Debug, Clone, Copy)]
pub struct Table {
    pub name: &'static str,
    /// Insertable columns, in bind order. Generated columns are not listed.
    pub columns: &'static [&'static str],
    pub create_sql: &'static str,
}

pub const PRODUCTS: Table = Table {
    name: "products",
    columns: &[
        "name",
        "description",
        "price",
        "category",
        "stock",
        "rating",
        "image",
    ],
    create_sql: "
        CREATE TABLE IF NOT EXISTS products (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          name TEXT NOT NULL,
          description TEXT,
          price REAL NOT NULL,
          category TEXT NOT NULL,
          stock INTEGER DEFAULT 0,
          rating REAL DEFAULT 0,
          image TEXT,
          created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    ",
};
