use rusqlite::types::Value;
use rusqlite::Row;
use serde::Serialize;

use crate::query_builder::ToRow;

/// A seed record, defined at compile time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleProduct {
    pub name: &'static str,
    pub description: &'static str,
    pub price: f64,
    pub category: &'static str,
    pub stock: i64,
    pub rating: f64,
    pub image: &'static str,
}

impl ToRow for SampleProduct {
    fn to_row(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.to_string()),
            Value::Text(self.description.to_string()),
            Value::Real(self.price),
            Value::Text(self.category.to_string()),
            Value::Integer(self.stock),
            Value::Real(self.rating),
            Value::Text(self.image.to_string()),
        ]
    }
}

/// A row of the `products` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub stock: i64,
    pub rating: f64,
    pub image: Option<String>,
    pub created_at: String,
}

impl Product {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            price: row.get("price")?,
            category: row.get("category")?,
            stock: row.get("stock")?,
            rating: row.get("rating")?,
            image: row.get("image")?,
            created_at: row.get("created_at")?,
        })
    }
}

pub const SAMPLE_PRODUCTS: &[SampleProduct] = &[
    SampleProduct {
        name: "Wireless Noise-Cancelling Headphones",
        description: "Over-ear headphones with 30 hours of battery life and adaptive noise cancelling.",
        price: 249.99,
        category: "audio",
        stock: 42,
        rating: 4.7,
        image: "/images/products/headphones.jpg",
    },
    SampleProduct {
        name: "Mechanical Keyboard",
        description: "Hot-swappable 75% keyboard with tactile switches and a machined aluminium case.",
        price: 159.0,
        category: "peripherals",
        stock: 18,
        rating: 4.8,
        image: "/images/products/keyboard.jpg",
    },
    SampleProduct {
        name: "Ergonomic Office Chair",
        description: "Breathable mesh chair with adjustable lumbar support and 4D armrests.",
        price: 389.5,
        category: "furniture",
        stock: 7,
        rating: 4.5,
        image: "/images/products/chair.jpg",
    },
    SampleProduct {
        name: "4K USB-C Monitor",
        description: "27-inch IPS panel with 96W power delivery over a single cable.",
        price: 449.0,
        category: "electronics",
        stock: 12,
        rating: 4.6,
        image: "/images/products/monitor.jpg",
    },
    SampleProduct {
        name: "Smart Desk Lamp",
        description: "Dimmable LED lamp with adjustable colour temperature and a wireless charging base.",
        price: 69.99,
        category: "lighting",
        stock: 65,
        rating: 4.3,
        image: "/images/products/lamp.jpg",
    },
    SampleProduct {
        name: "Portable SSD 1TB",
        description: "Pocket-sized solid-state drive with read speeds up to 1050 MB/s.",
        price: 119.0,
        category: "storage",
        stock: 0,
        rating: 4.4,
        image: "/images/products/ssd.jpg",
    },
];
