pub mod config;
pub mod db;
pub mod icon;
pub mod products;
pub mod query_builder;
pub mod render;
pub mod schema;
pub mod seed;
