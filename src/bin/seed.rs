//! Seed the products table with sample data.
//!
//! ```text
//! cargo run --bin seed
//! cargo run --bin seed -- --reset
//! ```

#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use storefront::config::{Config, RuntimeMode};
use storefront::db::{self, SqliteStore};
use storefront::products::SAMPLE_PRODUCTS;
use storefront::seed::{self, SeedError, SeedOptions, SeedStatus};

#[derive(Debug, Parser)]
#[command(name = "seed", about = "Insert sample products into an empty database")]
struct Cli {
    /// Delete all existing products before inserting the sample set
    #[arg(short, long)]
    reset: bool,

    /// Database file (defaults to DATABASE_PATH or storefront.db)
    #[arg(long, value_name = "PATH")]
    database: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Configuration is resolved before any connection is opened.
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            init_tracing(RuntimeMode::default());
            seed::report(&SeedError::from(err));
            return SeedStatus::Failed.into();
        }
    };
    let config = config.with_database_path(cli.database);
    init_tracing(config.runtime_mode);

    info!(
        mode = %config.runtime_mode,
        preset = %config.server_preset,
        path = %config.database_path.display(),
        "Starting seeder"
    );

    let conn = match db::open(&config.database_path) {
        Ok(conn) => conn,
        Err(err) => {
            seed::report(&SeedError::from(err));
            return SeedStatus::Failed.into();
        }
    };

    let mut store = SqliteStore::new(conn);
    let status = seed::run(&mut store, SAMPLE_PRODUCTS, SeedOptions { reset: cli.reset });
    if status == SeedStatus::Success {
        match db::count_products(store.connection()) {
            Ok(count) => info!(count, "Products in table"),
            Err(err) => {
                seed::report(&SeedError::from(err));
                return SeedStatus::Failed.into();
            }
        }
    }
    status.into()
}

fn init_tracing(mode: RuntimeMode) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(mode.default_log_filter())),
        )
        .init();
}
