//! Populate an empty `products` table with the fixed sample set.
//!
//! The sequence is: optional reset, existence check, bulk insert. Each step
//! either succeeds or aborts the rest; there is no retry and no partial
//! recovery.

use std::error::Error as _;
use std::process::ExitCode;

use thiserror::Error;
use tracing::{error, info};

use crate::config::ConfigError;
use crate::db::{DbError, ProductStore};
use crate::products::SampleProduct;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Db(#[from] DbError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedOptions {
    /// Delete every existing row before inserting.
    pub reset: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Inserted { removed: usize, inserted: usize },
    /// The table already held rows and no reset was requested.
    AlreadySeeded { existing: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedStatus {
    Success,
    Failed,
}

impl SeedStatus {
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failed => 1,
        }
    }
}

impl From<SeedStatus> for ExitCode {
    fn from(status: SeedStatus) -> Self {
        Self::from(status.exit_code())
    }
}

/// Run the seeding sequence against `store`.
///
/// # Errors
/// Returns `SeedError` as soon as any store operation fails.
pub fn seed_products<S: ProductStore>(
    store: &mut S,
    records: &[SampleProduct],
    options: SeedOptions,
) -> Result<SeedOutcome, SeedError> {
    info!("Seeding database...");

    let removed = if options.reset {
        info!("Resetting database...");
        let removed = store.delete_products()?;
        info!(removed, "Database reset successfully");
        removed
    } else {
        let existing = store.list_products()?;
        if !existing.is_empty() {
            return Ok(SeedOutcome::AlreadySeeded {
                existing: existing.len(),
            });
        }
        0
    };

    info!(count = records.len(), "Inserting sample products...");
    let inserted = store.insert_products(records)?;
    info!(inserted, "Sample products inserted successfully");

    Ok(SeedOutcome::Inserted { removed, inserted })
}

/// Seed and log the result, mapping any failure to [`SeedStatus::Failed`].
pub fn run<S: ProductStore>(
    store: &mut S,
    records: &[SampleProduct],
    options: SeedOptions,
) -> SeedStatus {
    match seed_products(store, records, options) {
        Ok(SeedOutcome::AlreadySeeded { existing }) => {
            info!(existing, "Products already exist");
            info!("Run with --reset to clear the products table and reseed: seed --reset");
            SeedStatus::Success
        }
        Ok(SeedOutcome::Inserted { .. }) => {
            info!("Seeding complete!");
            SeedStatus::Success
        }
        Err(err) => {
            report(&err);
            SeedStatus::Failed
        }
    }
}

/// Log an error together with its source chain.
pub fn report(err: &SeedError) {
    let mut causes = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }
    error!(causes = ?causes, "Error seeding database: {err}");
}
