//! Persistence for reference data and saved calculations.
//!
//! Absent records come back as `None` / `false` / an empty list rather than
//! errors. Writes are whole-record overwrites; the last writer wins.

pub mod file;
pub mod postgres;

pub use file::FileStore;
pub use postgres::PgStore;

use crate::error::StoreError;
use crate::pnl::models::{ReferenceConfig, SavedCalculation};

#[derive(Debug, Clone)]
pub enum Store {
    File(FileStore),
    Postgres(PgStore),
}

impl Store {
    /// Backend name for health reporting
    pub fn backend(&self) -> &'static str {
        match self {
            Store::File(_) => "file",
            Store::Postgres(_) => "postgres",
        }
    }

    pub async fn load_reference_config(&self) -> Result<Option<ReferenceConfig>, StoreError> {
        match self {
            Store::File(s) => s.load_reference_config().await,
            Store::Postgres(s) => s.load_reference_config().await,
        }
    }

    pub async fn save_reference_config(&self, config: &ReferenceConfig) -> Result<(), StoreError> {
        match self {
            Store::File(s) => s.save_reference_config(config).await,
            Store::Postgres(s) => s.save_reference_config(config).await,
        }
    }

    pub async fn save_calculation(&self, calculation: &SavedCalculation) -> Result<(), StoreError> {
        match self {
            Store::File(s) => s.save_calculation(calculation).await,
            Store::Postgres(s) => s.save_calculation(calculation).await,
        }
    }

    pub async fn load_calculation(&self, name: &str) -> Result<Option<SavedCalculation>, StoreError> {
        match self {
            Store::File(s) => s.load_calculation(name).await,
            Store::Postgres(s) => s.load_calculation(name).await,
        }
    }

    pub async fn list_calculations(&self) -> Result<Vec<SavedCalculation>, StoreError> {
        match self {
            Store::File(s) => s.list_calculations().await,
            Store::Postgres(s) => s.list_calculations().await,
        }
    }

    pub async fn delete_calculation(&self, name: &str) -> Result<bool, StoreError> {
        match self {
            Store::File(s) => s.delete_calculation(name).await,
            Store::Postgres(s) => s.delete_calculation(name).await,
        }
    }
}

impl From<FileStore> for Store {
    fn from(store: FileStore) -> Self {
        Store::File(store)
    }
}

impl From<PgStore> for Store {
    fn from(store: PgStore) -> Self {
        Store::Postgres(store)
    }
}
