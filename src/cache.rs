//! In-memory caching using moka
//!
//! Keeps the reference configuration and recently used saved calculations
//! in front of the store. Every write through the service layer replaces or
//! invalidates the affected entry.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::pnl::models::{ReferenceConfig, SavedCalculation};

const REFERENCE_CONFIG_KEY: &str = "reference_config";

/// Application cache holding reference data and saved calculations
#[derive(Clone)]
pub struct AppCache {
    /// Reference configuration (singleton)
    pub reference_config: Cache<String, Arc<ReferenceConfig>>,
    /// Saved calculations (name -> record)
    pub calculations: Cache<String, Arc<SavedCalculation>>,
}

impl AppCache {
    /// Create a new cache instance with the given time-to-live
    pub fn new(ttl: Duration) -> Self {
        Self {
            reference_config: Cache::builder().max_capacity(1).time_to_live(ttl).build(),

            // Saved calculations: 500 entries, idle entries dropped after a third of the TTL
            calculations: Cache::builder()
                .max_capacity(500)
                .time_to_live(ttl)
                .time_to_idle(ttl / 3)
                .build(),
        }
    }

    pub async fn get_reference_config(&self) -> Option<Arc<ReferenceConfig>> {
        self.reference_config.get(REFERENCE_CONFIG_KEY).await
    }

    pub async fn put_reference_config(&self, config: Arc<ReferenceConfig>) {
        self.reference_config
            .insert(REFERENCE_CONFIG_KEY.to_string(), config)
            .await;
    }

    pub async fn get_calculation(&self, name: &str) -> Option<Arc<SavedCalculation>> {
        self.calculations.get(name).await
    }

    pub async fn put_calculation(&self, calculation: Arc<SavedCalculation>) {
        self.calculations
            .insert(calculation.name.clone(), calculation)
            .await;
    }

    pub async fn invalidate_calculation(&self, name: &str) {
        self.calculations.invalidate(name).await;
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            reference_config_cached: self.reference_config.entry_count() > 0,
            calculations_size: self.calculations.entry_count(),
        }
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(30 * 60))
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub reference_config_cached: bool,
    pub calculations_size: u64,
}
