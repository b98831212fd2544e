//! Multi-channel profitability calculator.
//!
//! An Axum service around a pure P&L engine, with reference data and saved
//! calculations kept in a JSON file store or PostgreSQL.

pub mod cache;
pub mod config;
pub mod error;
pub mod pnl;
pub mod routes;
pub mod store;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::cache::AppCache;
use crate::config::Settings;
use crate::error::StoreError;
use crate::store::{FileStore, PgStore, Store};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub cache: AppCache,
}

impl AppState {
    pub fn new(store: impl Into<Store>, cache: AppCache) -> Self {
        Self {
            store: store.into(),
            cache,
        }
    }

    /// Build state from settings: PostgreSQL when `DATABASE_URL` is set,
    /// the file store otherwise.
    pub async fn from_settings(settings: &Settings) -> Result<Self, StoreError> {
        let store: Store = match &settings.database_url {
            Some(url) => PgStore::connect(url, settings.database_max_connections)
                .await?
                .into(),
            None => FileStore::new(&settings.data_dir).into(),
        };
        Ok(Self::new(store, AppCache::new(settings.cache_ttl)))
    }
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .nest("/api/pnl", pnl::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
