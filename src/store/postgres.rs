//! PostgreSQL store.
//!
//! Both record kinds are kept as JSONB documents; the relational columns
//! exist only for lookup and ordering.

use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use crate::error::StoreError;
use crate::pnl::models::{ReferenceConfig, SavedCalculation};

/// The reference configuration is a singleton row
const REFERENCE_CONFIG_ID: i16 = 1;

/// Row from pnl_calculations
#[derive(Debug, FromRow)]
struct CalculationRow {
    name: String,
    document: Json<SavedCalculation>,
}

impl CalculationRow {
    /// The document is authoritative; the key column should agree with it
    fn into_calculation(self) -> SavedCalculation {
        let calculation = self.document.0;
        if calculation.name != self.name {
            tracing::warn!(
                row = %self.name,
                document = %calculation.name,
                "Calculation document name differs from its key"
            );
        }
        calculation
    }
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and make sure the tables exist
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let store = Self::from_pool(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Wrap an existing pool. The schema is not checked.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pnl_reference_config (
                id SMALLINT PRIMARY KEY,
                document JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pnl_calculations (
                name TEXT PRIMARY KEY,
                document JSONB NOT NULL,
                saved_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn load_reference_config(&self) -> Result<Option<ReferenceConfig>, StoreError> {
        let config = sqlx::query_scalar::<_, Json<ReferenceConfig>>(
            r#"
            SELECT document
            FROM pnl_reference_config
            WHERE id = $1
            "#,
        )
        .bind(REFERENCE_CONFIG_ID)
        .fetch_optional(&self.pool)
        .await?;

        Ok(config.map(|c| c.0))
    }

    pub async fn save_reference_config(&self, config: &ReferenceConfig) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO pnl_reference_config (id, document, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (id) DO UPDATE
               SET document = EXCLUDED.document,
                   updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(REFERENCE_CONFIG_ID)
        .bind(Json(config))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn save_calculation(&self, calculation: &SavedCalculation) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO pnl_calculations (name, document, saved_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE
               SET document = EXCLUDED.document,
                   saved_at = EXCLUDED.saved_at
            "#,
        )
        .bind(&calculation.name)
        .bind(Json(calculation))
        .bind(calculation.saved_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn load_calculation(&self, name: &str) -> Result<Option<SavedCalculation>, StoreError> {
        let row = sqlx::query_as::<_, CalculationRow>(
            r#"
            SELECT name, document
            FROM pnl_calculations
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CalculationRow::into_calculation))
    }

    pub async fn list_calculations(&self) -> Result<Vec<SavedCalculation>, StoreError> {
        let rows = sqlx::query_as::<_, CalculationRow>(
            r#"
            SELECT name, document
            FROM pnl_calculations
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CalculationRow::into_calculation).collect())
    }

    pub async fn delete_calculation(&self, name: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM pnl_calculations
            WHERE name = $1
            "#,
        )
        .bind(name)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
