//! P&L service functions with store access.
//!
//! These build engine inputs from requests (catalog lookup, validation), run
//! the engine and persist results through the cache and store.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::cache::AppCache;
use crate::error::Result;
use crate::store::Store;

use super::calculators::calculate;
use super::models::{Calculation, LineItem, ReferenceConfig, SavedCalculation};
use super::requests::{CalculateRequest, LineItemRequest, SaveCalculationRequest};
use super::validation::{
    validate_calculation_name, validate_cost_inputs, validate_line_items,
    validate_reference_config,
};

/// Resolve request lines against the catalog.
///
/// Explicit `cogs_gbp` / `rrp_usd` values win. Otherwise COGS comes from the
/// catalog entry for the line's shipping type and the price from its default
/// RRP. A product missing from the catalog gets zero for whatever was not
/// supplied.
pub fn resolve_line_items(
    requests: &[LineItemRequest],
    reference: &ReferenceConfig,
) -> Vec<LineItem> {
    requests
        .iter()
        .map(|req| {
            let product = reference.product(&req.product_name);
            if product.is_none() && (req.cogs_gbp.is_none() || req.rrp_usd.is_none()) {
                warn!(
                    product = %req.product_name,
                    "Product not in catalog, defaulting missing values to zero"
                );
            }

            let cogs_gbp = req
                .cogs_gbp
                .or_else(|| product.map(|p| p.cogs_gbp(req.shipping_type)))
                .unwrap_or(Decimal::ZERO);

            let rrp_usd = req
                .rrp_usd
                .or_else(|| product.and_then(|p| p.default_rrp_usd))
                .unwrap_or(Decimal::ZERO);

            LineItem {
                product_name: req.product_name.clone(),
                description: req.description.clone(),
                shipping_type: req.shipping_type,
                quantity: req.quantity,
                cogs_gbp,
                rrp_usd,
            }
        })
        .collect()
}

/// Load the reference configuration, falling back to defaults when none has
/// been saved yet.
pub async fn load_reference_config(store: &Store, cache: &AppCache) -> Result<Arc<ReferenceConfig>> {
    if let Some(cached) = cache.get_reference_config().await {
        debug!("Cache HIT for reference config");
        return Ok(cached);
    }

    debug!("Cache MISS for reference config");
    let config = Arc::new(store.load_reference_config().await?.unwrap_or_default());
    cache.put_reference_config(config.clone()).await;
    Ok(config)
}

/// Validate and replace the reference configuration.
pub async fn save_reference_config(
    store: &Store,
    cache: &AppCache,
    config: ReferenceConfig,
) -> Result<Arc<ReferenceConfig>> {
    validate_reference_config(&config)?;

    store.save_reference_config(&config).await?;
    let config = Arc::new(config);
    cache.put_reference_config(config.clone()).await;

    info!(
        products = config.products.len(),
        exchange_rate = %config.exchange_rate,
        "Reference configuration saved"
    );
    Ok(config)
}

/// Turn a request into validated engine inputs and run the engine.
pub fn calculate_with_reference(
    request: &CalculateRequest,
    reference: &ReferenceConfig,
) -> Result<(Vec<LineItem>, Calculation)> {
    validate_reference_config(reference)?;
    validate_cost_inputs(&request.costs)?;

    let unknown = request.costs.unknown_keys();
    if !unknown.is_empty() {
        debug!(keys = ?unknown, "Ignoring unrecognized cost inputs");
    }

    let items = resolve_line_items(&request.line_items, reference);
    validate_line_items(&items)?;

    let calculation = calculate(&items, &request.costs, reference);
    Ok((items, calculation))
}

/// Run a calculation against the current reference configuration.
pub async fn run_calculation(
    store: &Store,
    cache: &AppCache,
    request: &CalculateRequest,
) -> Result<(Vec<LineItem>, Calculation)> {
    let reference = load_reference_config(store, cache).await?;
    calculate_with_reference(request, &reference)
}

/// Calculate and persist under the request's name, replacing any record
/// already saved under it.
pub async fn save_calculation(
    store: &Store,
    cache: &AppCache,
    request: SaveCalculationRequest,
) -> Result<Arc<SavedCalculation>> {
    validate_calculation_name(&request.name)?;

    let (items, calculation) = run_calculation(store, cache, &request.calculation()).await?;

    let saved = SavedCalculation {
        name: request.name,
        products: items,
        summary: calculation.products,
        p_and_l_summary: calculation.p_and_l,
        costs: request.costs,
        saved_at: Utc::now(),
    };

    store.save_calculation(&saved).await?;
    let saved = Arc::new(saved);
    cache.put_calculation(saved.clone()).await;

    info!(name = %saved.name, lines = saved.products.len(), "Calculation saved");
    Ok(saved)
}

/// Load a saved calculation by exact name.
pub async fn load_calculation(
    store: &Store,
    cache: &AppCache,
    name: &str,
) -> Result<Option<Arc<SavedCalculation>>> {
    validate_calculation_name(name)?;

    if let Some(cached) = cache.get_calculation(name).await {
        debug!("Cache HIT for calculation: {}", name);
        return Ok(Some(cached));
    }

    debug!("Cache MISS for calculation: {}", name);
    let Some(calculation) = store.load_calculation(name).await? else {
        return Ok(None);
    };

    let calculation = Arc::new(calculation);
    cache.put_calculation(calculation.clone()).await;
    Ok(Some(calculation))
}

/// All saved calculations, sorted by name.
pub async fn list_calculations(store: &Store) -> Result<Vec<SavedCalculation>> {
    Ok(store.list_calculations().await?)
}

/// Delete a saved calculation. Returns false when nothing was saved under the name.
pub async fn delete_calculation(store: &Store, cache: &AppCache, name: &str) -> Result<bool> {
    validate_calculation_name(name)?;

    let deleted = store.delete_calculation(name).await?;
    cache.invalidate_calculation(name).await;

    if deleted {
        info!(name = %name, "Calculation deleted");
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, ValidationError};
    use crate::pnl::models::{keys, CostInputs, Product, ShippingType};
    use crate::store::FileStore;
    use rust_decimal_macros::dec;

    fn catalog() -> ReferenceConfig {
        ReferenceConfig {
            products: vec![Product {
                name: "Trtl Pillow".to_string(),
                cogs_gbp_sea: dec!(5),
                cogs_gbp_air: dec!(7),
                default_rrp_usd: Some(dec!(20)),
            }],
            ..ReferenceConfig::default()
        }
    }

    fn request_line(name: &str, shipping_type: ShippingType) -> LineItemRequest {
        LineItemRequest {
            product_name: name.to_string(),
            description: String::new(),
            shipping_type,
            quantity: 100,
            cogs_gbp: None,
            rrp_usd: None,
        }
    }

    fn temp_store() -> Store {
        let dir = std::env::temp_dir().join(format!("pnl-services-{}", uuid::Uuid::new_v4()));
        FileStore::new(dir).into()
    }

    #[test]
    fn test_resolve_uses_catalog_by_shipping_type() {
        let items = resolve_line_items(
            &[
                request_line("Trtl Pillow", ShippingType::Sea),
                request_line("Trtl Pillow", ShippingType::Air),
            ],
            &catalog(),
        );
        assert_eq!(items[0].cogs_gbp, dec!(5));
        assert_eq!(items[1].cogs_gbp, dec!(7));
        assert_eq!(items[0].rrp_usd, dec!(20));
    }

    #[test]
    fn test_resolve_explicit_values_win() {
        let mut line = request_line("Trtl Pillow", ShippingType::Sea);
        line.cogs_gbp = Some(dec!(4.5));
        line.rrp_usd = Some(dec!(24.99));

        let items = resolve_line_items(&[line], &catalog());
        assert_eq!(items[0].cogs_gbp, dec!(4.5));
        assert_eq!(items[0].rrp_usd, dec!(24.99));
    }

    #[test]
    fn test_resolve_unknown_product_defaults_to_zero() {
        let items = resolve_line_items(&[request_line("Mystery", ShippingType::Sea)], &catalog());
        assert_eq!(items[0].cogs_gbp, Decimal::ZERO);
        assert_eq!(items[0].rrp_usd, Decimal::ZERO);
    }

    #[test]
    fn test_calculate_with_reference() {
        let request = CalculateRequest {
            line_items: vec![request_line("Trtl Pillow", ShippingType::Sea)],
            costs: CostInputs::new().with(keys::COMMISSION_PERCENT, dec!(20)),
        };
        let (items, calculation) = calculate_with_reference(&request, &catalog()).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(calculation.p_and_l.gross_profit, dec!(725));
    }

    #[test]
    fn test_calculate_rejects_negative_price() {
        let mut line = request_line("Trtl Pillow", ShippingType::Sea);
        line.rrp_usd = Some(dec!(-1));
        let request = CalculateRequest {
            line_items: vec![line],
            costs: CostInputs::new(),
        };

        let err = calculate_with_reference(&request, &catalog()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::Negative { .. })
        ));
    }

    #[test]
    fn test_calculate_rejects_non_positive_exchange_rate() {
        let reference = ReferenceConfig {
            exchange_rate: dec!(-1.25),
            ..catalog()
        };
        let request = CalculateRequest {
            line_items: vec![],
            costs: CostInputs::new(),
        };
        assert!(calculate_with_reference(&request, &reference).is_err());
    }

    #[tokio::test]
    async fn test_reference_config_defaults_then_saved() {
        let store = temp_store();
        let cache = AppCache::default();

        let config = load_reference_config(&store, &cache).await.unwrap();
        assert_eq!(*config, ReferenceConfig::default());

        save_reference_config(&store, &cache, catalog()).await.unwrap();
        let config = load_reference_config(&store, &cache).await.unwrap();
        assert_eq!(config.products.len(), 1);

        // A fresh cache reads the same data back from the store
        let config = load_reference_config(&store, &AppCache::default())
            .await
            .unwrap();
        assert_eq!(*config, catalog());
    }

    #[tokio::test]
    async fn test_save_load_delete_calculation() {
        let store = temp_store();
        let cache = AppCache::default();
        save_reference_config(&store, &cache, catalog()).await.unwrap();

        let request = SaveCalculationRequest {
            name: "Amazon US launch".to_string(),
            line_items: vec![request_line("Trtl Pillow", ShippingType::Sea)],
            costs: CostInputs::new().with(keys::COMMISSION_PERCENT, dec!(20)),
        };
        let saved = save_calculation(&store, &cache, request).await.unwrap();
        assert_eq!(saved.p_and_l_summary.total_costs, dec!(1275));

        let loaded = load_calculation(&store, &AppCache::default(), "Amazon US launch")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(*loaded, *saved);

        assert!(delete_calculation(&store, &cache, "Amazon US launch")
            .await
            .unwrap());
        assert!(load_calculation(&store, &cache, "Amazon US launch")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_load_and_delete_reject_path_names() {
        let store = temp_store();
        let cache = AppCache::default();
        save_reference_config(&store, &cache, catalog()).await.unwrap();

        for name in ["../config", "..", "a/b"] {
            assert!(matches!(
                load_calculation(&store, &cache, name).await,
                Err(AppError::Validation(_))
            ));
            assert!(matches!(
                delete_calculation(&store, &cache, name).await,
                Err(AppError::Validation(_))
            ));
        }

        let config = load_reference_config(&store, &AppCache::default())
            .await
            .unwrap();
        assert_eq!(*config, catalog());
    }

    #[tokio::test]
    async fn test_save_rejects_bad_name() {
        let store = temp_store();
        let cache = AppCache::default();
        let request = SaveCalculationRequest {
            name: "../escape".to_string(),
            line_items: vec![],
            costs: CostInputs::new(),
        };
        assert!(matches!(
            save_calculation(&store, &cache, request).await,
            Err(AppError::Validation(_))
        ));
    }
}
