//! HTTP handlers for the P&L API.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::error::{AppError, Result};
use crate::AppState;

use super::csv::{line_items_csv, product_summaries_csv};
use super::models::{Product, ReferenceConfig};
use super::requests::{CalculateRequest, SaveCalculationRequest};
use super::responses::{CalculationResponse, SavedCalculationListEntry, SavedCalculationResponse};
use super::services;

/// Routes mounted under `/api/pnl`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/calculate", post(calculate))
        .route("/config", get(get_config).put(put_config))
        .route("/config/products/:name", get(get_product))
        .route(
            "/calculations",
            get(list_calculations).post(save_calculation),
        )
        .route(
            "/calculations/:name",
            get(get_calculation).delete(delete_calculation),
        )
        .route("/calculations/:name/csv", get(calculation_csv))
        .route("/calculations/:name/summary.csv", get(summary_csv))
}

/// Calculate product summaries and P&L without saving
async fn calculate(
    State(state): State<AppState>,
    Json(request): Json<CalculateRequest>,
) -> Result<Json<CalculationResponse>> {
    let (_, calculation) = services::run_calculation(&state.store, &state.cache, &request).await?;
    Ok(Json(CalculationResponse::from(&calculation)))
}

async fn get_config(State(state): State<AppState>) -> Result<Json<ReferenceConfig>> {
    let config = services::load_reference_config(&state.store, &state.cache).await?;
    Ok(Json((*config).clone()))
}

async fn put_config(
    State(state): State<AppState>,
    Json(config): Json<ReferenceConfig>,
) -> Result<Json<ReferenceConfig>> {
    let config = services::save_reference_config(&state.store, &state.cache, config).await?;
    Ok(Json((*config).clone()))
}

/// Catalog entry lookup, used by forms to prefill COGS and RRP
async fn get_product(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Product>> {
    let config = services::load_reference_config(&state.store, &state.cache).await?;
    config
        .product(&name)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Product '{name}'")))
}

async fn list_calculations(
    State(state): State<AppState>,
) -> Result<Json<Vec<SavedCalculationListEntry>>> {
    let calculations = services::list_calculations(&state.store).await?;

    let entries = calculations
        .iter()
        .map(|c| SavedCalculationListEntry {
            name: c.name.clone(),
            data: SavedCalculationResponse::from(c),
            csv: line_items_csv(&c.products),
        })
        .collect();

    Ok(Json(entries))
}

async fn save_calculation(
    State(state): State<AppState>,
    Json(request): Json<SaveCalculationRequest>,
) -> Result<(StatusCode, Json<SavedCalculationResponse>)> {
    let saved = services::save_calculation(&state.store, &state.cache, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(SavedCalculationResponse::from(saved.as_ref())),
    ))
}

async fn get_calculation(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<SavedCalculationResponse>> {
    let calculation = services::load_calculation(&state.store, &state.cache, &name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Calculation '{name}'")))?;
    Ok(Json(SavedCalculationResponse::from(calculation.as_ref())))
}

async fn delete_calculation(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode> {
    if services::delete_calculation(&state.store, &state.cache, &name).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Calculation '{name}'")))
    }
}

/// Line items of a saved calculation as a CSV download
async fn calculation_csv(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse> {
    let calculation = services::load_calculation(&state.store, &state.cache, &name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Calculation '{name}'")))?;

    Ok(csv_download(&name, line_items_csv(&calculation.products)))
}

/// Rounded product summary table of a saved calculation as a CSV download
async fn summary_csv(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse> {
    let calculation = services::load_calculation(&state.store, &state.cache, &name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Calculation '{name}'")))?;

    Ok(csv_download(
        &format!("{name}-summary"),
        product_summaries_csv(&calculation.summary),
    ))
}

fn csv_download(name: &str, body: String) -> impl IntoResponse {
    let filename = name.replace(['"', '\r', '\n'], "_");
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}.csv\""),
            ),
        ],
        body,
    )
}
