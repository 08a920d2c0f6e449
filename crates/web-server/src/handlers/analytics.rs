use crate::handlers::today;
use crate::{error::AppError, identity::CurrentUser, AppState};
use analytics::{catalog_value, DateWindow, PerformanceReport};
use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::WithRejection;
use chrono::NaiveDate;
use core_types::ProductFilter;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SalesTrendResponse {
    pub days: u32,
    pub dates: Vec<NaiveDate>,
    pub amounts: Vec<Decimal>,
    pub total_sales: Decimal,
    pub avg_daily_sales: Decimal,
    pub change_percentage: Decimal,
    pub synthetic: bool,
}

#[derive(Debug, Serialize)]
pub struct InventoryValueResponse {
    pub days: u32,
    pub dates: Vec<NaiveDate>,
    pub values: Vec<Decimal>,
    pub current_value: Decimal,
    pub change_percentage: Decimal,
    pub synthetic: bool,
}

/// Resolves `?days=` against the configured default and maximum.
fn resolve_window(state: &AppState, query: &WindowQuery) -> Result<DateWindow, AppError> {
    let days = match query.days {
        None => state.analytics.default_window_days,
        Some(days) => u32::try_from(days)
            .map_err(|_| AppError::BadRequest(format!("'days' must be between 0 and {}", state.analytics.max_window_days)))?,
    };
    Ok(state.engine.window(today(), days)?)
}

/// # GET /api/analytics/sales-trends
pub async fn sales_trends(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    WithRejection(Query(query), _): WithRejection<Query<WindowQuery>, AppError>,
) -> Result<Json<SalesTrendResponse>, AppError> {
    let window = resolve_window(&state, &query)?;
    let sales = state
        .store
        .sale_amounts_between(user_id, window.start, window.end)
        .await?;

    let report = state
        .engine
        .sales_trend(&sales, &window, &mut StdRng::from_entropy());

    Ok(Json(SalesTrendResponse {
        days: report.days,
        dates: report.series.dates,
        amounts: report.series.values,
        total_sales: report.total,
        avg_daily_sales: report.daily_average,
        change_percentage: report.change_percentage,
        synthetic: report.synthetic,
    }))
}

/// # GET /api/analytics/inventory-value
/// The series comes from snapshots. `current_value` is always the live catalog value.
pub async fn inventory_value(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    WithRejection(Query(query), _): WithRejection<Query<WindowQuery>, AppError>,
) -> Result<Json<InventoryValueResponse>, AppError> {
    let window = resolve_window(&state, &query)?;
    let snapshots = state
        .store
        .snapshot_values_between(user_id, window.start, window.end)
        .await?;

    let catalog = state
        .store
        .list_products(user_id, &ProductFilter::default())
        .await?;

    let report = state
        .engine
        .inventory_trend(&snapshots, &window, &mut StdRng::from_entropy());

    Ok(Json(InventoryValueResponse {
        days: report.days,
        dates: report.series.dates,
        values: report.series.values,
        current_value: catalog_value(&catalog),
        change_percentage: report.change_percentage,
        synthetic: report.synthetic,
    }))
}

/// # GET /api/analytics/product-performance
pub async fn product_performance(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<PerformanceReport>, AppError> {
    let catalog = state
        .store
        .list_products(user_id, &ProductFilter::default())
        .await?;
    let totals = state.store.product_sales_totals(user_id).await?;

    let report = state.engine.product_performance(
        &catalog,
        &totals,
        state.analytics.performance_list_size,
        &mut StdRng::from_entropy(),
    );
    Ok(Json(report))
}
