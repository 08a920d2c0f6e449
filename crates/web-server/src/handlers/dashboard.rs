use crate::envelope::{self, parse_body};
use crate::{error::AppError, identity::CurrentUser, AppState};
use analytics::DashboardSummary;
use axum::{body::Bytes, extract::State, Json};
use core_types::ProductFilter;
use preferences::{WidgetDescriptor, WidgetLayout, WidgetUpdate};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct DashboardWidget {
    pub id: String,
    pub name: String,
    pub data: Value,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub theme: core_types::Theme,
    /// Enabled widgets in display order.
    pub widgets: Vec<DashboardWidget>,
    pub summary: DashboardSummary,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub widgets: Vec<WidgetDescriptor>,
}

/// The slice of the summary a widget displays. Unknown widgets show nothing.
fn widget_data(widget_id: &str, summary: &DashboardSummary) -> Value {
    let value = match widget_id {
        "total_products" => serde_json::to_value(summary.total_products),
        "total_categories" => serde_json::to_value(summary.total_categories),
        "low_stock_products" => serde_json::to_value(summary.low_stock_products),
        "total_value" => serde_json::to_value(summary.total_value),
        "recent_products" => serde_json::to_value(&summary.recent_products),
        "categories_with_counts" => serde_json::to_value(&summary.categories_with_counts),
        _ => return Value::Null,
    };
    value.unwrap_or(Value::Null)
}

/// # GET /api/dashboard
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<DashboardResponse>, AppError> {
    let products = state.store.list_products(user_id, &ProductFilter::default()).await?;
    let categories = state.store.list_categories(user_id).await?;
    let (preference, layout) = state.widget_layout(user_id).await?;

    let summary = state.engine.dashboard_summary(
        &products,
        categories,
        state.analytics.recent_products_limit,
        state.analytics.category_overview_limit,
    );

    let widgets = layout
        .ordered_enabled_widgets()
        .into_iter()
        .map(|id| DashboardWidget {
            id: id.to_string(),
            name: preferences::describe(id).0,
            data: widget_data(id, &summary),
        })
        .collect();

    Ok(Json(DashboardResponse {
        theme: preference.theme,
        widgets,
        summary,
    }))
}

/// # GET /api/dashboard/settings
/// Every configured widget, enabled or not, sorted by order.
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<SettingsResponse>, AppError> {
    let (_, layout) = state.widget_layout(user_id).await?;
    Ok(Json(SettingsResponse {
        widgets: layout.settings(),
    }))
}

/// # POST /api/dashboard/settings
/// Merges a partial `{widgets: {id: {enabled, order}}}` update into the layout.
pub async fn save_settings(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    body: Bytes,
) -> Json<Value> {
    let payload = match parse_body(&body) {
        Ok(payload) => payload,
        Err(failure) => return failure,
    };
    let update = match WidgetUpdate::from_payload(&payload) {
        Ok(update) => update,
        Err(e) => return envelope::failure(e.to_string()),
    };

    let mut layout = match state.widget_layout(user_id).await {
        Ok((_, layout)) => layout,
        Err(e) => return envelope::internal_failure("Failed to load dashboard settings.", &e),
    };
    let ignored = layout.apply_update(&update);
    if !ignored.is_empty() {
        tracing::debug!(user_id = %user_id, ?ignored, "Ignoring unknown widgets in settings update.");
    }

    persist(&state, user_id, &layout).await
}

/// # POST /api/dashboard/settings/reset
pub async fn reset_settings(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Json<Value> {
    let layout = WidgetLayout::from_defaults(state.widget_defaults.clone());
    persist(&state, user_id, &layout).await
}

async fn persist(state: &AppState, user_id: uuid::Uuid, layout: &WidgetLayout) -> Json<Value> {
    match state.store.save_dashboard_widgets(user_id, &layout.to_json()).await {
        Ok(_) => envelope::success(),
        Err(e) => envelope::internal_failure("Failed to save dashboard settings.", &e),
    }
}
