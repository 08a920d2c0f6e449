//! # Stockroom Web Server
//!
//! The JSON API in front of the inventory store.
//!
//! ## Architectural Principles
//!
//! - **Thin handlers:** Handlers resolve the current user, call the store and
//!   hand the records to the analytics and preferences crates. No business
//!   rules live here.
//! - **Two error styles:** Resource endpoints return HTTP status codes through
//!   `AppError`. JSON command endpoints (theme, dashboard settings, reports,
//!   assistant) always answer `200` with `{success, error?}`.
//! - **Upstream identity:** The authenticated user arrives in the `X-User-Id` header.
//!
//! ## Public API
//!
//! - `AppState`: shared state handed to every handler.
//! - `build_router`: the full route table, for embedding and tests.
//! - `run_server`: connects to the database and serves until Ctrl-C.

use analytics::AnalyticsEngine;
use assistant::AssistantService;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use configuration::{AnalyticsSettings, Config};
use core_types::UserPreference;
use database::{DbError, DbRepository, InventoryStore};
use preferences::{WidgetDefaults, WidgetLayout};
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

mod envelope;
pub mod error;
pub mod handlers;
pub mod identity;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn InventoryStore>,
    pub analytics: AnalyticsSettings,
    pub engine: AnalyticsEngine,
    pub widget_defaults: WidgetDefaults,
    pub assistant: AssistantService,
}

impl AppState {
    pub fn new(
        store: Arc<dyn InventoryStore>,
        analytics: AnalyticsSettings,
        assistant: AssistantService,
    ) -> Self {
        Self {
            store,
            engine: AnalyticsEngine::new(analytics.max_window_days),
            analytics,
            widget_defaults: WidgetDefaults::standard(),
            assistant,
        }
    }

    /// Loads (creating on first access) the user's preference and decodes its widget layout.
    pub(crate) async fn widget_layout(
        &self,
        user_id: Uuid,
    ) -> Result<(UserPreference, WidgetLayout), DbError> {
        let preference = self
            .store
            .get_or_create_preference(user_id, &self.widget_defaults.to_json())
            .await?;
        let layout = WidgetLayout::from_stored(
            preference.dashboard_widgets.as_ref(),
            self.widget_defaults.clone(),
        );
        Ok((preference, layout))
    }
}

/// Builds the route table with CORS, request tracing and a body size limit.
pub fn build_router(state: Arc<AppState>, body_limit_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/dashboard", get(handlers::dashboard::get_dashboard))
        .route(
            "/api/dashboard/settings",
            get(handlers::dashboard::get_settings).post(handlers::dashboard::save_settings),
        )
        .route("/api/dashboard/settings/reset", post(handlers::dashboard::reset_settings))
        .route("/api/preferences", get(handlers::preferences::get_preferences))
        .route("/api/preferences/theme", post(handlers::preferences::save_theme))
        .route(
            "/api/products",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/api/products/:id",
            get(handlers::products::get_product).put(handlers::products::update_product),
        )
        .route(
            "/api/categories",
            get(handlers::categories::list_categories).post(handlers::categories::create_category),
        )
        .route(
            "/api/sales",
            get(handlers::sales::list_sales).post(handlers::sales::record_sale),
        )
        .route("/api/snapshots", post(handlers::sales::record_snapshot))
        .route("/api/analytics/sales-trends", get(handlers::analytics::sales_trends))
        .route("/api/analytics/inventory-value", get(handlers::analytics::inventory_value))
        .route(
            "/api/analytics/product-performance",
            get(handlers::analytics::product_performance),
        )
        .route(
            "/api/reports",
            get(handlers::reports::list_reports).post(handlers::reports::save_report),
        )
        .route("/api/assistant/query", post(handlers::assistant::query))
        .with_state(state)
        .layer(cors)
        // Logs every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(body_limit_bytes))
}

/// The main function to configure and run the web server.
///
/// Tracing must already be initialised by the caller.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let db_pool = database::connect(&config.database).await?;
    database::run_migrations(&db_pool).await?;
    let store: Arc<dyn InventoryStore> = Arc::new(DbRepository::new(db_pool));

    let assistant = AssistantService::new(&config.assistant)?;
    let state = Arc::new(AppState::new(store, config.analytics.clone(), assistant));
    let app = build_router(state, config.server.body_limit_bytes);

    let addr = config.server.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Web server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = ?e, "Failed to listen for shutdown signal.");
            }
            tracing::info!("Shutdown signal received.");
        })
        .await?;

    Ok(())
}
