use crate::envelope::{self, parse_body};
use crate::{error::AppError, identity::CurrentUser, AppState};
use axum::{body::Bytes, extract::State, Json};
use core_types::Theme;
use preferences::{parse_theme, WidgetDescriptor};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct PreferencesResponse {
    pub theme: Theme,
    pub widgets: Vec<WidgetDescriptor>,
}

/// # GET /api/preferences
pub async fn get_preferences(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<PreferencesResponse>, AppError> {
    let (preference, layout) = state.widget_layout(user_id).await?;
    Ok(Json(PreferencesResponse {
        theme: preference.theme,
        widgets: layout.settings(),
    }))
}

/// # POST /api/preferences/theme
/// Accepts `{theme: "light" | "dark"}`.
pub async fn save_theme(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    body: Bytes,
) -> Json<Value> {
    let theme = match parse_body(&body).map(|payload| parse_theme(&payload)) {
        Ok(Ok(theme)) => theme,
        Ok(Err(e)) => return envelope::failure(e.to_string()),
        Err(failure) => return failure,
    };

    match state.store.save_theme(user_id, theme).await {
        Ok(preference) => envelope::success_with(json!({ "theme": preference.theme })),
        Err(e) => envelope::internal_failure("Failed to save theme preference.", &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::dashboard;
    use crate::test_support::state_with;
    use database::MemoryStore;
    use uuid::Uuid;

    #[tokio::test]
    async fn theme_round_trips() {
        let state = state_with(Arc::new(MemoryStore::new()));
        let user = Uuid::new_v4();

        let Json(saved) = save_theme(
            State(state.clone()),
            CurrentUser(user),
            Bytes::from_static(br#"{"theme":"dark"}"#),
        )
        .await;
        assert_eq!(saved, json!({ "success": true, "theme": "dark" }));

        let Json(prefs) = get_preferences(State(state), CurrentUser(user)).await.unwrap();
        assert_eq!(prefs.theme, Theme::Dark);
        assert_eq!(prefs.widgets.len(), 6);
    }

    #[tokio::test]
    async fn invalid_theme_is_reported() {
        let state = state_with(Arc::new(MemoryStore::new()));
        let Json(body) = save_theme(
            State(state),
            CurrentUser(Uuid::new_v4()),
            Bytes::from_static(br#"{"theme":"solarized"}"#),
        )
        .await;
        assert_eq!(body, json!({ "success": false, "error": "Invalid theme" }));
    }

    #[tokio::test]
    async fn saving_theme_keeps_widget_settings() {
        let state = state_with(Arc::new(MemoryStore::new()));
        let user = Uuid::new_v4();
        dashboard::save_settings(
            State(state.clone()),
            CurrentUser(user),
            Bytes::from_static(br#"{"widgets":{"recent_products":{"enabled":false,"order":2}}}"#),
        )
        .await;

        save_theme(
            State(state.clone()),
            CurrentUser(user),
            Bytes::from_static(br#"{"theme":"dark"}"#),
        )
        .await;

        let Json(prefs) = get_preferences(State(state), CurrentUser(user)).await.unwrap();
        let recent = prefs.widgets.iter().find(|w| w.id == "recent_products").unwrap();
        assert!(!recent.enabled);
    }
}
