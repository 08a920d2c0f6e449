use crate::{error::AppError, identity::CurrentUser, AppState};
use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::WithRejection;
use core_types::{Category, CategoryWithCount, NewCategory};
use std::sync::Arc;

/// # GET /api/categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<CategoryWithCount>>, AppError> {
    Ok(Json(state.store.list_categories(user_id).await?))
}

/// # POST /api/categories
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    WithRejection(Json(input), _): WithRejection<Json<NewCategory>, AppError>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = state.store.create_category(user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}
