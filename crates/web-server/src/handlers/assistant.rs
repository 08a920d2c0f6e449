use crate::envelope::{self, parse_body};
use crate::{identity::CurrentUser, AppState};
use assistant::AssistantReply;
use axum::{body::Bytes, extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// # POST /api/assistant/query
/// Accepts `{query}` and answers `{success, response}` or `{success: false, error}`.
pub async fn query(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    body: Bytes,
) -> Json<Value> {
    let payload = match parse_body(&body) {
        Ok(payload) => payload,
        Err(failure) => return failure,
    };
    let query = payload.get("query").and_then(Value::as_str).unwrap_or_default();

    match state.assistant.answer(query).await {
        AssistantReply::Answered { text, simulated } => {
            tracing::debug!(user_id = %user_id, simulated, "Assistant answered.");
            envelope::success_with(json!({ "response": text, "simulated": simulated }))
        }
        AssistantReply::Failed { reason } => envelope::failure(reason),
    }
}
