use crate::envelope::{self, parse_body};
use crate::{error::AppError, identity::CurrentUser, AppState};
use axum::{body::Bytes, extract::State, Json};
use core_types::{NewSavedReport, ReportType, SavedReport};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Reads `{name, report_type, configuration?}`. Name and type are required.
fn parse_report(payload: &Value) -> Result<NewSavedReport, String> {
    let name = payload
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty());
    let report_type = payload
        .get("report_type")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty());
    let (Some(name), Some(report_type)) = (name, report_type) else {
        return Err("Missing required fields".to_string());
    };

    let report_type: ReportType = report_type.parse().map_err(|_| "Invalid report type".to_string())?;
    let configuration = match payload.get("configuration") {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(config) => config.clone(),
    };

    Ok(NewSavedReport {
        name: name.to_string(),
        report_type,
        configuration,
    })
}

/// # GET /api/reports
pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<SavedReport>>, AppError> {
    Ok(Json(state.store.list_reports(user_id).await?))
}

/// # POST /api/reports
/// Saves a report definition, replacing any existing report with the same name.
pub async fn save_report(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    body: Bytes,
) -> Json<Value> {
    let input = match parse_body(&body) {
        Ok(payload) => match parse_report(&payload) {
            Ok(input) => input,
            Err(message) => return envelope::failure(message),
        },
        Err(failure) => return failure,
    };

    match state.store.save_report(user_id, &input).await {
        Ok(report) => envelope::success_with(json!({ "report_id": report.id })),
        Err(e) => envelope::internal_failure("Failed to save report.", &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::state_with;
    use database::MemoryStore;
    use uuid::Uuid;

    fn bytes(value: Value) -> Bytes {
        Bytes::from(value.to_string())
    }

    #[tokio::test]
    async fn reports_are_upserted_by_name() {
        let state = state_with(Arc::new(MemoryStore::new()));
        let user = Uuid::new_v4();

        let Json(first) = save_report(
            State(state.clone()),
            CurrentUser(user),
            bytes(json!({ "name": "Monthly", "report_type": "sales", "configuration": { "days": 30 } })),
        )
        .await;
        let Json(second) = save_report(
            State(state.clone()),
            CurrentUser(user),
            bytes(json!({ "name": "Monthly", "report_type": "inventory" })),
        )
        .await;

        assert_eq!(first["success"], json!(true));
        assert_eq!(first["report_id"], second["report_id"]);

        let Json(reports) = list_reports(State(state), CurrentUser(user)).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].report_type, ReportType::Inventory);
        assert_eq!(reports[0].configuration, json!({}));
    }

    #[tokio::test]
    async fn missing_fields_are_reported() {
        let state = state_with(Arc::new(MemoryStore::new()));
        for payload in [json!({ "name": "Only name" }), json!({ "report_type": "sales" }), json!({})] {
            let Json(body) = save_report(State(state.clone()), CurrentUser(Uuid::new_v4()), bytes(payload)).await;
            assert_eq!(body, json!({ "success": false, "error": "Missing required fields" }));
        }
    }

    #[test]
    fn unknown_report_types_are_rejected() {
        let err = parse_report(&json!({ "name": "x", "report_type": "forecast" })).unwrap_err();
        assert_eq!(err, "Invalid report type");
    }
}
