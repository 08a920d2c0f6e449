//! The `{success, error?}` bodies returned by the JSON command endpoints.

use axum::body::Bytes;
use axum::Json;
use serde_json::{json, Map, Value};
use std::fmt::Debug;

pub const GENERIC_FAILURE: &str = "An unexpected error occurred";

pub fn success() -> Json<Value> {
    Json(json!({ "success": true }))
}

/// `{success: true}` plus every field of `extra`.
pub fn success_with(extra: Value) -> Json<Value> {
    let mut body = Map::new();
    body.insert("success".to_string(), Value::Bool(true));
    if let Value::Object(fields) = extra {
        body.extend(fields);
    }
    Json(Value::Object(body))
}

pub fn failure(message: impl Into<String>) -> Json<Value> {
    Json(json!({ "success": false, "error": message.into() }))
}

/// Logs `error` and answers with a generic message.
pub fn internal_failure(context: &str, error: &impl Debug) -> Json<Value> {
    tracing::error!(error = ?error, "{}", context);
    failure(GENERIC_FAILURE)
}

/// Decodes a command body, treating an empty one as `{}`.
pub fn parse_body(body: &Bytes) -> Result<Value, Json<Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body).map_err(|_| failure("Invalid JSON payload"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_with_merges_fields() {
        let Json(body) = success_with(json!({ "report_id": 7 }));
        assert_eq!(body, json!({ "success": true, "report_id": 7 }));
    }

    #[test]
    fn bodies_parse_or_fail_softly() {
        assert_eq!(parse_body(&Bytes::from_static(b"  ")).unwrap(), json!({}));
        assert_eq!(parse_body(&Bytes::from_static(b"{\"a\":1}")).unwrap(), json!({ "a": 1 }));
        let Json(err) = parse_body(&Bytes::from_static(b"{nope")).unwrap_err();
        assert_eq!(err["success"], json!(false));
    }
}
