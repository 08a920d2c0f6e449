use crate::error::PreferenceError;
use core_types::Theme;
use serde_json::Value;

/// Reads the `theme` field of a JSON payload. Only `"light"` and `"dark"` are accepted.
pub fn parse_theme(payload: &Value) -> Result<Theme, PreferenceError> {
    payload
        .get("theme")
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse::<Theme>().ok())
        .ok_or(PreferenceError::InvalidTheme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_known_themes() {
        assert_eq!(parse_theme(&json!({ "theme": "dark" })), Ok(Theme::Dark));
        assert_eq!(parse_theme(&json!({ "theme": "light" })), Ok(Theme::Light));
    }

    #[test]
    fn rejects_missing_or_unknown_themes() {
        assert_eq!(parse_theme(&json!({})), Err(PreferenceError::InvalidTheme));
        assert_eq!(parse_theme(&json!({ "theme": "Dark" })), Err(PreferenceError::InvalidTheme));
        assert_eq!(parse_theme(&json!({ "theme": 1 })), Err(PreferenceError::InvalidTheme));
        assert_eq!(parse_theme(&json!("dark")), Err(PreferenceError::InvalidTheme));
    }
}
