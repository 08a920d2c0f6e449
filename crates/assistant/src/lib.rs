//! # Stockroom Assistant
//!
//! Answers free-text inventory questions, either through a hosted generative
//! language model or, when no API key is configured, from canned replies.
//!
//! ## Public API
//!
//! - `AssistantService`: built once from `AssistantSettings` and shared.
//! - `AssistantReply`: the tagged outcome of every query. Failures never
//!   surface as errors; the caller decides how to render them.

use crate::error::AssistantError;
use configuration::AssistantSettings;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod canned;
pub mod error;

const API_KEY_HEADER: &str = "x-goog-api-key";

const SYSTEM_MESSAGE: &str = "You are an AI assistant for an inventory management system. \
     You can answer questions about inventory, products, sales, and related topics. \
     Keep your answers concise and focused on inventory management.";

/// The outcome of one assistant query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssistantReply {
    Answered {
        text: String,
        /// True when the text came from the canned replies.
        simulated: bool,
    },
    Failed {
        reason: String,
    },
}

// --- generateContent wire types ---

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, if it has any.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[derive(Debug, Clone)]
struct ModelClient {
    client: Client,
    url: String,
    api_key: String,
}

/// Routes queries to the model API or the canned replies.
#[derive(Debug, Clone)]
pub struct AssistantService {
    model: Option<ModelClient>,
}

impl AssistantService {
    /// Builds the service. Without an API key every answer is canned.
    pub fn new(settings: &AssistantSettings) -> Result<Self, AssistantError> {
        if !settings.is_configured() {
            tracing::warn!("Assistant model API key is not configured, using canned replies.");
            return Ok(Self::canned());
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        let url = format!(
            "{}/{}:generateContent",
            settings.endpoint.trim_end_matches('/'),
            settings.model
        );
        Ok(Self {
            model: Some(ModelClient {
                client,
                url,
                api_key: settings.api_key.clone().unwrap_or_default(),
            }),
        })
    }

    /// A service that only ever answers from the canned replies.
    pub fn canned() -> Self {
        Self { model: None }
    }

    pub fn is_simulated(&self) -> bool {
        self.model.is_none()
    }

    /// Answers `query`. Blank queries and any model failure come back as `Failed`.
    pub async fn answer(&self, query: &str) -> AssistantReply {
        let query = query.trim();
        if query.is_empty() {
            return AssistantReply::Failed {
                reason: AssistantError::EmptyQuery.to_string(),
            };
        }

        let Some(model) = &self.model else {
            return AssistantReply::Answered {
                text: canned::reply_for(query).to_string(),
                simulated: true,
            };
        };

        match model.generate(&build_prompt(query)).await {
            Ok(text) => AssistantReply::Answered {
                text,
                simulated: false,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Assistant model call failed.");
                AssistantReply::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

impl ModelClient {
    async fn generate(&self, prompt: &str) -> Result<String, AssistantError> {
        let payload = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to decode error response".to_string());
            return Err(AssistantError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed.into_text().ok_or(AssistantError::EmptyResponse)
    }
}

/// The system message followed by the user's query.
pub fn build_prompt(query: &str) -> String {
    format!("{}\n\nUser query: {}", SYSTEM_MESSAGE, query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn blank_queries_fail_without_calling_anything() {
        let service = AssistantService::canned();
        for query in ["", "   ", "\n\t"] {
            assert_eq!(
                service.answer(query).await,
                AssistantReply::Failed {
                    reason: "Query cannot be empty".to_string()
                }
            );
        }
    }

    #[tokio::test]
    async fn unconfigured_service_answers_from_canned_replies() {
        let service = AssistantService::new(&AssistantSettings::default()).unwrap();
        assert!(service.is_simulated());

        match service.answer("What were my sales?").await {
            AssistantReply::Answered { text, simulated } => {
                assert!(simulated);
                assert_eq!(text, canned::reply_for("sales"));
            }
            other => panic!("unexpected reply {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_model_becomes_a_failed_reply() {
        let settings = AssistantSettings {
            api_key: Some("test-key".to_string()),
            endpoint: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..AssistantSettings::default()
        };
        let service = AssistantService::new(&settings).unwrap();
        assert!(!service.is_simulated());

        let reply = service.answer("How much stock do I have?").await;
        assert!(matches!(reply, AssistantReply::Failed { .. }));
    }

    #[tokio::test]
    async fn failure_reasons_never_carry_the_api_key() {
        let settings = AssistantSettings {
            api_key: Some("SECRET-KEY-123".to_string()),
            endpoint: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..AssistantSettings::default()
        };
        let service = AssistantService::new(&settings).unwrap();

        match service.answer("low stock?").await {
            AssistantReply::Failed { reason } => {
                assert!(!reason.contains("SECRET-KEY-123"), "leaked key in {reason}");
                assert!(!reason.contains("127.0.0.1"), "leaked endpoint in {reason}");
            }
            other => panic!("unexpected reply {other:?}"),
        }
    }

    #[test]
    fn prompt_wraps_the_query() {
        let prompt = build_prompt("low stock?");
        assert!(prompt.starts_with("You are an AI assistant for an inventory management system."));
        assert!(prompt.ends_with("\n\nUser query: low stock?"));
    }

    #[test]
    fn response_text_comes_from_first_candidate() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "You have " }, { "text": "3 items." }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(response.into_text().as_deref(), Some("You have 3 items."));

        let empty: GenerateResponse = serde_json::from_value(json!({ "candidates": [] })).unwrap();
        assert_eq!(empty.into_text(), None);
    }

    #[test]
    fn replies_serialize_with_a_status_tag() {
        let value = serde_json::to_value(AssistantReply::Failed {
            reason: "down".to_string(),
        })
        .unwrap();
        assert_eq!(value, json!({ "status": "failed", "reason": "down" }));
    }
}
