//! Gemini-backed advisory generation
//!
//! Thin client for the `generateContent` REST endpoint. One short prompt
//! per alert kind, plain-text response.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AdvisoryError, AdvisoryProvider, AdvisoryRequest};
use async_trait::async_trait;
use tracker::WellnessAlert;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Gemini advisory client.
pub struct GeminiAdvisor {
    api_key: String,
    model: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

fn first_text(response: &GeminiResponse) -> Option<&str> {
    response
        .candidates
        .first()
        .and_then(|c| c.content.parts.first())
        .map(|p| p.text.as_str())
}

fn build_prompt(request: &AdvisoryRequest) -> String {
    let session_min = (request.session_seconds as f64 / 60.0 * 10.0).round() / 10.0;
    match request.kind {
        WellnessAlert::DryEyes => format!(
            "A user has been on screen for {} minutes. Their blink rate is {} blinks/min, \
             which is {}% below normal. Their eyes are likely dry and strained. \
             Give a SHORT (2-3 sentence) friendly, personalized eye health tip. \
             Be specific, warm, and actionable. Do not use bullet points.",
            session_min, request.blink_rate, request.rate_drop_pct
        ),
        WellnessAlert::Drowsy => format!(
            "A user has been on screen for {} minutes and is showing drowsiness signs. \
             Their blink rate is {} blinks/min. \
             Give a SHORT (2-3 sentence) friendly tip to help them stay alert or take a \
             proper break. Be specific, warm, and actionable. Do not use bullet points.",
            session_min, request.blink_rate
        ),
        WellnessAlert::TooClose => format!(
            "A user has been sitting too close to their screen for {} minutes. \
             Give a SHORT (2-3 sentence) friendly reminder about proper screen distance \
             and posture. Be specific, warm, and actionable. Do not use bullet points.",
            session_min
        ),
    }
}

impl GeminiAdvisor {
    /// Create a client for the given API key and model.
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl AdvisoryProvider for GeminiAdvisor {
    async fn generate(&self, request: &AdvisoryRequest) -> Result<String, AdvisoryError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let body = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(request),
                }],
            }],
        };

        debug!(kind = request.kind.as_str(), model = %self.model, "requesting advisory text");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AdvisoryError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AdvisoryError::Request(format!(
                "status {status}: {error_text}"
            )));
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AdvisoryError::Malformed(e.to_string()))?;

        let text = first_text(&parsed)
            .map(|t| t.trim().to_string())
            .ok_or_else(|| AdvisoryError::Malformed("no candidates in response".into()))?;

        if text.is_empty() {
            return Err(AdvisoryError::Malformed("empty advisory text".into()));
        }

        debug!(kind = request.kind.as_str(), chars = text.len(), "advisory text received");
        Ok(text)
    }
}
