use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use lenstext_config::RecognitionConfig;
use lenstext_core::{
    ImagePayload, RecognitionFailure, RecognitionResult, Recognizer, EMPTY_RESPONSE_FALLBACK,
};
use lenstext_logging::redact_sensitive_data;

/// Instruction sent alongside every image.
pub const OCR_PROMPT: &str = "Please perform Optical Character Recognition (OCR) on this image. \
Extract all visible text exactly as it appears. Preserve line breaks where possible. \
If there is no text, reply with 'No text detected'.";

/// Google Gemini vision recognizer.
pub struct GeminiRecognizer {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    temperature: f32,
}

impl GeminiRecognizer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_config(&RecognitionConfig {
            api_key: Some(api_key.into()),
            ..Default::default()
        })
    }

    pub fn from_config(config: &RecognitionConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key().map(str::to_string),
            model: config.model().to_string(),
            base_url: config.base_url().to_string(),
            temperature: config.temperature(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn call(&self, api_key: &str, payload: &ImagePayload) -> Result<String> {
        let body = build_request(payload, self.temperature);
        debug!(
            model = %self.model,
            mime_type = %payload.mime_type(),
            bytes = payload.len(),
            "Sending request to Gemini"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .context("Gemini HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini returned {}: {}", status, error_body);
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;
        Ok(extract_text(&parsed))
    }
}

#[async_trait]
impl Recognizer for GeminiRecognizer {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn recognize_text(
        &self,
        payload: &ImagePayload,
    ) -> Result<RecognitionResult, RecognitionFailure> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("No Gemini API key configured; set GEMINI_API_KEY or recognition.apiKey");
            return Err(RecognitionFailure::unavailable());
        };

        let start = Instant::now();
        match self.call(api_key, payload).await {
            Ok(text) => {
                let text = if text.is_empty() {
                    EMPTY_RESPONSE_FALLBACK.to_string()
                } else {
                    text
                };
                info!(
                    model = %self.model,
                    chars = text.chars().count(),
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Gemini recognition complete"
                );
                Ok(RecognitionResult::new(text))
            }
            Err(e) => {
                warn!(
                    model = %self.model,
                    error = %redact_sensitive_data(&format!("{e:#}")),
                    "Gemini recognition failed"
                );
                Err(RecognitionFailure::unavailable())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Base64 without any data-URL prefix.
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationConfig {
    pub temperature: f32,
}

#[derive(Debug, Deserialize, Default)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

/// Build the request body for one image: the image part first, then the
/// prompt.
pub fn build_request(payload: &ImagePayload, temperature: f32) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![
                Part {
                    inline_data: Some(InlineData {
                        mime_type: payload.mime_type().to_string(),
                        data: payload.to_base64(),
                    }),
                    text: None,
                },
                Part {
                    inline_data: None,
                    text: Some(OCR_PROMPT.to_string()),
                },
            ],
        }],
        generation_config: GenerationConfig { temperature },
    }
}

/// Text of the first candidate, its text parts joined in order.
pub fn extract_text(response: &GenerateContentResponse) -> String {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> ImagePayload {
        ImagePayload::new(vec![1u8, 2, 3, 4], "image/png").unwrap()
    }

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(build_request(&payload(), 0.1)).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[0]["inlineData"]["data"], "AQIDBA==");
        assert!(parts[0].get("text").is_none());
        assert_eq!(parts[1]["text"], OCR_PROMPT);
        let temperature = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.1).abs() < 1e-6);
    }

    #[test]
    fn prefixed_and_bare_base64_build_the_same_request() {
        let bare = ImagePayload::from_base64("AQIDBA==", "image/png").unwrap();
        let prefixed =
            ImagePayload::from_base64("data:image/png;base64,AQIDBA==", "image/png").unwrap();
        assert_eq!(build_request(&bare, 0.1), build_request(&prefixed, 0.1));
    }

    #[test]
    fn extracts_joined_text_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "Hello" }, { "text": "\nWorld" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(extract_text(&response), "Hello\nWorld");
    }

    #[test]
    fn missing_candidates_yield_empty_text() {
        let response: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(extract_text(&response), "");

        let blocked: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [{ "finishReason": "SAFETY" }] })).unwrap();
        assert_eq!(extract_text(&blocked), "");
    }

    #[test]
    fn from_config_uses_defaults() {
        let recognizer = GeminiRecognizer::from_config(&RecognitionConfig::default());
        assert_eq!(recognizer.model(), "gemini-2.5-flash");
        assert!(recognizer.endpoint().ends_with("/models/gemini-2.5-flash:generateContent"));
        assert!(recognizer.api_key.is_none());
    }

    #[tokio::test]
    async fn missing_key_fails_without_a_request() {
        let recognizer = GeminiRecognizer::from_config(&RecognitionConfig::default())
            .with_base_url("http://127.0.0.1:9");
        let err = recognizer.recognize_text(&payload()).await.unwrap_err();
        assert_eq!(err, RecognitionFailure::unavailable());
    }
}
