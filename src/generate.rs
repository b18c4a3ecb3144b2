//! Generative-model service client.
//!
//! [`Generator`] is the seam the answerer speaks through;
//! [`GeminiGenerator`] calls the Google Generative Language
//! `generateContent` endpoint with a fixed sampling temperature.
//! Retry policy matches the embedding client: 429/5xx/network errors
//! back off exponentially, other client errors fail immediately.

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use crate::config::GenerationConfig;
use crate::embedding::DEFAULT_BASE_URL;
use crate::error::PipelineError;

/// The generation seam: produces model text for a rendered prompt.
#[async_trait]
pub trait Generator: Send + Sync {
    fn model_name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Generation client for the Google Generative Language API.
pub struct GeminiGenerator {
    model: String,
    api_key: String,
    base_url: String,
    temperature: f32,
    max_retries: u32,
    client: reqwest::Client,
}

impl GeminiGenerator {
    pub fn new(config: &GenerationConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: config.temperature,
            max_retries: config.max_retries,
            client,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": self.temperature },
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = self.client.post(&url).json(&body).send().await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().await.map_err(|e| {
                            PipelineError::GenerationServiceFailure(e.to_string())
                        })?;
                        return Ok(parse_generate_response(&json));
                    }

                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err = Some(format!("HTTP {}: {}", status, body_text));
                        continue;
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    return Err(PipelineError::GenerationServiceFailure(format!(
                        "HTTP {}: {}",
                        status, body_text
                    ))
                    .into());
                }
                Err(e) => {
                    last_err = Some(e.to_string());
                    continue;
                }
            }
        }

        Err(PipelineError::GenerationServiceFailure(
            last_err.unwrap_or_else(|| "generation failed after retries".to_string()),
        )
        .into())
    }
}

/// Extract the first candidate's text, concatenating its parts.
///
/// An empty or missing candidate list yields an empty string: the model's
/// output is returned verbatim, whatever it was.
fn parse_generate_response(json: &serde_json::Value) -> String {
    let parts = json
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array());

    match parts {
        Some(parts) => parts
            .iter()
            .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join(""),
        None => String::new(),
    }
}
