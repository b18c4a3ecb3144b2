//! Embedding service client.
//!
//! Defines the [`Embedder`] seam the pipeline embeds through, plus the
//! [`GeminiEmbedder`] implementation that calls the Google Generative
//! Language `batchEmbedContents` endpoint.
//!
//! # Retry strategy
//!
//! Transient failures retry with exponential backoff:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use crate::config::EmbeddingConfig;
use crate::error::PipelineError;

/// Default API endpoint; overridable so tests can point at a local stub.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// The embedding seam: turns a batch of texts into one vector per text,
/// in input order.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model identifier recorded in the index (e.g. `"embedding-001"`).
    fn model_name(&self) -> &str;

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Embedding client for the Google Generative Language API.
pub struct GeminiEmbedder {
    model: String,
    api_key: String,
    base_url: String,
    max_retries: u32,
    client: reqwest::Client,
}

impl GeminiEmbedder {
    pub fn new(config: &EmbeddingConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
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
impl Embedder for GeminiEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/v1beta/models/{}:batchEmbedContents?key={}",
            self.base_url, self.model, self.api_key
        );

        let requests: Vec<serde_json::Value> = texts
            .iter()
            .map(|text| {
                serde_json::json!({
                    "model": format!("models/{}", self.model),
                    "content": { "parts": [{ "text": text }] },
                })
            })
            .collect();
        let body = serde_json::json!({ "requests": requests });

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
                            PipelineError::EmbeddingServiceFailure(e.to_string())
                        })?;
                        return parse_embed_response(&json, texts.len());
                    }

                    // Rate limited or server error — retry
                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err = Some(format!("HTTP {}: {}", status, body_text));
                        continue;
                    }

                    // Client error (not 429) — don't retry
                    let body_text = response.text().await.unwrap_or_default();
                    return Err(PipelineError::EmbeddingServiceFailure(format!(
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

        Err(PipelineError::EmbeddingServiceFailure(
            last_err.unwrap_or_else(|| "embedding failed after retries".to_string()),
        )
        .into())
    }
}

/// Parse a `batchEmbedContents` response into one vector per input text.
fn parse_embed_response(json: &serde_json::Value, expected: usize) -> Result<Vec<Vec<f32>>> {
    let embeddings = json
        .get("embeddings")
        .and_then(|e| e.as_array())
        .ok_or_else(|| {
            PipelineError::EmbeddingServiceFailure("response missing embeddings array".to_string())
        })?;

    if embeddings.len() != expected {
        return Err(PipelineError::EmbeddingServiceFailure(format!(
            "expected {} embeddings, got {}",
            expected,
            embeddings.len()
        ))
        .into());
    }

    let mut vectors = Vec::with_capacity(embeddings.len());
    for item in embeddings {
        let values = item.get("values").and_then(|v| v.as_array()).ok_or_else(|| {
            PipelineError::EmbeddingServiceFailure("embedding missing values".to_string())
        })?;

        let vector: Vec<f32> = values
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();

        if vector.is_empty() {
            return Err(
                PipelineError::EmbeddingServiceFailure("empty embedding vector".to_string()).into(),
            );
        }

        vectors.push(vector);
    }

    Ok(vectors)
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns `0.0` for empty vectors or vectors of different lengths.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}
