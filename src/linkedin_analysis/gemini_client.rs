// src/linkedin_analysis/gemini_client.rs
use super::types::{
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, RequestContent, RequestPart,
};
use crate::core::config_manager::LlmConfig;
use anyhow::{Context, Result};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, error, info, warn};

const API_KEY_HEADER: &str = "x-goog-api-key";
const TRUNCATED_FINISH_REASON: &str = "MAX_TOKENS";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("GEMINI_API_KEY is not configured in environment variables")]
    MissingApiKey,

    #[error("Failed to reach Gemini API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Gemini API error: {status} - {body}")]
    Upstream { status: u16, body: String },

    #[error("Unexpected Gemini API response: {0}")]
    InvalidResponse(String),
}

/// Free text returned by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    /// The API stopped early because the output token limit was reached.
    pub truncated: bool,
}

/// Anything that turns a prompt into model text.
#[rocket::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Generation, LlmError>;
}

pub struct GeminiClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        if config.api_key.is_none() {
            warn!("GEMINI_API_KEY is not set; analysis and message generation will fail");
        }

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    fn request_body(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }
}

#[rocket::async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Generation, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        info!("Calling Gemini API: {} ({} prompt chars)", self.api_url, prompt.len());

        let response = self
            .client
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .header(API_KEY_HEADER, api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            error!("Gemini API error {}: {}", status, response_text);
            return Err(LlmError::Upstream {
                status: status.as_u16(),
                body: response_text,
            });
        }

        parse_generation(&response_text)
    }
}

/// Pull the candidate text and truncation flag out of a generateContent reply.
pub(crate) fn parse_generation(response_text: &str) -> Result<Generation, LlmError> {
    let reply: GenerateContentResponse = serde_json::from_str(response_text)
        .map_err(|e| LlmError::InvalidResponse(format!("{}: {}", e, response_text)))?;

    let candidate = reply
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse(format!("no candidates: {}", response_text)))?;

    let truncated = candidate.finish_reason.as_deref() == Some(TRUNCATED_FINISH_REASON);
    if truncated {
        warn!("Gemini response was truncated at the output token limit");
    }

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() && !truncated {
        return Err(LlmError::InvalidResponse(format!(
            "candidate has no text: {}",
            response_text
        )));
    }

    debug!("Gemini returned {} chars", text.len());
    Ok(Generation { text, truncated })
}
