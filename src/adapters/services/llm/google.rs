//! Google Gemini LLM service adapter
//!
//! Implements the LlmServicePort for Google's Gemini API.
//! Supports dynamic model fetching and the JD & CV overview prompt.

use crate::domain::PromptTemplates;
use crate::error::{AppError, Result};
use crate::ports::llm::{LlmConfig, LlmServicePort, ModelInfo, OverviewRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GOOGLE_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini service implementation
pub struct GoogleService {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GoogleModel {
    name: String,
    #[serde(rename = "displayName", default)]
    display_name: String,
    #[serde(rename = "inputTokenLimit")]
    input_token_limit: Option<u32>,
    #[serde(rename = "supportedGenerationMethods", default)]
    supported_generation_methods: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleModelsResponse {
    #[serde(default)]
    models: Vec<GoogleModel>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: u32,
}

impl GoogleService {
    /// Create a new Google Gemini service with the given API key
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(api_key, GOOGLE_API_BASE)
    }

    /// Create a service against a non-default API endpoint
    pub fn with_base_url(api_key: String, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| AppError::LlmService(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch available models from Google API, following pagination
    async fn list_models(&self) -> Result<Vec<GoogleModel>> {
        log::info!("Fetching available models from Google");

        let mut gemini_models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("key", self.api_key.clone())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let response = self
                .client
                .get(format!("{}/models", self.base_url))
                .query(&query)
                .send()
                .await
                .map_err(|e| AppError::LlmService(format!("Failed to fetch models: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_default();
                return Err(AppError::LlmService(format!(
                    "Failed to fetch models ({}): {}",
                    status, error_text
                )));
            }

            let models_response: GoogleModelsResponse = response.json().await.map_err(|e| {
                AppError::LlmService(format!("Failed to parse models response: {}", e))
            })?;

            // Only models that support generateContent
            gemini_models.extend(models_response.models.into_iter().filter(|m| {
                m.name.contains("gemini")
                    && m.supported_generation_methods
                        .iter()
                        .any(|method| method == "generateContent")
            }));

            match models_response.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        log::info!("Found {} Google Gemini models", gemini_models.len());
        Ok(gemini_models)
    }

    /// "gemini-pro" -> "models/gemini-pro"; already-qualified names pass through
    fn model_path(model: &str) -> String {
        if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        }
    }

    fn build_request(prompt: String, config: &LlmConfig) -> GenerateContentRequest {
        let generation_config = if config.temperature.is_some() || config.max_tokens.is_some() {
            Some(GenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_tokens,
            })
        } else {
            None
        };

        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part { text: prompt }],
            }],
            generation_config,
        }
    }

    /// Pull the generated text out of a generateContent response
    fn extract_text(response: GenerateContentResponse) -> Result<String> {
        if let Some(reason) = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
        {
            return Err(AppError::LlmService(format!("Prompt blocked: {}", reason)));
        }

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AppError::LlmService("No candidates returned".to_string()))?;

        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
        if parts.is_empty() {
            return Err(AppError::LlmService(format!(
                "No content parts in response (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(parts.into_iter().map(|p| p.text).collect::<String>())
    }

    /// Generate text using generateContent API
    async fn generate(&self, prompt: String, config: &LlmConfig) -> Result<String> {
        let model_name = Self::model_path(&config.model);
        let request_body = Self::build_request(prompt, config);

        log::info!("Calling Google generateContent with model: {}", model_name);

        let response = self
            .client
            .post(format!("{}/{}:generateContent", self.base_url, model_name))
            .query(&[("key", &self.api_key)])
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AppError::LlmService(format!("GenerateContent request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::LlmService(format!(
                "GenerateContent failed ({}): {}",
                status, error_text
            )));
        }

        let content_response: GenerateContentResponse = response.json().await.map_err(|e| {
            AppError::LlmService(format!("Failed to parse content response: {}", e))
        })?;

        if let Some(usage) = &content_response.usage_metadata {
            log::debug!(
                "Gemini usage: {} prompt tokens, {} output tokens",
                usage.prompt_token_count,
                usage.candidates_token_count
            );
        }

        let content = Self::extract_text(content_response)?;
        log::info!(
            "Google completion successful, generated {} characters",
            content.len()
        );

        Ok(content)
    }

    /// Get estimated context window for a model
    fn get_context_window(model_id: &str, input_limit: Option<u32>) -> usize {
        if let Some(limit) = input_limit {
            return limit as usize;
        }

        if model_id.contains("gemini-1.5-pro") {
            2097152 // 2M tokens
        } else if model_id.contains("gemini-1.5-flash") || model_id.contains("gemini-2") {
            1048576 // 1M tokens
        } else {
            32768
        }
    }
}

#[async_trait]
impl LlmServicePort for GoogleService {
    async fn generate_overview(
        &self,
        request: &OverviewRequest,
        config: &LlmConfig,
    ) -> Result<String> {
        let prompt = PromptTemplates::render_overview(&request.job_description, &request.cv_text);
        self.generate(prompt, config).await
    }

    async fn fetch_available_models(&self) -> Result<Vec<ModelInfo>> {
        let models = self.list_models().await?;

        Ok(models
            .into_iter()
            .map(|m| {
                // "models/gemini-pro" -> "gemini-pro"
                let id = m
                    .name
                    .strip_prefix("models/")
                    .unwrap_or(&m.name)
                    .to_string();

                let is_fallback = m.input_token_limit.is_none();
                let name = if m.display_name.is_empty() {
                    id.clone()
                } else {
                    m.display_name
                };
                ModelInfo {
                    context_window: Self::get_context_window(&id, m.input_token_limit),
                    id,
                    name,
                    provider: "google".to_string(),
                    is_fallback_context_window: if is_fallback { Some(true) } else { None },
                }
            })
            .collect())
    }

    fn provider_name(&self) -> &str {
        "google"
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}
