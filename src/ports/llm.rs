/// LLM service port trait
///
/// Defines the interface for Large Language Model services.
/// Implementation: Google Gemini
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default Gemini model for overview generation
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";

/// Request to generate a JD & candidate overview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewRequest {
    /// The job description text
    pub job_description: String,

    /// The candidate CV text
    pub cv_text: String,
}

/// Configuration for LLM requests
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    /// Model name (e.g., "gemini-2.5-flash-lite")
    pub model: String,

    /// Temperature for generation (0.0 to 2.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens in response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            max_tokens: None,
        }
    }
}

/// Model information returned by a provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub context_window: usize,
    /// Set when the context window is a local estimate rather than provider data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_fallback_context_window: Option<bool>,
}

/// Port trait for LLM services
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmServicePort: Send + Sync {
    /// Generate a structured overview of a job description and CV
    async fn generate_overview(&self, request: &OverviewRequest, config: &LlmConfig)
        -> Result<String>;

    /// List models usable for generation
    async fn fetch_available_models(&self) -> Result<Vec<ModelInfo>>;

    /// Get the provider name
    fn provider_name(&self) -> &str;

    /// Check if the service is configured (has API key)
    fn is_configured(&self) -> bool;
}
