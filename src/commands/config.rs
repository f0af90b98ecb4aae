//! Configuration and API key management commands

use crate::domain::models::{ServiceConfig, ServiceType};
use crate::error::{AppError, Result};
use crate::ports::llm::LlmConfig;
use crate::utils::keychain::{mask_key, resolve_api_key};
use crate::AppState;
use serde::Serialize;

/// The only LLM provider the analyzer talks to
pub const LLM_PROVIDER: &str = "google";

/// Response for API key status
#[derive(Debug, Serialize, PartialEq)]
pub struct ApiKeyStatus {
    pub has_key: bool,
    pub masked_key: Option<String>, // Shows last 4 chars: "...abc1"
    pub source: Option<String>,
}

/// Requested changes to the stored LLM settings
#[derive(Debug, Default, Clone)]
pub struct UpdateLlmConfigRequest {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Saves the Gemini API key to the OS keychain
pub fn save_api_key(state: &AppState, api_key: &str) -> Result<()> {
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(AppError::InvalidInput("API key cannot be empty".to_string()));
    }
    state.keychain.save_api_key("llm", LLM_PROVIDER, api_key)
}

/// Reports whether a key is available and where it comes from
///
/// The full key is never returned, only the last 4 characters.
pub fn get_api_key_status(state: &AppState, env_value: Option<String>) -> ApiKeyStatus {
    match resolve_api_key(state.keychain.as_ref(), LLM_PROVIDER, env_value) {
        Some((key, source)) => ApiKeyStatus {
            has_key: true,
            masked_key: Some(mask_key(&key)),
            source: Some(source.to_string()),
        },
        None => ApiKeyStatus {
            has_key: false,
            masked_key: None,
            source: None,
        },
    }
}

/// Deletes the Gemini API key from the OS keychain
pub fn delete_api_key(state: &AppState) -> Result<()> {
    state.keychain.delete_api_key("llm", LLM_PROVIDER)
}

/// Resolve the API key for an analysis run, logging where it came from
pub fn api_key_for_run(state: &AppState, env_value: Option<String>) -> Option<String> {
    resolve_api_key(state.keychain.as_ref(), LLM_PROVIDER, env_value).map(|(key, source)| {
        log::debug!("Using Gemini API key from {}", source);
        key
    })
}

/// Load the stored LLM settings, falling back to defaults
pub async fn load_llm_config(state: &AppState) -> Result<LlmConfig> {
    let stored = state
        .storage
        .get_service_config(&ServiceType::Llm.to_string(), LLM_PROVIDER)
        .await?;

    let Some(settings) = stored.and_then(|c| c.settings) else {
        return Ok(LlmConfig::default());
    };

    match serde_json::from_str::<LlmConfig>(&settings) {
        Ok(config) => Ok(config),
        Err(e) => {
            log::warn!("Ignoring unreadable LLM settings ({}); using defaults", e);
            Ok(LlmConfig::default())
        }
    }
}

/// Everything `config show` reports
#[derive(Debug, Serialize, PartialEq)]
pub struct ConfigOverview {
    pub llm: LlmConfig,
    pub active_provider: Option<String>,
    pub configured_providers: Vec<String>,
    pub keychain_has_key: bool,
}

/// Current LLM settings, the active provider and whether the keychain holds a key
pub async fn show_config(state: &AppState) -> Result<ConfigOverview> {
    let llm = load_llm_config(state).await?;

    let active_provider = state
        .storage
        .get_active_service_config(&ServiceType::Llm.to_string())
        .await?
        .map(|c| c.provider);

    let configured_providers = state
        .storage
        .list_service_configs()
        .await?
        .into_iter()
        .filter(|c| c.service_type == ServiceType::Llm)
        .map(|c| c.provider)
        .collect();

    Ok(ConfigOverview {
        llm,
        active_provider,
        configured_providers,
        keychain_has_key: state.keychain.has_api_key("llm", LLM_PROVIDER),
    })
}

/// Merge and persist LLM settings; returns the resulting configuration
///
/// This stores provider settings (model, temperature, token limit) but NOT
/// API keys. API keys are stored separately in the OS keychain.
pub async fn update_llm_config(
    state: &AppState,
    request: UpdateLlmConfigRequest,
) -> Result<LlmConfig> {
    let mut config = load_llm_config(state).await?;

    if let Some(model) = request.model {
        let model = model.trim().to_string();
        if model.is_empty() {
            return Err(AppError::InvalidInput("Model name cannot be empty".to_string()));
        }
        config.model = model;
    }

    if let Some(temperature) = request.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(AppError::InvalidInput(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                temperature
            )));
        }
        config.temperature = Some(temperature);
    }

    if let Some(max_tokens) = request.max_tokens {
        if max_tokens == 0 {
            return Err(AppError::InvalidInput(
                "Max tokens must be greater than zero".to_string(),
            ));
        }
        config.max_tokens = Some(max_tokens);
    }

    let service_config = ServiceConfig::new(ServiceType::Llm, LLM_PROVIDER.to_string())
        .with_active(true)
        .with_settings(Some(serde_json::to_string(&config)?));
    state.storage.save_service_config(&service_config).await?;

    log::info!("Saved LLM settings: model={}", config.model);
    Ok(config)
}
