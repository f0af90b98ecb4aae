//! LLM model and prompt commands

use crate::domain::PromptTemplates;
use crate::error::{AppError, Result};
use crate::ports::llm::{LlmServicePort, ModelInfo};

/// Fetch available models from the configured provider, sorted by id
pub async fn fetch_llm_models(llm: &dyn LlmServicePort) -> Result<Vec<ModelInfo>> {
    if !llm.is_configured() {
        return Err(AppError::Config(
            "No Gemini API key configured; run `interview-analyzer key set <KEY>` or set GEMINI_API_KEY"
                .to_string(),
        ));
    }

    log::info!("Fetching models for provider: {}", llm.provider_name());
    let mut models = llm.fetch_available_models().await?;
    models.sort_by(|a, b| a.id.cmp(&b.id));

    log::info!(
        "Successfully fetched {} models for {}",
        models.len(),
        llm.provider_name()
    );
    Ok(models)
}

/// The overview instruction block sent after the documents
pub fn default_overview_prompt() -> String {
    PromptTemplates::jd_cv_analysis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm::MockLlmServicePort;

    fn model(id: &str) -> ModelInfo {
        ModelInfo {
            id: id.to_string(),
            name: id.to_string(),
            provider: "google".to_string(),
            context_window: 1048576,
            is_fallback_context_window: None,
        }
    }

    #[tokio::test]
    async fn test_models_sorted() {
        let mut llm = MockLlmServicePort::new();
        llm.expect_is_configured().return_const(true);
        llm.expect_provider_name().return_const("google".to_string());
        llm.expect_fetch_available_models()
            .returning(|| Ok(vec![model("gemini-2.5-pro"), model("gemini-2.5-flash")]));

        let models = fetch_llm_models(&llm).await.unwrap();
        let ids: Vec<_> = models.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["gemini-2.5-flash", "gemini-2.5-pro"]);
    }

    #[tokio::test]
    async fn test_models_require_key() {
        let mut llm = MockLlmServicePort::new();
        llm.expect_is_configured().return_const(false);
        assert!(matches!(
            fetch_llm_models(&llm).await,
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_default_prompt_has_format() {
        assert!(default_overview_prompt().contains("OUTPUT FORMAT (STRICT):"));
    }
}
