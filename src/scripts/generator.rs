// src/scripts/generator.rs
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::templates::DEFAULT_SCRIPT;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("HTTP error: status {0}")]
    HttpError(u16),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Empty response from language model")]
    EmptyResponse,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Single-prompt text completion
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedScript {
    pub script: String,
    /// True when the default script was returned instead of model output
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl GeneratedScript {
    fn fallback(notice: String) -> Self {
        Self {
            script: DEFAULT_SCRIPT.to_string(),
            fallback: true,
            notice: Some(notice),
        }
    }
}

pub fn build_prompt(purpose: &str, context: &str) -> String {
    format!(
        "Create a professional phone conversation script for an AI agent with the following purpose: {purpose}\n\
         \n\
         Context: {context}\n\
         \n\
         The script should be natural, engaging, and include:\n\
         1. Greeting and introduction\n\
         2. Main conversation flow\n\
         3. Handling objections or questions\n\
         4. Appropriate closing\n\
         \n\
         Format it as a structured conversation flow that can be used by a voice AI system.\n\
         Keep responses conversational and human-like.",
        purpose = purpose,
        context = context,
    )
}

/// Produces call scripts from a language model, degrading to the default
/// script whenever the model is unavailable. Never fails.
pub struct ScriptGenerator {
    provider: RwLock<Option<Arc<dyn CompletionProvider>>>,
}

impl Default for ScriptGenerator {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ScriptGenerator {
    pub fn new(provider: Option<Arc<dyn CompletionProvider>>) -> Self {
        Self {
            provider: RwLock::new(provider),
        }
    }

    pub async fn configure(&self, provider: Arc<dyn CompletionProvider>) {
        info!("Script generation provider set to {}", provider.name());
        *self.provider.write().await = Some(provider);
    }

    pub async fn is_configured(&self) -> bool {
        self.provider.read().await.is_some()
    }

    pub async fn generate(&self, purpose: &str, context: &str) -> GeneratedScript {
        let provider = self.provider.read().await.clone();

        let Some(provider) = provider else {
            return GeneratedScript::fallback(
                "Language model not configured, using default script".to_string(),
            );
        };

        let prompt = build_prompt(purpose, context.trim());

        match provider.complete(&prompt).await {
            Ok(text) if !text.trim().is_empty() => GeneratedScript {
                script: text,
                fallback: false,
                notice: None,
            },
            Ok(_) => {
                warn!("{} returned an empty script, using default", provider.name());
                GeneratedScript::fallback(GenerationError::EmptyResponse.to_string())
            }
            Err(e) => {
                warn!("Script generation via {} failed: {}", provider.name(), e);
                GeneratedScript::fallback(format!("Error generating script: {}", e))
            }
        }
    }
}
