// src/config.rs
use anyhow::{bail, Context};
use std::env;

use crate::gateway::{CallSettings, SubmissionMode};

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub provider: ProviderConfig,
    pub llm: LlmConfig,
    pub call_settings: CallSettings,
    pub enforce_max_duration: bool,
}

/// Calling platform connection settings
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub app_id: Option<String>,
    pub timeout_ms: u64,
    pub submission_mode: SubmissionMode,
}

/// Language model settings used for script generation
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let submission_mode: SubmissionMode = env::var("SUBMISSION_MODE")
            .unwrap_or_else(|_| "simulated".to_string())
            .parse()
            .map_err(anyhow::Error::msg)?;

        let max_duration_minutes: u32 = env::var("MAX_CALL_DURATION_MINUTES")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .context("Invalid MAX_CALL_DURATION_MINUTES")?;

        let call_settings = CallSettings::new(
            max_duration_minutes,
            parse_bool(&env::var("RECORD_CALLS").unwrap_or_else(|_| "true".to_string()))?,
        )?;

        Ok(Config {
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "production".to_string()),
            host: env::var("HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "9000".to_string())
                .parse()
                .context("Invalid PORT")?,
            workers: env::var("HTTP_WORKERS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .context("Invalid HTTP_WORKERS")?,
            provider: ProviderConfig {
                base_url: env::var("PROVIDER_BASE_URL")
                    .unwrap_or_else(|_| "https://app.dasha.ai/api/v2".to_string()),
                api_key: non_empty_var("PROVIDER_API_KEY"),
                app_id: non_empty_var("PROVIDER_APP_ID"),
                timeout_ms: env::var("PROVIDER_TIMEOUT_MS")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()
                    .context("Invalid PROVIDER_TIMEOUT_MS")?,
                submission_mode,
            },
            llm: LlmConfig {
                base_url: env::var("LLM_BASE_URL")
                    .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string()),
                api_key: non_empty_var("LLM_API_KEY"),
                model: env::var("LLM_MODEL")
                    .unwrap_or_else(|_| "gemini-pro".to_string()),
            },
            call_settings,
            enforce_max_duration: parse_bool(
                &env::var("ENFORCE_MAX_DURATION").unwrap_or_else(|_| "false".to_string()),
            )?,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("Invalid boolean value: {}", other),
    }
}
