use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{LlmSettings, DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::scoring::StatusThresholds;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub llm_api_base: String,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
    pub llm_max_retries: u32,
    pub question_map_path: PathBuf,
    pub report_output_dir: PathBuf,
    pub keep_reports: bool,
    pub max_upload_bytes: usize,
    pub status_thresholds: StatusThresholds,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let strength = parse_env("STATUS_STRENGTH_MIN", 4.0_f64)?;
        let fragile = parse_env("STATUS_FRAGILE_MIN", 3.0_f64)?;
        let status_thresholds = StatusThresholds::new(strength, fragile)
            .context("STATUS_STRENGTH_MIN / STATUS_FRAGILE_MIN are inconsistent")?;

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            llm_api_base: env_or("LLM_API_BASE", DEFAULT_API_BASE),
            llm_model: env_or("LLM_MODEL", DEFAULT_MODEL),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            llm_max_retries: parse_env("LLM_MAX_RETRIES", 0)?,
            question_map_path: PathBuf::from(env_or("QUESTION_MAP_PATH", "data/questions.json")),
            report_output_dir: std::env::var("REPORT_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir().join("teams_diagnostic")),
            keep_reports: parse_env("KEEP_REPORTS", false)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            status_thresholds,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    pub fn llm_settings(&self) -> LlmSettings {
        LlmSettings {
            api_key: self.openai_api_key.clone(),
            api_base: self.llm_api_base.clone(),
            model: self.llm_model.clone(),
            timeout: Duration::from_secs(self.llm_timeout_secs),
            max_retries: self.llm_max_retries,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
