use std::{env, fmt::Display, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::{debug, info};

use crate::api_connection::endpoints::{DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, GEMINI_API_BASE};
use crate::request_builder::DEFAULT_LANGUAGE;

pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";
const FALLBACK_API_KEY_ENV_VAR: &str = "GOOGLE_API_KEY";

const DEFAULT_PORT: &str = "8080";
const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const DEFAULT_TIMEOUT_SECS: &str = "60";
const DEFAULT_MAX_IMAGE_BYTES: &str = "20971520";
/// Keeps the derived body limit (base64 expansion plus framing) within `usize`.
const MAX_IMAGE_BYTES_CEILING: usize = usize::MAX / 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("GEMINI_API_KEY (or GOOGLE_API_KEY) must be set to call the provider")]
    MissingApiKey,
}

/// How callers reach the provider: in-process, or through the proxy server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientMode {
    #[default]
    Direct,
    Proxied,
}

impl FromStr for ClientMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(ClientMode::Direct),
            "proxied" | "proxy" => Ok(ClientMode::Proxied),
            other => Err(format!("expected 'direct' or 'proxied', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_base: String,
    pub text_model: String,
    pub image_model: String,
    pub language: String,
    pub port: u16,
    pub api_base_url: String,
    pub mode: ClientMode,
    pub request_timeout: Duration,
    pub max_image_bytes: usize,
}

impl Config {
    /// Loads `.env.local` and `.env` (if present) into the environment. Existing variables win.
    pub fn load_dotenv() {
        dotenv::from_filename(".env.local").ok();
        dotenv::dotenv().ok();
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = var(API_KEY_ENV_VAR).or_else(|| var(FALLBACK_API_KEY_ENV_VAR));
        if api_key.is_none() {
            debug!("no provider API key configured");
        }

        let timeout_secs: u64 = try_load(&var, "SOUSCHEF_REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "SOUSCHEF_REQUEST_TIMEOUT_SECS",
                value: "0".to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }

        let max_image_bytes: usize = try_load(&var, "SOUSCHEF_MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES)?;
        if !(1..=MAX_IMAGE_BYTES_CEILING).contains(&max_image_bytes) {
            return Err(ConfigError::Invalid {
                key: "SOUSCHEF_MAX_IMAGE_BYTES",
                value: max_image_bytes.to_string(),
                reason: format!("must be between 1 and {MAX_IMAGE_BYTES_CEILING}"),
            });
        }

        Ok(Self {
            api_key,
            api_base: var("GEMINI_API_BASE").unwrap_or_else(|| GEMINI_API_BASE.to_string()),
            text_model: var("SOUSCHEF_TEXT_MODEL").unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            image_model: var("SOUSCHEF_IMAGE_MODEL").unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            language: var("SOUSCHEF_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            port: try_load(&var, "PORT", DEFAULT_PORT)?,
            api_base_url: var("SOUSCHEF_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            mode: try_load(&var, "SOUSCHEF_MODE", "direct")?,
            request_timeout: Duration::from_secs(timeout_secs),
            max_image_bytes,
        })
    }

    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }

    /// Largest request body the proxy accepts: a base64 image at the ceiling plus JSON framing.
    pub fn max_body_bytes(&self) -> usize {
        (self.max_image_bytes / 3)
            .saturating_mul(4)
            .saturating_add(64 * 1024)
    }
}

fn try_load<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: value.clone(),
        reason: e.to_string(),
    })
}
