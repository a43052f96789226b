//! The caller-facing recipe service, reachable either in-process or through the proxy.
//!
//! Call sites hold an `Arc<dyn RecipeService>` and never learn which transport is behind it;
//! [`from_config`] makes that choice once.

pub mod direct;
pub mod proxied;

use std::error::Error as StdError;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info};

use crate::api_connection::GeminiProvider;
use crate::chef::Chef;
use crate::config::{ClientMode, Config, ConfigError};
use crate::request_builder::RequestBuilder;
use crate::schema::{DifficultyTier, GeneratedRecipes, Operation};

pub use direct::DirectClient;
pub use proxied::ProxiedClient;

type BoxError = Box<dyn StdError + Send + Sync>;

/// The single failure a caller sees. The message is the generic text for the operation; the
/// underlying cause stays reachable through `source()`.
#[derive(Debug, Error)]
#[error("{}", .operation.failure_message())]
pub struct ClientError {
    pub operation: Operation,
    #[source]
    pub source: BoxError,
}

impl ClientError {
    pub fn new(operation: Operation, source: impl Into<BoxError>) -> Self {
        let source = source.into();
        error!(%operation, cause = %source, "operation failed");
        Self { operation, source }
    }
}

#[async_trait]
pub trait RecipeService: Send + Sync {
    /// Ingredient names recognised in a base64 (or data-URI) photo. May be empty.
    async fn analyze_image(&self, image: &str) -> Result<Vec<String>, ClientError>;

    async fn generate_recipes(
        &self,
        ingredients: &[String],
        difficulty: DifficultyTier,
    ) -> Result<GeneratedRecipes, ClientError>;

    /// A `data:` URI for the plated dish, or `None` when the provider produced no image.
    async fn generate_image(&self, recipe_name: &str, description: &str) -> Result<Option<String>, ClientError>;
}

/// Builds the in-process chef from configuration. Fails without a provider key.
pub fn chef_from_config(config: &Config) -> Result<Chef, ConfigError> {
    let api_key = config.require_api_key()?;
    let provider = GeminiProvider::new(
        api_key.to_string(),
        Some(config.api_base.clone()),
        config.request_timeout,
    )
    .map_err(|e| ConfigError::Invalid {
        key: "GEMINI_API_BASE",
        value: config.api_base.clone(),
        reason: e.to_string(),
    })?;
    let builder = RequestBuilder::new(&config.text_model, &config.image_model, &config.language);
    Ok(Chef::new(Arc::new(provider), builder, config.max_image_bytes))
}

pub fn from_config(config: &Config) -> Result<Arc<dyn RecipeService>, ConfigError> {
    match config.mode {
        ClientMode::Direct => {
            info!("recipe service: direct provider calls");
            Ok(Arc::new(DirectClient::new(chef_from_config(config)?)))
        }
        ClientMode::Proxied => {
            info!(base_url = %config.api_base_url, "recipe service: proxied through server");
            let client = ProxiedClient::new(&config.api_base_url, config.request_timeout).map_err(|e| {
                ConfigError::Invalid {
                    key: "SOUSCHEF_API_URL",
                    value: config.api_base_url.clone(),
                    reason: e.to_string(),
                }
            })?;
            Ok(Arc::new(client))
        }
    }
}
