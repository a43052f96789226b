use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::{ClientError, RecipeService};
use crate::schema::{
    AnalyzeImageRequest, AnalyzeImageResponse, DifficultyTier, GenerateImageRequest, GenerateImageResponse,
    GenerateRecipesRequest, GenerateRecipesResponse, GeneratedRecipes, Operation,
};

#[derive(Debug, Error)]
pub enum ProxyCallError {
    #[error("could not reach proxy: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("proxy answered {status}: {message}")]
    Status { status: StatusCode, message: String },
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Calls the proxy server, which holds the provider credentials.
#[derive(Clone)]
pub struct ProxiedClient {
    http: Client,
    base_url: String,
}

impl ProxiedClient {
    /// `base_url` is the API root, e.g. `http://localhost:8080/api`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, operation: Operation) -> String {
        format!("{}{}", self.base_url, operation.endpoint())
    }

    async fn post<Req, Resp>(&self, operation: Operation, body: &Req) -> Result<Resp, ClientError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        self.try_post(operation, body)
            .await
            .map_err(|e| ClientError::new(operation, e))
    }

    async fn try_post<Req, Resp>(&self, operation: Operation, body: &Req) -> Result<Resp, ProxyCallError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = self.url_for(operation);
        debug!(%url, "calling proxy");
        let response = self.http.post(&url).json(body).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<Resp>().await?);
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        Err(ProxyCallError::Status { status, message })
    }
}

#[async_trait]
impl RecipeService for ProxiedClient {
    async fn analyze_image(&self, image: &str) -> Result<Vec<String>, ClientError> {
        let request = AnalyzeImageRequest {
            image: image.to_string(),
        };
        let response: AnalyzeImageResponse = self.post(Operation::AnalyzeImage, &request).await?;
        Ok(response.ingredients)
    }

    async fn generate_recipes(
        &self,
        ingredients: &[String],
        difficulty: DifficultyTier,
    ) -> Result<GeneratedRecipes, ClientError> {
        let request = GenerateRecipesRequest {
            ingredients: ingredients.to_vec(),
            difficulty: Some(difficulty),
        };
        let response: GenerateRecipesResponse = self.post(Operation::GenerateRecipes, &request).await?;
        Ok(response.into())
    }

    async fn generate_image(&self, recipe_name: &str, description: &str) -> Result<Option<String>, ClientError> {
        let request = GenerateImageRequest {
            recipe_name: recipe_name.to_string(),
            description: description.to_string(),
        };
        let response: GenerateImageResponse = self.post(Operation::GenerateImage, &request).await?;
        Ok(response.image_url)
    }
}
