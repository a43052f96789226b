use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use crate::api_connection::endpoints::GenerateContentResponse;
use crate::api_connection::{ApiConnectionError, GenerativeProvider};
use crate::recipe_parser::{extract_image_data_uri, parse_ingredients, parse_recipes};
use crate::request_builder::{ImagePayload, ImagePayloadError, ProviderCall, RequestBuilder};
use crate::schema::{DifficultyTier, GeneratedRecipes};

/// Input problems caught before any provider call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("An image is required")]
    MissingImage,
    #[error("The image could not be read: {0}")]
    InvalidImage(ImagePayloadError),
    #[error("At least one ingredient is required")]
    MissingIngredients,
    #[error("A difficulty tier is required")]
    MissingDifficulty,
    #[error("Recipe name and description are required")]
    MissingRecipeDetails,
}

#[derive(Debug, Error)]
pub enum ChefError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("provider call failed: {0}")]
    Provider(#[from] ApiConnectionError),
    #[error("provider output did not match the expected shape: {0}")]
    Parse(String),
    #[error("provider returned no content")]
    EmptyResult,
}

/// Runs the three operations against one provider. Cheap to clone; shares the provider.
#[derive(Clone)]
pub struct Chef {
    provider: Arc<dyn GenerativeProvider>,
    builder: RequestBuilder,
    max_image_bytes: usize,
}

impl Chef {
    pub fn new(provider: Arc<dyn GenerativeProvider>, builder: RequestBuilder, max_image_bytes: usize) -> Self {
        Self {
            provider,
            builder,
            max_image_bytes,
        }
    }

    async fn call(&self, call: ProviderCall) -> Result<GenerateContentResponse, ChefError> {
        Ok(self
            .provider
            .generate_content(&call.model, &call.request)
            .await?)
    }

    #[instrument(skip_all, fields(image_len = image.len()))]
    pub async fn analyze_image(&self, image: &str) -> Result<Vec<String>, ChefError> {
        if image.trim().is_empty() {
            return Err(ValidationError::MissingImage.into());
        }
        let payload = ImagePayload::parse(image, self.max_image_bytes).map_err(|e| match e {
            ImagePayloadError::Empty => ValidationError::MissingImage,
            other => ValidationError::InvalidImage(other),
        })?;

        let response = self.call(self.builder.analyze_image(&payload)).await?;
        let ingredients = parse_ingredients(&response)?;
        info!(count = ingredients.len(), "ingredients recognised");
        Ok(ingredients)
    }

    #[instrument(skip_all, fields(ingredients = ingredients.len()))]
    pub async fn generate_recipes(
        &self,
        ingredients: &[String],
        difficulty: Option<DifficultyTier>,
    ) -> Result<GeneratedRecipes, ChefError> {
        let ingredients: Vec<String> = ingredients
            .iter()
            .filter(|i| !i.trim().is_empty())
            .cloned()
            .collect();
        if ingredients.is_empty() {
            return Err(ValidationError::MissingIngredients.into());
        }
        let difficulty = difficulty.ok_or(ValidationError::MissingDifficulty)?;

        let response = self
            .call(self.builder.generate_recipes(&ingredients, difficulty))
            .await?;
        let generated = parse_recipes(&response, difficulty)?;
        info!(count = generated.recipes.len(), tier = %difficulty, "recipes generated");
        Ok(generated)
    }

    #[instrument(skip_all)]
    pub async fn generate_image(&self, recipe_name: &str, description: &str) -> Result<Option<String>, ChefError> {
        let (recipe_name, description) = (recipe_name.trim(), description.trim());
        if recipe_name.is_empty() || description.is_empty() {
            return Err(ValidationError::MissingRecipeDetails.into());
        }

        let response = self
            .call(self.builder.generate_image(recipe_name, description))
            .await?;
        let image_url = extract_image_data_uri(&response);
        info!(recipe = recipe_name, has_image = image_url.is_some(), "recipe image generated");
        Ok(image_url)
    }
}
