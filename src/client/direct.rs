use async_trait::async_trait;

use super::{ClientError, RecipeService};
use crate::chef::Chef;
use crate::schema::{DifficultyTier, GeneratedRecipes, Operation};

/// Calls the provider from the caller's own process.
#[derive(Clone)]
pub struct DirectClient {
    chef: Chef,
}

impl DirectClient {
    pub fn new(chef: Chef) -> Self {
        Self { chef }
    }
}

#[async_trait]
impl RecipeService for DirectClient {
    async fn analyze_image(&self, image: &str) -> Result<Vec<String>, ClientError> {
        self.chef
            .analyze_image(image)
            .await
            .map_err(|e| ClientError::new(Operation::AnalyzeImage, e))
    }

    async fn generate_recipes(
        &self,
        ingredients: &[String],
        difficulty: DifficultyTier,
    ) -> Result<GeneratedRecipes, ClientError> {
        self.chef
            .generate_recipes(ingredients, Some(difficulty))
            .await
            .map_err(|e| ClientError::new(Operation::GenerateRecipes, e))
    }

    async fn generate_image(&self, recipe_name: &str, description: &str) -> Result<Option<String>, ClientError> {
        self.chef
            .generate_image(recipe_name, description)
            .await
            .map_err(|e| ClientError::new(Operation::GenerateImage, e))
    }
}
