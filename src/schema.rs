use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three recipe styles a user can ask for. Each carries a label that travels on the
/// wire and a style description that is only used to steer generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DifficultyTier {
    #[serde(rename = "Prêt-à-Porter")]
    PretAPorter,
    #[serde(rename = "Atelier")]
    Atelier,
    #[serde(rename = "Haute Couture")]
    HauteCouture,
}

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 3] = [
        DifficultyTier::PretAPorter,
        DifficultyTier::Atelier,
        DifficultyTier::HauteCouture,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DifficultyTier::PretAPorter => "Prêt-à-Porter",
            DifficultyTier::Atelier => "Atelier",
            DifficultyTier::HauteCouture => "Haute Couture",
        }
    }

    pub fn style_description(&self) -> &'static str {
        match self {
            DifficultyTier::PretAPorter => {
                "Approachable dishes built from simple techniques and easy-to-find ingredients, \
                 but plated with elegance and polish (accessibility first)."
            }
            DifficultyTier::Atelier => {
                "Dishes that ask for some technique and care, crafted to bring out the natural \
                 flavour of each ingredient (balance first)."
            }
            DifficultyTier::HauteCouture => {
                "Top-tier artistic dishes with complex preparation, molecular gastronomy \
                 techniques or very delicate handwork (artistry first)."
            }
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown difficulty tier '{0}' (expected one of: Prêt-à-Porter, Atelier, Haute Couture)")]
pub struct UnknownDifficulty(pub String);

impl FromStr for DifficultyTier {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let folded = trimmed.to_lowercase();
        if let Some(tier) = Self::ALL
            .iter()
            .find(|tier| tier.label().to_lowercase() == folded)
        {
            return Ok(*tier);
        }
        match folded.replace(['_', ' '], "-").as_str() {
            "pret-a-porter" | "pret" => Ok(DifficultyTier::PretAPorter),
            "atelier" => Ok(DifficultyTier::Atelier),
            "haute-couture" | "couture" => Ok(DifficultyTier::HauteCouture),
            _ => Err(UnknownDifficulty(trimmed.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub name: String,
    pub description: String,
    pub cooking_time: String,
    pub difficulty: DifficultyTier,
    pub calories: String,
    pub ingredients: Vec<String>,
    pub missing_ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub plating_tip: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedRecipes {
    pub recipes: Vec<Recipe>,
}

// Request fields default when absent so a missing field reaches validation as "empty".

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeImageRequest {
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeImageResponse {
    pub ingredients: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRecipesRequest {
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<DifficultyTier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRecipesResponse {
    pub recipes: Vec<Recipe>,
}

impl From<GeneratedRecipes> for GenerateRecipesResponse {
    fn from(generated: GeneratedRecipes) -> Self {
        Self {
            recipes: generated.recipes,
        }
    }
}

impl From<GenerateRecipesResponse> for GeneratedRecipes {
    fn from(response: GenerateRecipesResponse) -> Self {
        Self {
            recipes: response.recipes,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageRequest {
    #[serde(default)]
    pub recipe_name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageResponse {
    pub image_url: Option<String>,
}

/// The three provider-backed operations, shared by the proxy routes and the proxied client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    AnalyzeImage,
    GenerateRecipes,
    GenerateImage,
}

impl Operation {
    /// Path relative to the API base (`/api` on the proxy server).
    pub fn endpoint(&self) -> &'static str {
        match self {
            Operation::AnalyzeImage => "/ingredients/analyze",
            Operation::GenerateRecipes => "/recipes/generate",
            Operation::GenerateImage => "/recipes/image",
        }
    }

    /// The only failure text ever shown to end users for this operation.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::AnalyzeImage => "Ingredient analysis failed. Please try again.",
            Operation::GenerateRecipes => "Recipe generation failed. Please try again.",
            Operation::GenerateImage => "Recipe image generation failed. Please try again.",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::AnalyzeImage => "analyze-image",
            Operation::GenerateRecipes => "generate-recipes",
            Operation::GenerateImage => "generate-image",
        };
        f.write_str(name)
    }
}
