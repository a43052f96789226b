use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;
use tracing::{debug, warn};

use crate::api_connection::endpoints::GenerateContentResponse;
use crate::chef::ChefError;
use crate::request_builder::RequestBuilder;
use crate::schema::{DifficultyTier, GeneratedRecipes};

/// Removes a surrounding markdown code fence (```json ... ```) if the model added one.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    if !(trimmed.starts_with("```") && trimmed.ends_with("```") && trimmed.len() >= 6) {
        return trimmed;
    }
    let inner = &trimmed[3..trimmed.len() - 3];
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.trim()
}

fn parse_json(text: &str) -> Result<Value, ChefError> {
    let content = strip_code_fences(text);
    serde_json::from_str(content).map_err(|e| {
        debug!(error = %e, content, "provider output is not valid JSON");
        ChefError::Parse(format!("invalid JSON: {e}"))
    })
}

/// Ingredient names from an analyze-image response. No text means nothing was recognised.
pub fn parse_ingredients(response: &GenerateContentResponse) -> Result<Vec<String>, ChefError> {
    let Some(text) = response.text().filter(|text| !text.trim().is_empty()) else {
        return Ok(Vec::new());
    };
    let value = parse_json(&text)?;
    RequestBuilder::ingredient_list_schema()
        .validate(&value)
        .map_err(|v| ChefError::Parse(v.to_string()))?;
    let names: Vec<String> = serde_json::from_value(value)
        .map_err(|e| ChefError::Parse(e.to_string()))?;
    Ok(names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}

/// Recipes from a generate-recipes response. A difficulty that differs from the requested
/// tier is logged and passed through unchanged.
pub fn parse_recipes(
    response: &GenerateContentResponse,
    requested: DifficultyTier,
) -> Result<GeneratedRecipes, ChefError> {
    let text = response
        .text()
        .filter(|text| !text.trim().is_empty())
        .ok_or(ChefError::EmptyResult)?;
    let value = parse_json(&text)?;
    RequestBuilder::recipe_collection_schema()
        .validate(&value)
        .map_err(|v| ChefError::Parse(v.to_string()))?;
    let generated: GeneratedRecipes =
        serde_json::from_value(value).map_err(|e| ChefError::Parse(e.to_string()))?;

    for recipe in generated
        .recipes
        .iter()
        .filter(|recipe| recipe.difficulty != requested)
    {
        warn!(
            recipe = %recipe.name,
            requested = %requested,
            returned = %recipe.difficulty,
            "provider returned a recipe for a different difficulty tier"
        );
    }
    Ok(generated)
}

/// First inline image of a generate-image response as a data URI. Anything that would not
/// form a well-formed URI is treated as no image.
pub fn extract_image_data_uri(response: &GenerateContentResponse) -> Option<String> {
    let inline = response.first_inline_data()?;
    let data: String = inline.data.chars().filter(|c| !c.is_whitespace()).collect();
    if data.is_empty() || BASE64.decode(data.as_bytes()).is_err() {
        warn!("provider returned an inline image that is not valid base64");
        return None;
    }
    let mime_type = if inline.mime_type.starts_with("image/") {
        inline.mime_type.as_str()
    } else {
        "image/png"
    };
    Some(format!("data:{mime_type};base64,{data}"))
}
