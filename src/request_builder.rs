//! Prompt and output-schema construction for the three provider operations.
//!
//! Both the in-process client and the proxy server go through [`RequestBuilder`], so the
//! provider sees identical requests whichever path the caller takes.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use thiserror::Error;

use crate::api_connection::endpoints::{
    Content, GenerateContentRequest, GenerationConfig, Part, ResponseSchema, DEFAULT_IMAGE_MODEL,
    DEFAULT_TEXT_MODEL,
};
use crate::schema::DifficultyTier;

pub const DEFAULT_LANGUAGE: &str = "English";
pub const RECIPES_PER_CALL: usize = 3;

const HEAD_CHEF_PERSONA: &str = "You are the head chef of a world-renowned three-Michelin-star \
restaurant. You propose creative, artistic dishes and your tone is elegant and refined.";

/// A fully formed provider call: which model to hit and with what body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderCall {
    pub model: String,
    pub request: GenerateContentRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImagePayloadError {
    #[error("image payload is empty")]
    Empty,
    #[error("image payload is not valid base64")]
    InvalidBase64,
    #[error("image is {size} bytes, the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },
}

/// An uploaded photo, normalised to bare base64 plus its mime type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: String,
}

impl ImagePayload {
    /// Accepts bare base64 or a `data:<mime>;base64,<data>` URI.
    pub fn parse(raw: &str, max_bytes: usize) -> Result<Self, ImagePayloadError> {
        let raw = raw.trim();
        let (declared_mime, encoded) = match raw.strip_prefix("data:") {
            Some(rest) => {
                let (header, data) = rest
                    .split_once(',')
                    .ok_or(ImagePayloadError::InvalidBase64)?;
                let mime = header.strip_suffix(";base64").unwrap_or(header);
                (Some(mime.to_string()).filter(|m| m.starts_with("image/")), data)
            }
            None => (None, raw),
        };
        let encoded: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        if encoded.is_empty() {
            return Err(ImagePayloadError::Empty);
        }
        // Decoded size is known from the encoded length, so oversized uploads are
        // refused before decoding.
        let approx_size = encoded.len() / 4 * 3;
        if approx_size > max_bytes.saturating_add(2) {
            return Err(ImagePayloadError::TooLarge {
                size: approx_size,
                limit: max_bytes,
            });
        }
        let bytes = BASE64
            .decode(encoded.as_bytes())
            .map_err(|_| ImagePayloadError::InvalidBase64)?;
        if bytes.len() > max_bytes {
            return Err(ImagePayloadError::TooLarge {
                size: bytes.len(),
                limit: max_bytes,
            });
        }
        let mime_type = declared_mime.unwrap_or_else(|| sniff_mime_type(&bytes).to_string());
        Ok(Self {
            mime_type,
            data: encoded,
        })
    }
}

fn sniff_mime_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        "image/png"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "image/jpeg"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBuilder {
    pub text_model: String,
    pub image_model: String,
    pub language: String,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self {
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl RequestBuilder {
    pub fn new(text_model: &str, image_model: &str, language: &str) -> Self {
        Self {
            text_model: text_model.to_string(),
            image_model: image_model.to_string(),
            language: language.to_string(),
        }
    }

    pub fn ingredient_list_schema() -> ResponseSchema {
        ResponseSchema::array_of(ResponseSchema::string())
    }

    pub fn recipe_collection_schema() -> ResponseSchema {
        let tiers: Vec<&str> = DifficultyTier::ALL.iter().map(|t| t.label()).collect();
        let recipe = ResponseSchema::object(vec![
            (
                "name",
                ResponseSchema::string().described("An elegant, creative name for the dish"),
            ),
            (
                "description",
                ResponseSchema::string()
                    .described("A poetic, enticing one-line description of the dish"),
            ),
            ("cookingTime", ResponseSchema::string().described("Cooking time")),
            ("difficulty", ResponseSchema::string().one_of(&tiers)),
            ("calories", ResponseSchema::string().described("Estimated calories")),
            (
                "ingredients",
                ResponseSchema::array_of(ResponseSchema::string())
                    .described("Full list of ingredients")
                    .with_min_items(1),
            ),
            (
                "missingIngredients",
                ResponseSchema::array_of(ResponseSchema::string())
                    .described("Key ingredients needed beyond the ones supplied"),
            ),
            (
                "instructions",
                ResponseSchema::array_of(ResponseSchema::string())
                    .described("Step-by-step instructions, one step per entry")
                    .with_min_items(1),
            ),
            (
                "platingTip",
                ResponseSchema::string().described("An artistic plating tip"),
            ),
        ]);
        ResponseSchema::object(vec![("recipes", ResponseSchema::array_of(recipe))])
    }

    pub fn analyze_image(&self, image: &ImagePayload) -> ProviderCall {
        let prompt = format!(
            "This photo shows the inside of a refrigerator or a set of ingredients.\n\
             Identify the food ingredients visible in the photo and list them as single words in {language}.\n\
             Exclude condiments and sauces, beverages, and containers of prepared side dishes; \
             only list raw cooking ingredients (vegetables, meat, fish, fruit, eggs and the like).\n\
             The response must be a JSON array of strings, for example: [\"egg\", \"onion\", \"bell pepper\", \"milk\"]",
            language = self.language
        );
        ProviderCall {
            model: self.text_model.clone(),
            request: GenerateContentRequest {
                contents: vec![Content::user(vec![
                    Part::inline(image.mime_type.clone(), image.data.clone()),
                    Part::text(prompt),
                ])],
                system_instruction: None,
                generation_config: Some(GenerationConfig::json(Self::ingredient_list_schema())),
            },
        }
    }

    pub fn generate_recipes(&self, ingredients: &[String], difficulty: DifficultyTier) -> ProviderCall {
        let prompt = format!(
            "These are the ingredients I currently have in my refrigerator: {ingredients}.\n\n\
             Using them as the main ingredients, suggest exactly {count} highly creative and original dishes \
             that are rarely seen in everyday life.\n\
             Leave out ordinary home cooking (stews, fried rice and other everyday staples); every dish should be \
             a fusion or fine-dining creation that showcases a chef's artistic sense.\n\n\
             Requested difficulty tier: {tier}\n\
             {style}\n\
             Every recipe must match this difficulty tier precisely.\n\n\
             Each recipe must include:\n\
             - name: an elegant name that sparks curiosity\n\
             - description: an enticing one-line description that poetically evokes taste and atmosphere\n\
             - cookingTime: the cooking time\n\
             - difficulty: always exactly '{tier}'\n\
             - calories: the estimated calories\n\
             - ingredients: the full list of required ingredients\n\
             - missingIngredients: key ingredients needed for flavour beyond the ones I listed\n\
             - instructions: detailed step-by-step instructions, professional culinary terms welcome\n\
             - platingTip: advice for visual beauty (colour harmony, use of negative space)\n\n\
             Write every text field in {language}. The response must be JSON.",
            ingredients = ingredients.join(", "),
            count = RECIPES_PER_CALL,
            tier = difficulty.label(),
            style = difficulty.style_description(),
            language = self.language,
        );
        ProviderCall {
            model: self.text_model.clone(),
            request: GenerateContentRequest {
                contents: vec![Content::user(vec![Part::text(prompt)])],
                system_instruction: Some(Content::system(HEAD_CHEF_PERSONA)),
                generation_config: Some(GenerationConfig::json(Self::recipe_collection_schema())),
            },
        }
    }

    pub fn generate_image(&self, recipe_name: &str, description: &str) -> ProviderCall {
        let prompt = format!(
            "Create a stunning, high-end professional food photography image of a dish named \"{recipe_name}\".\n\
             Dish description: {description}.\n\n\
             Style requirements:\n\
             - Michelin-star quality plating.\n\
             - Soft, natural, window-light illumination.\n\
             - Shallow depth of field (bokeh background).\n\
             - Highly detailed textures of the food.\n\
             - Elegant tableware and cutlery.\n\
             - The overall vibe should be luxurious, appetizing, and artistic.\n\
             - Top-down or 45-degree angle view.\n\
             - 4k resolution, hyper-realistic."
        );
        ProviderCall {
            model: self.image_model.clone(),
            request: GenerateContentRequest {
                contents: vec![Content::user(vec![Part::text(prompt)])],
                system_instruction: None,
                generation_config: Some(GenerationConfig {
                    response_modalities: Some(vec!["TEXT".to_string(), "IMAGE".to_string()]),
                    ..GenerationConfig::default()
                }),
            },
        }
    }
}
