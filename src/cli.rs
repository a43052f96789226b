use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use clap::{Parser, Subcommand};
use tokio::fs;
use tracing::info;

use crate::client::{self, chef_from_config, RecipeService};
use crate::config::{ClientMode, Config};
use crate::schema::{DifficultyTier, Recipe};
use crate::server::start_server;

#[derive(Parser, Debug)]
#[command(author, version, about = "Creative recipe suggestions from the ingredients you have", long_about = None)]
pub struct Cli {
    /// Reach the provider directly or through the proxy server (overrides SOUSCHEF_MODE)
    #[arg(long, global = true)]
    pub mode: Option<ClientMode>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP proxy server
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// List the raw ingredients visible in a photo
    Analyze {
        /// Path to a photo of the fridge or of ingredients
        #[arg(short, long)]
        image: PathBuf,
    },
    /// Suggest three recipes for the given ingredients
    Recipes {
        /// Ingredient you have; repeat or separate with commas
        #[arg(short, long = "ingredient", value_delimiter = ',')]
        ingredients: Vec<String>,
        /// Also add the ingredients recognised in this photo
        #[arg(long)]
        from_image: Option<PathBuf>,
        /// Prêt-à-Porter, Atelier or Haute Couture
        #[arg(short, long)]
        difficulty: DifficultyTier,
        /// Print the raw JSON instead of formatted recipes
        #[arg(long)]
        json: bool,
    },
    /// Generate a photo of a plated dish
    Image {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        description: String,
        /// Write the decoded image here instead of printing the data URI
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Set-union of ingredient lists: keeps first occurrences in order and drops blanks.
pub fn merge_ingredients(existing: &[String], extra: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(existing.len());
    for ingredient in existing.iter().cloned().chain(extra) {
        let ingredient = ingredient.trim().to_string();
        if !ingredient.is_empty() && !merged.contains(&ingredient) {
            merged.push(ingredient);
        }
    }
    merged
}

pub async fn read_image_base64(path: &Path) -> Result<String> {
    let bytes = fs::read(path)
        .await
        .with_context(|| format!("Failed to read image file '{}'", path.display()))?;
    Ok(BASE64.encode(bytes))
}

pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let (_, data) = uri
        .split_once(";base64,")
        .ok_or_else(|| anyhow!("not a base64 data URI"))?;
    BASE64.decode(data).context("image data is not valid base64")
}

pub fn format_recipe(index: usize, recipe: &Recipe) -> String {
    let mut out = format!(
        "{}. {} [{}]\n   {}\n   Time: {} | Calories: {}\n   Ingredients: {}\n",
        index + 1,
        recipe.name,
        recipe.difficulty,
        recipe.description,
        recipe.cooking_time,
        recipe.calories,
        recipe.ingredients.join(", "),
    );
    if !recipe.missing_ingredients.is_empty() {
        out.push_str(&format!("   Also needed: {}\n", recipe.missing_ingredients.join(", ")));
    }
    for (step, instruction) in recipe.instructions.iter().enumerate() {
        out.push_str(&format!("   {}) {}\n", step + 1, instruction));
    }
    out.push_str(&format!("   Plating: {}\n", recipe.plating_tip));
    out
}

pub async fn run(cli: Cli, mut config: Config) -> Result<()> {
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }

    match cli.command {
        Command::Serve { port } => {
            let chef = chef_from_config(&config).context("Cannot start the proxy server")?;
            start_server(chef, port.unwrap_or(config.port), config.max_body_bytes()).await
        }
        Command::Analyze { image } => {
            let service = client::from_config(&config)?;
            let ingredients = analyze_file(service.as_ref(), &image).await?;
            if ingredients.is_empty() {
                println!("No ingredients recognised.");
            }
            for ingredient in ingredients {
                println!("{ingredient}");
            }
            Ok(())
        }
        Command::Recipes {
            ingredients,
            from_image,
            difficulty,
            json,
        } => {
            let service = client::from_config(&config)?;
            let mut pantry = merge_ingredients(&[], ingredients);
            if let Some(path) = from_image {
                let recognised = analyze_file(service.as_ref(), &path).await?;
                pantry = merge_ingredients(&pantry, recognised);
            }
            if pantry.is_empty() {
                return Err(anyhow!("Provide at least one ingredient (--ingredient or --from-image)"));
            }
            info!(ingredients = ?pantry, %difficulty, "requesting recipes");

            let generated = service.generate_recipes(&pantry, difficulty).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&generated)?);
            } else {
                for (idx, recipe) in generated.recipes.iter().enumerate() {
                    println!("{}", format_recipe(idx, recipe));
                }
            }
            Ok(())
        }
        Command::Image {
            name,
            description,
            output,
        } => {
            let service = client::from_config(&config)?;
            let Some(image_url) = service.generate_image(&name, &description).await? else {
                println!("No image was generated for '{name}'.");
                return Ok(());
            };
            match output {
                Some(path) => {
                    let bytes = decode_data_uri(&image_url)?;
                    fs::write(&path, bytes)
                        .await
                        .with_context(|| format!("Failed to write '{}'", path.display()))?;
                    println!("Saved image to {}", path.display());
                }
                None => println!("{image_url}"),
            }
            Ok(())
        }
    }
}

async fn analyze_file(service: &dyn RecipeService, path: &Path) -> Result<Vec<String>> {
    let image = read_image_base64(path).await?;
    Ok(service.analyze_image(&image).await?)
}
