use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State as AxumState},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use super::{error::AppError, state::State};
use crate::schema::{
    AnalyzeImageRequest, AnalyzeImageResponse, GenerateImageRequest, GenerateImageResponse,
    GenerateRecipesRequest, GenerateRecipesResponse, Operation,
};

type AppState = AxumState<Arc<State>>;

pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "SousChef Backend Server",
        "status": "running",
        "apiEndpoints": {
            "health": "/api/health",
            "analyzeImage": format!("POST /api{}", Operation::AnalyzeImage.endpoint()),
            "generateRecipes": format!("POST /api{}", Operation::GenerateRecipes.endpoint()),
            "generateImage": format!("POST /api{}", Operation::GenerateImage.endpoint()),
        }
    }))
}

pub async fn favicon_handler() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "Server is running" }))
}

pub async fn analyze_image_handler(
    AxumState(state): AppState,
    payload: Result<Json<AnalyzeImageRequest>, JsonRejection>,
) -> Result<Json<AnalyzeImageResponse>, AppError> {
    let Json(request) = payload?;
    let ingredients = state
        .chef
        .analyze_image(&request.image)
        .await
        .map_err(|e| AppError::from_chef(Operation::AnalyzeImage, e))?;
    Ok(Json(AnalyzeImageResponse { ingredients }))
}

pub async fn generate_recipes_handler(
    AxumState(state): AppState,
    payload: Result<Json<GenerateRecipesRequest>, JsonRejection>,
) -> Result<Json<GenerateRecipesResponse>, AppError> {
    let Json(request) = payload?;
    let generated = state
        .chef
        .generate_recipes(&request.ingredients, request.difficulty)
        .await
        .map_err(|e| AppError::from_chef(Operation::GenerateRecipes, e))?;
    Ok(Json(generated.into()))
}

pub async fn generate_image_handler(
    AxumState(state): AppState,
    payload: Result<Json<GenerateImageRequest>, JsonRejection>,
) -> Result<Json<GenerateImageResponse>, AppError> {
    let Json(request) = payload?;
    let image_url = state
        .chef
        .generate_image(&request.recipe_name, &request.description)
        .await
        .map_err(|e| AppError::from_chef(Operation::GenerateImage, e))?;
    Ok(Json(GenerateImageResponse { image_url }))
}
