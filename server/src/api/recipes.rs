use crate::api::{ApiError, ErrorResponse};
use crate::AppState;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use mealfinder_core::{Language, NormalizedRecipe};
use serde::Deserialize;
use utoipa::{IntoParams, OpenApi};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipeParams {
    /// Language code for the returned text. Defaults to "en".
    pub language: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = String, Path, description = "Provider recipe ID"),
        RecipeParams
    ),
    responses(
        (status = 200, description = "Recipe details", body = NormalizedRecipe),
        (status = 400, description = "Invalid language", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 502, description = "Recipe provider unavailable", body = ErrorResponse)
    )
)]
pub async fn get_recipe(
    State(recommender): State<AppState>,
    Path(id): Path<String>,
    params: Result<Query<RecipeParams>, QueryRejection>,
) -> Result<Json<NormalizedRecipe>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let language = Language::from_param(params.language.as_deref())?;

    recommender
        .lookup(&id, &language)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Recipe not found"))
}

#[derive(OpenApi)]
#[openapi(paths(get_recipe))]
pub struct ApiDoc;
