use crate::api::{ApiError, ErrorResponse};
use crate::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use mealfinder_core::{ResolutionQuery, ResolutionResult, ResolutionStrategy};
use utoipa::OpenApi;

#[utoipa::path(
    get,
    path = "/api/recommend",
    tag = "recommend",
    params(ResolutionQuery),
    responses(
        (status = 200, description = "Recommended recipes", body = ResolutionResult),
        (status = 400, description = "Invalid query", body = ErrorResponse),
        (status = 502, description = "Recipe provider unavailable", body = ErrorResponse)
    )
)]
pub async fn recommend_get(
    State(recommender): State<AppState>,
    query: Result<Query<ResolutionQuery>, QueryRejection>,
) -> Result<Json<ResolutionResult>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    Ok(Json(recommender.recommend(&query).await?))
}

#[utoipa::path(
    post,
    path = "/api/recommend",
    tag = "recommend",
    request_body = ResolutionQuery,
    responses(
        (status = 200, description = "Recommended recipes", body = ResolutionResult),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 502, description = "Recipe provider unavailable", body = ErrorResponse)
    )
)]
pub async fn recommend_post(
    State(recommender): State<AppState>,
    body: Result<Json<ResolutionQuery>, JsonRejection>,
) -> Result<Json<ResolutionResult>, ApiError> {
    let Json(query) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    Ok(Json(recommender.recommend(&query).await?))
}

#[derive(OpenApi)]
#[openapi(
    paths(recommend_get, recommend_post),
    components(schemas(ResolutionQuery, ResolutionResult, ResolutionStrategy))
)]
pub struct ApiDoc;
