pub mod health;
pub mod recipes;
pub mod recommend;

use crate::AppState;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use mealfinder_core::{IngredientItem, NormalizedRecipe, RecommendError};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Handler error carrying the status it maps to.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<RecommendError> for ApiError {
    fn from(err: RecommendError) -> Self {
        match err {
            RecommendError::InvalidInput(message) => Self::bad_request(message),
            RecommendError::ProviderUnavailable { stage, source } => {
                tracing::error!(stage, error = %source, "recipe provider unavailable");
                Self {
                    status: StatusCode::BAD_GATEWAY,
                    message: format!("Recipe provider unavailable during {}", stage),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse::new(self.message))).into_response()
    }
}

/// Returns the router for every /api endpoint
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health::health))
        .route(
            "/api/recommend",
            get(recommend::recommend_get).post(recommend::recommend_post),
        )
        .route("/api/recipes/{id}", get(recipes::get_recipe))
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(
        info(title = "mealfinder", description = "Recipe recommendations from TheMealDB"),
        components(schemas(ErrorResponse, NormalizedRecipe, IngredientItem))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        health::ApiDoc::openapi(),
        recommend::ApiDoc::openapi(),
        recipes::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}
