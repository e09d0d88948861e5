use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// Upstream recipe database name.
    pub source: String,
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health(State(recommender): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        source: recommender.source_name().to_string(),
    })
}

#[derive(OpenApi)]
#[openapi(paths(health), components(schemas(HealthResponse)))]
pub struct ApiDoc;
