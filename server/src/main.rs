use mealfinder_core::Recommender;
use mealfinder_server::{api, app, telemetry, AppState, ServerConfig};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    // Check for --openapi flag to dump spec and exit
    if env::args().any(|arg| arg == "--openapi") {
        return match api::openapi().to_pretty_json() {
            Ok(spec) => {
                println!("{}", spec);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to render OpenAPI spec: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    telemetry::init_telemetry();

    let recommender = match Recommender::from_env(true) {
        Ok(recommender) => recommender,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build recipe provider client");
            return ExitCode::FAILURE;
        }
    };
    let state: AppState = Arc::new(recommender);

    let config = ServerConfig::from_env();
    let bind_addr = &config.bind_addr;
    let listener = match tokio::net::TcpListener::bind(bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %bind_addr, error = %e, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(request_timeout = ?config.request_timeout, "Server listening on {}", bind_addr);
    tracing::info!("Swagger UI available at /swagger-ui/");
    tracing::info!("OpenAPI spec available at /api-docs/openapi.json");

    if let Err(e) = axum::serve(listener, app(state, &config)).await {
        tracing::error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
