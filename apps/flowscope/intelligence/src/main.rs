use axum_helpers::server::{create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    // Both upstream clients are built once here and injected into the service
    let state = AppState::new(&config)?;

    // create_router adds docs/middleware and nests our routes under /api
    let router = create_router::<openapi::ApiDoc>(api::routes(&state))?;

    // - /health: liveness with app name/version
    // - /ready: 503 until the completion API key is configured
    let app = router
        .merge(health_router(config.app))
        .merge(api::ready_router(&state));

    info!(
        "Starting {} v{} with graceful shutdown (30s timeout)",
        config.app.name, config.app.version
    );

    create_production_app(app, &config.server, Duration::from_secs(30), async move {
        // reqwest pools close when the service is dropped
        drop(state);
        info!("Upstream HTTP clients released");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("FlowScope Intelligence shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use domain_intelligence::{CompletionConfig, FlowScopeConfig};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app() -> Router {
        let config = temp_env::with_vars_unset(["ANTHROPIC_API_KEY", "PORT"], || {
            Config::from_env().unwrap()
        });
        let config = Config {
            // nothing listens on port 1
            flowscope: FlowScopeConfig::new("http://127.0.0.1:1"),
            completion: CompletionConfig::new(None),
            ..config
        };
        let state = AppState::new(&config).unwrap();

        let router = temp_env::with_var_unset("CORS_ALLOWED_ORIGIN", || {
            create_router::<openapi::ApiDoc>(api::routes(&state)).unwrap()
        });
        router
            .merge(health_router(config.app))
            .merge(api::ready_router(&state))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_is_up_without_api_key() {
        let (status, body) = get(app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "flowscope_intelligence");
    }

    #[tokio::test]
    async fn test_ready_is_503_without_api_key() {
        let (status, body) = get(app(), "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "SERVICE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_api_routes_are_nested() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/analyze")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        // reached the handler: not configured rather than 404
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let (status, body) = get(app(), "/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"].get("/analyze").is_some());
    }
}
