use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::controllers::{catalog::CatalogController, health, speech::SpeechController};
use crate::infrastructure::config::Config;
use crate::infrastructure::middleware::request_id_middleware;

/// Build the application router
pub fn create_router(
    speech_controller: Arc<SpeechController>,
    catalog_controller: Arc<CatalogController>,
) -> Router {
    let speech_routes = Router::new()
        .route("/api/speech/generate", post(SpeechController::generate))
        .route("/api/speech/status", get(SpeechController::status))
        .route("/api/speech/stop", post(SpeechController::stop))
        .with_state(speech_controller);

    let catalog_routes = Router::new()
        .route("/api/voices", get(CatalogController::list_voices))
        .route("/api/accents", get(CatalogController::list_accents))
        .with_state(catalog_controller);

    Router::new()
        .route("/health", get(health::health))
        .merge(speech_routes)
        .merge(catalog_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Allow a browser front end served from `origin` to call the API
pub fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let origin: HeaderValue = origin.parse()?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]))
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(config: &Config, app: Router) -> anyhow::Result<()> {
    let app = match &config.cors_allowed_origin {
        Some(origin) => {
            tracing::info!(origin = %origin, "CORS enabled");
            app.layer(cors_layer(origin)?)
        }
        None => app,
    };

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
