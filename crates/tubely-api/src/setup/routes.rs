//! Route configuration and setup

use crate::auth::middleware::{auth_middleware, AuthState};
use crate::constants::{API_PREFIX, ASSETS_PATH};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tubely_core::models::ThumbnailStrategy;
use tubely_core::Config;

/// Room for multipart boundaries and part headers on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    let config = &state.config;
    let cors = setup_cors(config);

    let auth_state = Arc::new(AuthState {
        verifier: state.identity.clone(),
    });

    let protected = protected_routes(config).layer(axum::middleware::from_fn_with_state(
        auth_state,
        auth_middleware,
    ));

    let mut app = public_routes(config).merge(protected);

    if config.thumbnail_strategy() == ThumbnailStrategy::LocalFile {
        tracing::info!(assets_root = %config.assets_root(), "Serving thumbnail assets");
        app = app.nest_service(ASSETS_PATH, ServeDir::new(config.assets_root()));
    }

    // Server-level concurrency limit
    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10_000)
        .max(1);
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        "HTTP concurrency limit layer enabled"
    );

    app.merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(DefaultBodyLimit::disable())
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes(config: &Config) -> Router<Arc<AppState>> {
    let router = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        );

    // The registry lookup only exists when thumbnails live in process memory
    if config.thumbnail_strategy() == ThumbnailStrategy::Registry {
        router.route(
            &format!("{}/thumbnails/{{video_id}}", API_PREFIX),
            get(handlers::thumbnail_get::get_thumbnail),
        )
    } else {
        router
    }
}

fn protected_routes(config: &Config) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/video_upload/{{video_id}}", API_PREFIX),
            post(handlers::video_upload::upload_video).layer(RequestBodyLimitLayer::new(
                config.max_video_size_bytes() + MULTIPART_OVERHEAD_BYTES,
            )),
        )
        .route(
            &format!("{}/thumbnail_upload/{{video_id}}", API_PREFIX),
            post(handlers::thumbnail_upload::upload_thumbnail).layer(RequestBodyLimitLayer::new(
                config.max_thumbnail_size_bytes() + MULTIPART_OVERHEAD_BYTES,
            )),
        )
        .route(
            &format!("{}/videos/{{video_id}}", API_PREFIX),
            get(handlers::video_get::get_video),
        )
}

fn setup_cors(config: &Config) -> CorsLayer {
    if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins()
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    }
}
