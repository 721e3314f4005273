pub mod api;
pub mod config;
pub mod error;
pub mod health;
pub mod rate_limit;
pub mod state;

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderValue, header};
use axum::middleware;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use gamedeck_core::catalog::Catalog;

use config::{CorsConfig, ServerConfig};
use state::AppState;

pub use rate_limit::spawn_limiter_cleanup;

/// Build the Axum router and application state from a config, serving the
/// built-in catalog.
pub fn build_app(config: ServerConfig) -> (Router<()>, AppState) {
    build_app_with_catalog(config, Catalog::seeded())
}

pub fn build_app_with_catalog(config: ServerConfig, catalog: Catalog) -> (Router<()>, AppState) {
    let web_root = config.web_root.clone();
    let timeout = Duration::from_secs(config.limits.request_timeout_secs);
    let cors = cors_layer(&config.cors);
    let state = AppState::with_catalog(config, catalog);

    let api_routes = Router::new()
        .route("/games", get(api::list_games))
        .route("/games/{id}", get(api::get_game))
        .route("/home", get(api::home))
        .route("/collections/{slug}", get(api::get_collection))
        .route("/search", get(api::search))
        .route(
            "/search/suggestions",
            get(api::suggestions).route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit::limit_by_ip,
            )),
        )
        .layer(
            ServiceBuilder::new()
                .layer(cors)
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-cache"),
                )),
        );

    let app = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api/v1", api_routes)
        .fallback_service(ServeDir::new(&web_root))
        .layer(
            ServiceBuilder::new()
                .layer(TimeoutLayer::new(timeout))
                .layer(CompressionLayer::new()),
        )
        .with_state(state.clone());

    (app, state)
}

/// Empty list: no CORS headers, so browsers keep same-origin behavior.
fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods([axum::http::Method::GET]);
    if cors.allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            },
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
