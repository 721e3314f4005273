use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub catalog: CatalogInfo,
}

#[derive(Serialize)]
pub struct CatalogInfo {
    pub games: usize,
    pub embedded: usize,
}

/// Structured health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        catalog: CatalogInfo {
            games: state.catalog.len(),
            embedded: state.catalog.embedded().len(),
        },
    })
}

/// Ready once the catalog holds at least one game.
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.catalog.is_empty() {
        return (StatusCode::SERVICE_UNAVAILABLE, "not ready: catalog is empty");
    }
    (StatusCode::OK, "ready")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use gamedeck_core::catalog::Catalog;

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "healthy",
            version: "0.1.0",
            catalog: CatalogInfo {
                games: 17,
                embedded: 2,
            },
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"healthy\""));
        assert!(json.contains("\"games\":17"));
    }

    #[tokio::test]
    async fn empty_catalog_is_not_ready() {
        let state = AppState::with_catalog(ServerConfig::default(), Catalog::default());
        let (status, _) = readiness_check(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, body) = readiness_check(State(AppState::new(ServerConfig::default()))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ready");
    }
}
