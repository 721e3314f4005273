use std::net::SocketAddr;
use std::time::Duration;

use gamedeck_core::catalog::Catalog;
use gamedeck_server::build_app_with_catalog;
use gamedeck_server::config::{LimitsConfig, ServerConfig};

pub struct TestServer {
    pub addr: SocketAddr,
    _shutdown: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a test server over the built-in catalog.
    pub async fn new() -> Self {
        Self::from_parts(test_config(), Catalog::seeded()).await
    }

    pub async fn with_catalog(catalog: Catalog) -> Self {
        Self::from_parts(test_config(), catalog).await
    }

    /// Start a test server whose suggestion bucket holds `burst` tokens and
    /// never refills.
    pub async fn with_suggest_burst(burst: usize) -> Self {
        let config = ServerConfig {
            limits: LimitsConfig {
                suggest_rate_limit_burst: burst,
                suggest_rate_limit_per_sec: f64::MIN_POSITIVE,
                ..LimitsConfig::default()
            },
            ..test_config()
        };
        Self::from_parts(config, Catalog::seeded()).await
    }

    async fn from_parts(config: ServerConfig, catalog: Catalog) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (app, _state) = build_app_with_catalog(config, catalog);

        let handle = tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            _shutdown: handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn api_url(&self, path: &str) -> String {
        format!("http://{}/api/v1{path}", self.addr)
    }
}

/// Default config pointed at a web root that does not exist.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        web_root: "/nonexistent/gamedeck-web".to_string(),
        ..ServerConfig::default()
    }
}

pub async fn get_json(url: &str) -> (u16, serde_json::Value) {
    let resp = reqwest::get(url).await.unwrap();
    let status = resp.status().as_u16();
    let body = resp.json().await.unwrap();
    (status, body)
}
