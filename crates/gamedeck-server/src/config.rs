use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Config file read when `GAMEDECK_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "gamedeck.toml";

/// Top-level server configuration, loaded from `gamedeck.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Directory holding the built WASM client and its assets.
    pub web_root: String,
    pub log_format: LogFormat,
    pub limits: LimitsConfig,
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            web_root: "web".to_string(),
            log_format: LogFormat::default(),
            limits: LimitsConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub request_timeout_secs: u64,
    /// Suggestion endpoint: max burst tokens per IP.
    pub suggest_rate_limit_burst: usize,
    /// Suggestion endpoint: token refill rate (requests per second) per IP.
    pub suggest_rate_limit_per_sec: f64,
    /// Longest accepted search query, in characters.
    pub max_query_len: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 10,
            suggest_rate_limit_burst: 20,
            suggest_rate_limit_per_sec: 5.0,
            max_query_len: 100,
        }
    }
}

/// Cross-origin access for the JSON API. Empty means same-origin only.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Exact origins, or `"*"` for any.
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub reason: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

impl std::error::Error for ConfigError {}

/// Where the active configuration came from, reported once logging is up.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
    /// The file exists but could not be parsed; defaults were used.
    Invalid { path: PathBuf, error: String },
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError {
                field: "listen_addr",
                reason: format!("{:?} is not a valid socket address", self.listen_addr),
            });
        }
        if self.limits.request_timeout_secs == 0 {
            return Err(ConfigError {
                field: "limits.request_timeout_secs",
                reason: "must be > 0".to_string(),
            });
        }
        if self.limits.suggest_rate_limit_burst == 0 {
            return Err(ConfigError {
                field: "limits.suggest_rate_limit_burst",
                reason: "must be > 0".to_string(),
            });
        }
        let rate = self.limits.suggest_rate_limit_per_sec;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ConfigError {
                field: "limits.suggest_rate_limit_per_sec",
                reason: format!("must be a finite number > 0, got {rate}"),
            });
        }
        if self.limits.max_query_len == 0 {
            return Err(ConfigError {
                field: "limits.max_query_len",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }

    /// Load config from `GAMEDECK_CONFIG` (or `gamedeck.toml`) if present,
    /// then apply env var overrides.
    pub fn load() -> (Self, ConfigSource) {
        let path = std::env::var("GAMEDECK_CONFIG")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        let (mut config, source) = Self::load_from(&path);
        config.apply_env_overrides();
        (config, source)
    }

    pub fn load_from(path: &Path) -> (Self, ConfigSource) {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<ServerConfig>(&content) {
                Ok(cfg) => (cfg, ConfigSource::File(path.to_path_buf())),
                Err(e) => (
                    ServerConfig::default(),
                    ConfigSource::Invalid {
                        path: path.to_path_buf(),
                        error: e.to_string(),
                    },
                ),
            },
            Err(_) => (ServerConfig::default(), ConfigSource::Defaults),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("GAMEDECK_LISTEN_ADDR")
            && !addr.is_empty()
        {
            self.listen_addr = addr;
        }
        if let Ok(root) = std::env::var("GAMEDECK_WEB_ROOT")
            && !root.is_empty()
        {
            self.web_root = root;
        }
        if let Ok(val) = std::env::var("GAMEDECK_LOG_FORMAT")
            && let Some(format) = LogFormat::parse(&val)
        {
            self.log_format = format;
        }
        if let Ok(val) = std::env::var("GAMEDECK_SUGGEST_RATE_LIMIT")
            && let Ok(n) = val.parse::<f64>()
        {
            self.limits.suggest_rate_limit_per_sec = n;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.listen_addr, "0.0.0.0:8080");
        assert_eq!(cfg.web_root, "web");
        assert_eq!(cfg.log_format, LogFormat::Text);
        assert!(cfg.cors.allowed_origins.is_empty());
        assert_eq!(cfg.limits.max_query_len, 100);
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(ServerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_invalid_addr() {
        let cfg = ServerConfig {
            listen_addr: "not-an-address".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(cfg.validate().unwrap_err().field, "listen_addr");
    }

    #[test]
    fn validate_rejects_zero_limits() {
        let cfg = ServerConfig {
            limits: LimitsConfig {
                suggest_rate_limit_per_sec: 0.0,
                ..LimitsConfig::default()
            },
            ..ServerConfig::default()
        };
        assert_eq!(
            cfg.validate().unwrap_err().field,
            "limits.suggest_rate_limit_per_sec"
        );

        let cfg = ServerConfig {
            limits: LimitsConfig {
                max_query_len: 0,
                ..LimitsConfig::default()
            },
            ..ServerConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_finite_rate() {
        for rate in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let cfg = ServerConfig {
                limits: LimitsConfig {
                    suggest_rate_limit_per_sec: rate,
                    ..LimitsConfig::default()
                },
                ..ServerConfig::default()
            };
            let err = cfg.validate().unwrap_err();
            assert_eq!(err.field, "limits.suggest_rate_limit_per_sec", "rate {rate}");
        }
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
listen_addr = "127.0.0.1:9090"
web_root = "/var/www/gamedeck"
log_format = "json"

[limits]
request_timeout_secs = 3
suggest_rate_limit_burst = 5
suggest_rate_limit_per_sec = 1.5
max_query_len = 40

[cors]
allowed_origins = ["https://play.example.com"]
"#;
        let cfg: ServerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.listen_addr, "127.0.0.1:9090");
        assert_eq!(cfg.web_root, "/var/www/gamedeck");
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.limits.request_timeout_secs, 3);
        assert_eq!(cfg.limits.suggest_rate_limit_burst, 5);
        assert!((cfg.limits.suggest_rate_limit_per_sec - 1.5).abs() < f64::EPSILON);
        assert_eq!(cfg.limits.max_query_len, 40);
        assert_eq!(cfg.cors.allowed_origins, vec!["https://play.example.com"]);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let cfg: ServerConfig = toml::from_str("listen_addr = \"0.0.0.0:3000\"\n").unwrap();
        assert_eq!(cfg.listen_addr, "0.0.0.0:3000");
        assert_eq!(cfg.limits.suggest_rate_limit_burst, 20);
        assert_eq!(cfg.limits.request_timeout_secs, 10);
    }

    #[test]
    fn load_from_missing_file_uses_defaults() {
        let (cfg, source) = ServerConfig::load_from(Path::new("/nonexistent/gamedeck.toml"));
        assert!(matches!(source, ConfigSource::Defaults));
        assert_eq!(cfg.listen_addr, "0.0.0.0:8080");
    }

    #[test]
    fn load_from_invalid_file_reports_error() {
        let name = format!("gamedeck-invalid-{}.toml", std::process::id());
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, "listen_addr = [").unwrap();
        let (cfg, source) = ServerConfig::load_from(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(source, ConfigSource::Invalid { .. }));
        assert_eq!(cfg.web_root, "web");
    }

    #[test]
    fn log_format_parse() {
        assert_eq!(LogFormat::parse(" JSON "), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse("text"), Some(LogFormat::Text));
        assert_eq!(LogFormat::parse("xml"), None);
    }
}
