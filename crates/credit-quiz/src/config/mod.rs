use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let data_dir = env::var("QUIZ_DATA_DIR").unwrap_or_else(|_| "data".to_string());
        let mut storage = StorageConfig::in_dir(data_dir);
        storage.apply_env_overrides();

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            storage,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Locations of the JSON documents backing the quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub catalog_path: PathBuf,
    pub scoring_path: PathBuf,
    pub rules_path: PathBuf,
    pub dashboard_path: PathBuf,
    pub initial_dashboard_path: PathBuf,
    pub history_path: PathBuf,
}

impl StorageConfig {
    /// Default file names inside a single data directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            catalog_path: dir.join("questions.json"),
            scoring_path: dir.join("scoring.json"),
            rules_path: dir.join("answer_rules.json"),
            dashboard_path: dir.join("dashboard.json"),
            initial_dashboard_path: dir.join("dashboard_initial.json"),
            history_path: dir.join("history.json"),
        }
    }

    fn apply_env_overrides(&mut self) {
        let overrides: [(&str, &mut PathBuf); 6] = [
            ("QUIZ_CATALOG_PATH", &mut self.catalog_path),
            ("QUIZ_SCORING_PATH", &mut self.scoring_path),
            ("QUIZ_RULES_PATH", &mut self.rules_path),
            ("QUIZ_DASHBOARD_PATH", &mut self.dashboard_path),
            ("QUIZ_INITIAL_DASHBOARD_PATH", &mut self.initial_dashboard_path),
            ("QUIZ_HISTORY_PATH", &mut self.history_path),
        ];

        for (key, slot) in overrides {
            if let Ok(value) = env::var(key) {
                if !value.trim().is_empty() {
                    *slot = PathBuf::from(value.trim());
                }
            }
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
