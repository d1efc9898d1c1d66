//! Immunoscreen core library
//!
//! Patient registry, rule-based and ML-backed primary immune deficiency risk
//! assessment, and the HTTP API that exposes them.

pub mod api;
pub mod core;
pub mod db;
pub mod error;
pub mod models;

pub use error::AppError;

/// Application configuration
pub mod config {
    use serde::Deserialize;

    /// Default location of the external prediction service
    pub const DEFAULT_ML_SERVICE_URL: &str = "http://localhost:8000";

    #[derive(Debug, Clone, Deserialize)]
    pub struct Config {
        pub server: ServerConfig,
        pub database: DatabaseConfig,
        pub ml: MlConfig,
        #[serde(default)]
        pub log: LogConfig,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ServerConfig {
        pub host: String,
        pub port: u16,
        #[serde(default)]
        pub allowed_origins: Vec<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct DatabaseConfig {
        pub url: String,
        #[serde(default = "default_max_connections")]
        pub max_connections: u32,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct MlConfig {
        #[serde(default = "default_ml_service_url")]
        pub service_url: String,
        /// No timeout unless set; the HTTP client default applies.
        #[serde(default)]
        pub timeout_secs: Option<u64>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct LogConfig {
        pub filter: String,
        pub json: bool,
    }

    impl Default for LogConfig {
        fn default() -> Self {
            Self {
                filter: "info".into(),
                json: false,
            }
        }
    }

    impl Default for MlConfig {
        fn default() -> Self {
            Self {
                service_url: default_ml_service_url(),
                timeout_secs: None,
            }
        }
    }

    fn default_max_connections() -> u32 {
        5
    }

    fn default_ml_service_url() -> String {
        DEFAULT_ML_SERVICE_URL.to_string()
    }

    /// Load configuration from file
    pub fn load_config() -> Result<Config, config::ConfigError> {
        let env = std::env::var("IMMUNOSCREEN_ENV").unwrap_or_else(|_| "development".into());

        config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "sqlite://immunoscreen.db?mode=rwc")?
            .set_default("ml.service_url", DEFAULT_ML_SERVICE_URL)?
            // Start with default settings
            .add_source(config::File::with_name("config/default").required(false))
            // Override with environment-specific settings
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            // Override with environment variables
            .add_source(
                config::Environment::with_prefix("IMMUNOSCREEN")
                    .prefix_separator("__")
                    .separator("__"),
            )
            // Plain deployment variables win over everything else
            .set_override_option("ml.service_url", std::env::var("ML_SERVICE_URL").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .build()?
            .try_deserialize()
    }

}
