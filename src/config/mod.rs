// Configuration module entry point
// Loads layered configuration and holds the per-process application state

mod state;
mod types;

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File};
use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    AssetsConfig, Config, DatabaseConfig, HealthConfig, HttpConfig, LoggingConfig,
    PerformanceConfig, ServerConfig,
};

/// Environment variable prefix, e.g. `PRICELOG_SERVER__PORT=9000`
const ENV_PREFIX: &str = "PRICELOG";

impl Config {
    /// Load configuration from `config.toml` (if present) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from specified file path (extension optional)
    /// Missing files are skipped; environment variables override file values
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        Self::with_defaults()?
            .add_source(File::with_name(config_path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Built-in defaults only, ignoring files and environment
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::with_defaults()?.build()?.try_deserialize()
    }

    fn with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8787)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "pricelog/0.1")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("http.expose_error_details", false)?
            .set_default("database.path", "pricelog.db")?
            .set_default("database.create_schema", true)?
            .set_default("database.busy_timeout_ms", 5000)?
            .set_default("assets.dir", "public")?
            .set_default("assets.index_file", "index.html")
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
