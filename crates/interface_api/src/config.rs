//! API configuration

use serde::Deserialize;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Database URL
    pub database_url: String,
    /// Upper bound on pooled database connections
    pub db_max_connections: u32,
    /// Seconds a request may wait for a pooled connection
    pub db_acquire_timeout_secs: u64,
    /// Log level or `EnvFilter` directive
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Wire the in-memory person, directory, brev, oppgave and utbetaling ports
    pub use_stub_integrations: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: "postgres://localhost/soknadsbehandling".to_string(),
            db_max_connections: 10,
            db_acquire_timeout_secs: 30,
            log_level: "info".to_string(),
            log_json: false,
            use_stub_integrations: true,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables
    ///
    /// Unset variables keep their [`Default`] value. `DATABASE_URL` is
    /// honoured when `API_DATABASE_URL` is not set.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let database_url = std::env::var("DATABASE_URL").unwrap_or(defaults.database_url);

        config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", defaults.port)?
            .set_default("jwt_secret", defaults.jwt_secret)?
            .set_default("jwt_expiration_secs", defaults.jwt_expiration_secs)?
            .set_default("database_url", database_url)?
            .set_default("db_max_connections", defaults.db_max_connections)?
            .set_default("db_acquire_timeout_secs", defaults.db_acquire_timeout_secs)?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_json", defaults.log_json)?
            .set_default("use_stub_integrations", defaults.use_stub_integrations)?
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Pool settings for [`infra_db::create_pool`]
    pub fn database(&self) -> infra_db::DatabaseConfig {
        infra_db::DatabaseConfig::new(self.database_url.clone())
            .max_connections(self.db_max_connections)
            .acquire_timeout(std::time::Duration::from_secs(self.db_acquire_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_addr() {
        let config = ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 9090,
            ..ApiConfig::default()
        };
        assert_eq!(config.server_addr(), "127.0.0.1:9090");
    }

    #[test]
    fn test_database_settings_carry_over() {
        let config = ApiConfig {
            database_url: "postgres://db/sb".to_string(),
            db_max_connections: 4,
            ..ApiConfig::default()
        };
        let db = config.database();
        assert_eq!(db.url, "postgres://db/sb");
        assert_eq!(db.max_connections, 4);
        assert_eq!(db.acquire_timeout, std::time::Duration::from_secs(30));
    }

    #[test]
    fn test_defaults_use_stub_integrations() {
        let config = ApiConfig::default();
        assert!(config.use_stub_integrations);
        assert!(!config.log_json);
    }
}
