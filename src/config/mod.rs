use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub stripe: StripeConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public base URL, used to build checkout success/cancel redirects when
    /// the request carries no Origin header.
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allowed_origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: "*".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StripeConfig {
    pub secret_key: Option<String>,
    #[serde(default)]
    pub enabled: bool,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.base_url", "http://localhost:8080")?
            .set_default("database.url", "sqlite://holiday_explorer.db")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.jwt_secret", "change-me-in-production")?
            .set_default("cors.allowed_origin", "*")?
            .set_default("stripe.enabled", false)?
            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (with HOLIDAY__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("HOLIDAY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://holiday_explorer.db".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                jwt_secret: "change-me-in-production".to_string(),
            },
            cors: CorsConfig::default(),
            stripe: StripeConfig::default(),
        }
    }
}
