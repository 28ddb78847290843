//! Configuration for the Connect API server.

use config::builder::DefaultState;
use config::{Config as ConfigLoader, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub oauth: OAuthConfig,
    /// Origin of the single-page frontend. Used for CORS and OAuth redirects.
    #[serde(default = "default_client_url")]
    pub client_url: String,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `sqlite:<path>`, a bare path, or `:memory:`.
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

/// Session token settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing session tokens. Required.
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: i64,
    /// Mark the session cookie `Secure`. Enable behind HTTPS.
    #[serde(default)]
    pub cookie_secure: bool,
}

/// OAuth 2.0 client settings. Endpoints default to Google's.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_redirect_url")]
    pub redirect_url: String,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_userinfo_url")]
    pub userinfo_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_database_url() -> String {
    "sqlite:./data/connect.db".to_string()
}
fn default_token_ttl_days() -> i64 {
    7
}
fn default_client_url() -> String {
    "http://localhost:5173".to_string()
}
fn default_redirect_url() -> String {
    "http://localhost:5000/api/auth/google/callback".to_string()
}
fn default_auth_url() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".to_string()
}
fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}
fn default_userinfo_url() -> String {
    "https://openidconnect.googleapis.com/v1/userinfo".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (CONNECT__SECTION__KEY format)
    /// 2. config.toml file (if present)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::with_defaults()?
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("CONNECT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::finish(config)
    }

    fn with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        ConfigLoader::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .set_default("database.url", default_database_url())?
            .set_default("client_url", default_client_url())?
            .set_default("logging.level", default_log_level())
    }

    fn finish(loaded: ConfigLoader) -> Result<Self, ConfigError> {
        let config: Config = loaded.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Message("auth.jwt_secret must not be empty".to_string()));
        }
        if self.auth.token_ttl_days <= 0 {
            return Err(ConfigError::Message("auth.token_ttl_days must be positive".to_string()));
        }
        if self.oauth.client_id.is_empty() || self.oauth.client_secret.is_empty() {
            return Err(ConfigError::Message(
                "oauth.client_id and oauth.client_secret are required".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Result<Config, ConfigError> {
        let loaded = Config::with_defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Config::finish(loaded)
    }

    const MINIMAL: &str = r#"
        [auth]
        jwt_secret = "s3cret"

        [oauth]
        client_id = "id"
        client_secret = "secret"
    "#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = from_toml(MINIMAL).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.database.url, "sqlite:./data/connect.db");
        assert_eq!(config.client_url, "http://localhost:5173");
        assert_eq!(config.auth.token_ttl_days, 7);
        assert!(!config.auth.cookie_secure);
        assert_eq!(config.oauth.token_url, "https://oauth2.googleapis.com/token");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_overrides() {
        let toml = format!(
            "client_url = \"https://app.example.com\"\n{MINIMAL}\n[server]\nport = 9000\n"
        );
        let config = from_toml(&toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.client_url, "https://app.example.com");
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let toml = r#"
            [auth]
            jwt_secret = "  "

            [oauth]
            client_id = "id"
            client_secret = "secret"
        "#;
        let err = from_toml(toml).unwrap_err();
        assert!(err.to_string().contains("jwt_secret"));
    }

    #[test]
    fn test_missing_oauth_section_is_rejected() {
        let toml = "[auth]\njwt_secret = \"s3cret\"\n";
        assert!(from_toml(toml).is_err());
    }
}
