//! Configuration management for DealBridge
//!
//! This module handles loading and validating configuration from environment variables,
//! with support for different environments (development, staging, production).

use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid environment value: {0}")]
    InvalidValue(String),

    #[error("Invalid port number: {0}")]
    InvalidPort(String),
}

/// Application environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue(format!(
                "Invalid environment: '{}'. Expected: dev, staging, or prod",
                s
            ))),
        }
    }
}

impl Environment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Get the environment name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL. `None` selects the in-memory store.
    pub database_url: Option<String>,

    /// Current environment
    pub environment: Environment,

    /// Server port
    pub port: u16,

    /// Maximum database connections
    pub db_max_connections: u32,

    /// CORS allowed origins
    pub cors_allowed_origins: Option<String>,

    /// Log level (RUST_LOG)
    pub log_level: String,

    /// Session lifetime in hours (default: 168 = 7 days)
    pub session_ttl_hours: i64,

    /// Revoke older sessions of a user on login
    pub single_session: bool,

    /// bcrypt work factor
    pub bcrypt_cost: u32,

    /// Minimum accepted password length on registration
    pub min_password_length: usize,

    /// Document encryption keys, `key_id:base64key` separated by commas.
    /// The first entry encrypts new uploads.
    pub document_keys: Option<String>,

    /// Upper bound on a single uploaded document, in bytes
    pub max_document_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            environment: Environment::Development,
            port: 3001,
            db_max_connections: 5,
            cors_allowed_origins: None,
            log_level: "info".to_string(),
            session_ttl_hours: 168,
            single_session: true,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            min_password_length: 8,
            document_keys: None,
            max_document_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let environment = env::var("ENVIRONMENT")
            .map(|s| s.parse::<Environment>())
            .unwrap_or(Ok(Environment::Development))?;

        let database_url = env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());

        if database_url.is_none() && environment.is_production() {
            return Err(ConfigError::MissingEnvVar("DATABASE_URL".to_string()));
        }

        let port = env::var("PORT")
            .unwrap_or_else(|_| defaults.port.to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort("PORT must be a valid number".to_string()))?;

        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", defaults.db_max_connections);

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS").ok();

        let log_level = env::var("RUST_LOG").unwrap_or(defaults.log_level);

        let session_ttl_hours = parse_or("SESSION_TTL_HOURS", defaults.session_ttl_hours);
        if session_ttl_hours <= 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_TTL_HOURS must be positive".to_string(),
            ));
        }

        let single_session = parse_or("SINGLE_SESSION", defaults.single_session);

        let bcrypt_cost = parse_or("BCRYPT_COST", defaults.bcrypt_cost);
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidValue(format!(
                "BCRYPT_COST must be between 4 and 31, got {}",
                bcrypt_cost
            )));
        }

        let min_password_length = parse_or("MIN_PASSWORD_LENGTH", defaults.min_password_length);

        let document_keys = env::var("DOCUMENT_KEYS").ok().filter(|s| !s.is_empty());

        if document_keys.is_none() && environment.is_production() {
            return Err(ConfigError::MissingEnvVar("DOCUMENT_KEYS".to_string()));
        }

        let max_document_bytes = parse_or("MAX_DOCUMENT_BYTES", defaults.max_document_bytes);

        Ok(Config {
            database_url,
            environment,
            port,
            db_max_connections,
            cors_allowed_origins,
            log_level,
            session_ttl_hours,
            single_session,
            bcrypt_cost,
            min_password_length,
            document_keys,
            max_document_bytes,
        })
    }

    /// Get database URL with the password masked, for logging
    pub fn database_url_masked(&self) -> Option<String> {
        self.database_url.as_deref().map(mask_url_password)
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn mask_url_password(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            // scheme colon only, no password
            if !url[colon_pos..].starts_with("://") {
                return format!("{}****{}", &url[..colon_pos + 1], &url[at_pos..]);
            }
        }
    }
    url.to_string()
}
