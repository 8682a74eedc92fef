//! Application configuration module
//! Handles environment variable loading, configuration validation, and application settings

use std::env;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub bank: BankClientConfig,
    pub encryption: EncryptionConfig,
    pub cache: CacheSettings,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout: u64,   // seconds
    pub idle_timeout: Option<u64>, // seconds
}

/// Bank gateway client configuration
#[derive(Debug, Clone)]
pub struct BankClientConfig {
    /// Configured bank endpoints; the first entry is used.
    pub base_urls: Vec<String>,
    pub timeout_secs: u64,
    /// Total attempt budget per payment, initial call included.
    pub max_attempts: u32,
    /// Consecutive transient failures before the circuit opens.
    pub breaker_threshold: u32,
    /// How long the circuit stays open before a probe is allowed.
    pub breaker_cooldown_secs: u64,
}

/// At-rest encryption configuration
#[derive(Debug, Clone)]
pub struct EncryptionConfig {
    pub key: String,
}

/// Lookup cache settings
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub payment_ttl_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log format options
#[derive(Debug, Clone)]
pub enum LogFormat {
    Json,
    Plain,
}

/// API-key security settings
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// When set, admin-scoped requests must present exactly this key.
    /// When unset, any non-empty key is accepted (placeholder validator).
    pub admin_api_key: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenv::dotenv().ok();

        Ok(AppConfig {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            bank: BankClientConfig::from_env()?,
            encryption: EncryptionConfig::from_env()?,
            cache: CacheSettings::from_env()?,
            logging: LoggingConfig::from_env()?,
            security: SecurityConfig::from_env(),
        })
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.bank.validate()?;
        self.encryption.validate()?;
        self.logging.validate()?;

        Ok(())
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(ServerConfig {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".to_string()))?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue(
                "SERVER_PORT cannot be 0".to_string(),
            ));
        }

        if self.host.is_empty() {
            return Err(ConfigError::InvalidValue(
                "SERVER_HOST cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(DatabaseConfig {
            url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::MissingVariable("DATABASE_URL".to_string()))?,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()))?,
            min_connections: env::var("DB_MIN_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DB_MIN_CONNECTIONS".to_string()))?,
            connection_timeout: env::var("DB_CONNECTION_TIMEOUT")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DB_CONNECTION_TIMEOUT".to_string()))?,
            idle_timeout: env::var("DB_IDLE_TIMEOUT")
                .ok()
                .and_then(|val| val.parse().ok()),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::InvalidValue("DATABASE_URL".to_string()));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::InvalidValue(
                "DB_MIN_CONNECTIONS must be <= DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(())
    }
}

impl BankClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(BankClientConfig {
            base_urls: env::var("BANK_BASE_URLS")
                .map_err(|_| ConfigError::MissingVariable("BANK_BASE_URLS".to_string()))?
                .split(',')
                .map(|s| s.trim().trim_end_matches('/').to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            timeout_secs: env::var("BANK_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("BANK_TIMEOUT_SECS".to_string()))?,
            max_attempts: env::var("BANK_MAX_ATTEMPTS")
                .unwrap_or_else(|_| "6".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("BANK_MAX_ATTEMPTS".to_string()))?,
            breaker_threshold: env::var("BANK_BREAKER_THRESHOLD")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("BANK_BREAKER_THRESHOLD".to_string()))?,
            breaker_cooldown_secs: env::var("BANK_BREAKER_COOLDOWN_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("BANK_BREAKER_COOLDOWN_SECS".to_string()))?,
        })
    }

    /// The endpoint actually used for payment submission.
    pub fn primary_base_url(&self) -> Result<&str, ConfigError> {
        self.base_urls
            .first()
            .map(|s| s.as_str())
            .ok_or_else(|| ConfigError::InvalidValue("BANK_BASE_URLS".to_string()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn breaker_cooldown(&self) -> Duration {
        Duration::from_secs(self.breaker_cooldown_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_urls.is_empty() {
            return Err(ConfigError::InvalidValue(
                "BANK_BASE_URLS must contain at least one endpoint".to_string(),
            ));
        }

        for url in &self.base_urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue(
                    "BANK_BASE_URLS entries must be valid URLs".to_string(),
                ));
            }
        }

        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidValue("BANK_MAX_ATTEMPTS".to_string()));
        }

        if self.breaker_threshold == 0 {
            return Err(ConfigError::InvalidValue(
                "BANK_BREAKER_THRESHOLD".to_string(),
            ));
        }

        Ok(())
    }
}

impl EncryptionConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(EncryptionConfig {
            key: env::var("ENCRYPTION_KEY")
                .map_err(|_| ConfigError::MissingVariable("ENCRYPTION_KEY".to_string()))?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "ENCRYPTION_KEY cannot be empty".to_string(),
            ));
        }

        if self.key.len() < 32 {
            return Err(ConfigError::InvalidValue(
                "ENCRYPTION_KEY must be at least 32 bytes".to_string(),
            ));
        }

        Ok(())
    }
}

impl CacheSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(CacheSettings {
            payment_ttl_secs: env::var("PAYMENT_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PAYMENT_CACHE_TTL_SECS".to_string()))?,
        })
    }

    pub fn payment_ttl(&self) -> Duration {
        Duration::from_secs(self.payment_ttl_secs)
    }
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "plain".to_string())
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Plain,
            },
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];
        if !valid_levels.contains(&self.level.to_uppercase().as_str()) {
            return Err(ConfigError::InvalidValue("LOG_LEVEL".to_string()));
        }

        Ok(())
    }
}

impl SecurityConfig {
    pub fn from_env() -> Self {
        SecurityConfig {
            admin_api_key: env::var("ADMIN_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),

    #[error("Invalid value for configuration: {0}")]
    InvalidValue(String),
}
