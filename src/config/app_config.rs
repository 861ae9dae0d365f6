use serde::Deserialize;

use crate::infrastructure::storage::StorageConfig;
use crate::infrastructure::user::MIN_TOKEN_BYTES;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Random bytes per remember token
    pub remember_token_bytes: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            remember_token_bytes: 32,
        }
    }
}

impl AppConfig {
    /// Load `config/default`, `config/local`, then `APP__*` variables
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize::<Self>()?.validate()
    }

    /// Reject settings the services cannot run safely with
    pub fn validate(self) -> Result<Self, config::ConfigError> {
        if self.security.remember_token_bytes < MIN_TOKEN_BYTES {
            return Err(config::ConfigError::Message(format!(
                "security.remember_token_bytes must be at least {}, got {}",
                MIN_TOKEN_BYTES, self.security.remember_token_bytes
            )));
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::StorageType;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.logging.level, "info");
        assert!(matches!(config.logging.format, LogFormat::Pretty));
        assert_eq!(config.storage.backend, StorageType::Memory);
        assert_eq!(config.security.remember_token_bytes, 32);
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let source = r#"
            [logging]
            format = "json"

            [storage]
            backend = "postgres"

            [storage.postgres]
            url = "postgres://db/accounts"
            max_connections = 4
        "#;

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.logging.level, "info");
        assert!(matches!(config.logging.format, LogFormat::Json));
        assert_eq!(config.storage.backend, StorageType::Postgres);
        assert_eq!(config.storage.postgres.url, "postgres://db/accounts");
        assert_eq!(config.storage.postgres.max_connections, 4);
        assert_eq!(config.storage.postgres.min_connections, 1);
    }

    #[test]
    fn test_rejects_short_remember_tokens() {
        let source = r#"
            [security]
            remember_token_bytes = 0
        "#;

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("remember_token_bytes"));

        assert!(AppConfig::default().validate().is_ok());
    }
}
