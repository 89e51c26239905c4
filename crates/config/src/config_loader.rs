use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::{debug, info, warn};

use app_error::{AppError, AppResult};

/// Complete application configuration loaded from JSON file
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub database: SurrealDbConfig,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SurrealDbConfig {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub namespace: String,
    pub database: String,
    pub pool: DbPoolConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DbPoolConfig {
    pub size: usize,
    pub connection_timeout: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub body_limit: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SecurityConfig {
    pub jwt: JwtSettings,
    pub cors: CorsConfig,
    pub password: PasswordConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub expiry_hours: u64,
    pub algorithm: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PasswordConfig {
    pub min_length: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(&fs::read_to_string(path)?)?;
        debug!("Configuration loaded from file");
        Ok(config)
    }

    /// Load configuration from the embedded default document, apply
    /// environment overrides, then validate
    pub fn load() -> AppResult<Self> {
        let config_content =
            std::str::from_utf8(include_bytes!("../res/app-config.json")).expect("Invalid UTF-8");

        let mut config = match serde_json::from_str::<AppConfig>(config_content) {
            Ok(conf) => {
                info!("Loaded configuration for environment: {}", conf.environment);
                conf
            }
            Err(e) => {
                warn!(
                    "Failed to load config file: {}. Using default configuration.",
                    e
                );
                Self::default()
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Deployment-specific values come from the environment when present:
    /// listen port, token-signing secret, and the store endpoint
    fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            match port.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("Ignoring invalid PORT value: {}", port),
            }
        }

        if let Ok(secret) = std::env::var("TOKEN_SECRET") {
            self.security.jwt.secret = secret;
        }

        if let Ok(endpoint) = std::env::var("DB_ENDPOINT") {
            self.database.endpoint = endpoint;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = Vec::new();
        let is_production = self.environment == "production";

        // Endpoint validation
        if self.database.endpoint.trim().is_empty() {
            errors.push("Database endpoint cannot be empty".to_string());
        } else if is_production
            && !self.database.endpoint.starts_with("wss://")
            && !self.database.endpoint.contains("memory")
        {
            errors.push(
                "Production should use a secure 'wss://' database connection".to_string(),
            );
        }

        if self.database.namespace.trim().is_empty() {
            errors.push("Database namespace cannot be empty".to_string());
        }

        if self.database.database.trim().is_empty() {
            errors.push("Database name cannot be empty".to_string());
        }

        if is_production {
            if self.database.username == "root" {
                errors.push("Using default 'root' username in production is insecure".to_string());
            }

            if self.database.password == "root" {
                errors.push("Using default 'root' password in production is insecure".to_string());
            }
        }

        // Validate server configuration
        if self.server.host.trim().is_empty() {
            errors.push("Server host cannot be empty".to_string());
        }

        if self.server.port == 0 {
            errors.push("Server port cannot be 0".to_string());
        }

        // Validate security configuration
        if is_production
            && (self.security.jwt.secret.len() < 32
                || self.security.jwt.secret == "your-strong-secret-key-here")
        {
            errors.push("JWT secret is not secure for production use".to_string());
        }

        if self.security.password.min_length == 0 {
            errors.push("Password minimum length cannot be 0".to_string());
        }

        if !errors.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "Invalid configuration: {}",
                errors.join(", ")
            )));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            database: SurrealDbConfig {
                endpoint: "ws://localhost:8000".to_string(),
                username: "root".to_string(),
                password: "root".to_string(),
                namespace: "accounts".to_string(),
                database: "accounts".to_string(),
                pool: DbPoolConfig {
                    size: 5,
                    connection_timeout: 5000,
                },
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5005,
                body_limit: 1048576, // 1MB
            },
            security: SecurityConfig {
                jwt: JwtSettings {
                    secret: "default-insecure-jwt-secret-do-not-use-in-production".to_string(),
                    expiry_hours: 6,
                    algorithm: "HS256".to_string(),
                },
                cors: CorsConfig {
                    allowed_origins: vec!["*".to_string()],
                    allowed_methods: vec![
                        "GET".to_string(),
                        "POST".to_string(),
                        "PUT".to_string(),
                        "DELETE".to_string(),
                        "OPTIONS".to_string(),
                    ],
                    allowed_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
                },
                password: PasswordConfig { min_length: 6 },
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}
