//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

#[cfg(feature = "postgres")]
use quill_infra::DatabaseConfig;
use quill_infra::JwtConfig;
use quill_infra::auth::DEFAULT_JWT_SECRET;

use crate::telemetry::TelemetryConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_or("PORT", 8080),
            #[cfg(feature = "postgres")]
            database: env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
                url,
                max_connections: parse_or("DB_MAX_CONNECTIONS", 100),
                min_connections: parse_or("DB_MIN_CONNECTIONS", 10),
            }),
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string()),
                expiration_hours: parse_or("JWT_EXPIRATION_HOURS", 24),
                issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "quill-api".to_string()),
            },
            telemetry: TelemetryConfig::from_env(),
        }
    }

    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production" || v == "prod")
            .unwrap_or(false)
    }

    /// Log loudly when running on the built-in JWT secret.
    pub fn warn_on_insecure_defaults(&self) {
        if self.jwt.secret != DEFAULT_JWT_SECRET {
            return;
        }
        if Self::is_production() {
            tracing::error!(
                "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
            );
        } else {
            tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
        }
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
