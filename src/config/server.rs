//! Server settings loaded from environment variables.
//!
//! Values are read once at start-up. `.env` is loaded by `main` before this runs, so anything
//! in that file behaves like a real environment variable.

use crate::auth::jwt::JwtConfig;
use crate::config::database;
use crate::errors::{Error, Result};
use std::path::PathBuf;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:4200";
const DEFAULT_JWT_EXPIRATION_MINUTES: i64 = 1440;
const MIN_JWT_SECRET_LEN: usize = 32;

/// Runtime configuration for the HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Database connection string
    pub database_url: String,
    /// Token signing settings
    pub jwt: JwtConfig,
    /// Origins allowed by CORS
    pub cors_allowed_origins: Vec<String>,
    /// Whether to seed an empty database at start-up
    pub seed_on_startup: bool,
    /// Location of the seed catalog
    pub catalog_path: PathBuf,
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    /// Returns `Error::Config` if `JWT_SECRET` is missing or too short, or if a numeric or
    /// boolean variable does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET").ok_or_else(|| Error::Config {
            message: "JWT_SECRET must be set".to_string(),
        })?;
        if secret.len() < MIN_JWT_SECRET_LEN {
            return Err(Error::Config {
                message: format!("JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} characters long"),
            });
        }

        let port = parse_or(&lookup, "SERVER_PORT", DEFAULT_PORT)?;
        let expiration_minutes =
            parse_or(&lookup, "JWT_EXPIRATION_MINUTES", DEFAULT_JWT_EXPIRATION_MINUTES)?;
        let seed_on_startup = parse_or(&lookup, "SEED_ON_STARTUP", true)?;

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(ToString::to_string)
            .collect();

        Ok(Self {
            host: lookup("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| database::DEFAULT_DATABASE_URL.to_string()),
            jwt: JwtConfig {
                secret,
                expiration_minutes,
                issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "recipe-costing".to_string()),
            },
            cors_allowed_origins,
            seed_on_startup,
            catalog_path: lookup("CATALOG_PATH")
                .map_or_else(|| PathBuf::from("config.toml"), PathBuf::from),
        })
    }

    /// `host:port` string suitable for binding a listener
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim().parse().map_err(|e| Error::Config {
            message: format!("Invalid value for {key} ({raw}): {e}"),
        })
    })
}
