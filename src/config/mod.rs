/// Database configuration and connection management
pub mod database;

/// Seed catalog loading from config.toml
pub mod catalog;

/// Server settings (bind address, JWT, CORS) from environment variables
pub mod server;
