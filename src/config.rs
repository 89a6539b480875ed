// src/config.rs

use std::env;
use std::net::SocketAddr;

use dotenvy::dotenv;

use crate::error::AppError;

/// Number of identifiers returned in an analytics ranking.
pub const TOP_RANKING_LIMIT: usize = 10;

/// Page size used by attempt listings when the caller does not send one.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Upper bound on the page size a caller can request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Identity key for attempts that carry neither an email nor a name.
pub const ANONYMOUS_IDENTITY: &str = "anonymous";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub rust_log: String,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::InternalServerError(format!("BIND_ADDR is invalid: {}", e)))?;

        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw.parse::<u32>().map_err(|e| {
                AppError::InternalServerError(format!("DB_MAX_CONNECTIONS is invalid: {}", e))
            })?,
            Err(_) => 5,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            rust_log,
            bind_addr,
            db_max_connections,
        })
    }
}

fn required(key: &str) -> Result<String, AppError> {
    env::var(key).map_err(|_| AppError::InternalServerError(format!("{} must be set", key)))
}
