use std::path::PathBuf;
use thiserror::Error;

use crate::params::EntityType;

/// Failures raised by the local metadata store.
///
/// None of these are fatal: the accessor treats any of them as "cache empty"
/// and goes to the network instead.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Failed to create cache directory: {path}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cached {entity} entry '{key}' is unreadable: {source}")]
    Payload {
        entity: EntityType,
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cached payload schema v{found} does not match v{expected}")]
    SchemaVersion { found: u32, expected: u32 },

    #[error("Metadata cache is unavailable")]
    Unavailable,

    #[error("Expected a {expected} payload, got {found}")]
    EntityMismatch {
        expected: EntityType,
        found: EntityType,
    },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Rate limit exceeded, please try again later")]
    RateLimited,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid Riot ID '{0}', expected Name#TAG")]
    InvalidRiotId(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),

    #[error(transparent)]
    Cache(#[from] CacheError),
}
