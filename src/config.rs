use crate::cache::CacheTtlPolicy;
use crate::params::{EntityType, Language, Region};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub const CHAMPION_TTL_ENV: &str = "OPGG_CHAMPION_CACHE_TTL";
pub const SEASON_TTL_ENV: &str = "OPGG_SEASON_CACHE_TTL";
pub const VERSION_TTL_ENV: &str = "OPGG_VERSION_CACHE_TTL";
pub const KEYWORD_TTL_ENV: &str = "OPGG_KEYWORD_CACHE_TTL";
pub const CACHE_PATH_ENV: &str = "OPGG_CACHE_PATH";
pub const LANGUAGE_ENV: &str = "OPGG_LANGUAGE";
pub const REGION_ENV: &str = "OPGG_REGION";
pub const HTTP_TIMEOUT_ENV: &str = "OPGG_HTTP_TIMEOUT_SECS";

pub const DEFAULT_CACHE_PATH: &str = "./cache/opgg.db";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct Config {
    pub cache_path: PathBuf,
    pub language: Language,
    pub region: Region,
    pub http_timeout: Duration,
    pub ttl: CacheTtlPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            language: Language::default(),
            region: Region::default(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            ttl: CacheTtlPolicy::default(),
        }
    }
}

impl Config {
    /// Reads `.env` (if any) and the process environment.
    ///
    /// Never fails: malformed values are logged and replaced by defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let cache_path = lookup(CACHE_PATH_ENV)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.cache_path);

        let language = match lookup(LANGUAGE_ENV) {
            Some(raw) if !raw.trim().is_empty() => raw.parse().unwrap_or_else(|e| {
                warn!(value = %raw, error = %e, "Ignoring {}", LANGUAGE_ENV);
                defaults.language
            }),
            _ => defaults.language,
        };

        let region = match lookup(REGION_ENV) {
            Some(raw) if !raw.trim().is_empty() => raw.parse().unwrap_or_else(|e| {
                warn!(value = %raw, error = %e, "Ignoring {}", REGION_ENV);
                defaults.region
            }),
            _ => defaults.region,
        };

        let http_timeout = parse_seconds(HTTP_TIMEOUT_ENV, lookup(HTTP_TIMEOUT_ENV))
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.http_timeout);

        let mut ttl = defaults.ttl;
        for (entity, var) in [
            (EntityType::Champion, CHAMPION_TTL_ENV),
            (EntityType::Season, SEASON_TTL_ENV),
            (EntityType::Version, VERSION_TTL_ENV),
            (EntityType::Keyword, KEYWORD_TTL_ENV),
        ] {
            if let Some(secs) = parse_seconds(var, lookup(var)) {
                ttl.set(entity, Duration::from_secs(secs));
            }
        }

        Config {
            cache_path,
            language,
            region,
            http_timeout,
            ttl,
        }
    }
}

/// `None` when unset, empty, non-numeric or negative.
fn parse_seconds(var: &str, raw: Option<String>) -> Option<u64> {
    let raw = raw?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    match trimmed.parse::<i64>() {
        Ok(secs) if secs >= 0 => Some(secs as u64),
        Ok(secs) => {
            warn!(var, secs, "Negative value, using default");
            None
        }
        Err(_) => {
            warn!(var, value = %trimmed, "Not an integer, using default");
            None
        }
    }
}
