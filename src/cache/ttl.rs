use crate::params::EntityType;
use std::time::Duration;

/// Seven days.
pub const DEFAULT_TTL_SECS: u64 = 60 * 60 * 24 * 7;

/// How long each entity type stays fresh after a full fetch.
///
/// A zero TTL disables expiry: a group that has been fetched once is never
/// considered stale again until it is invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtlPolicy {
    champion: Duration,
    season: Duration,
    version: Duration,
    keyword: Duration,
}

impl Default for CacheTtlPolicy {
    fn default() -> Self {
        CacheTtlPolicy::uniform(Duration::from_secs(DEFAULT_TTL_SECS))
    }
}

impl CacheTtlPolicy {
    pub fn uniform(ttl: Duration) -> Self {
        CacheTtlPolicy {
            champion: ttl,
            season: ttl,
            version: ttl,
            keyword: ttl,
        }
    }

    pub fn get(&self, entity: EntityType) -> Duration {
        match entity {
            EntityType::Champion => self.champion,
            EntityType::Season => self.season,
            EntityType::Version => self.version,
            EntityType::Keyword => self.keyword,
        }
    }

    pub fn set(&mut self, entity: EntityType, ttl: Duration) {
        let slot = match entity {
            EntityType::Champion => &mut self.champion,
            EntityType::Season => &mut self.season,
            EntityType::Version => &mut self.version,
            EntityType::Keyword => &mut self.keyword,
        };
        *slot = ttl;
    }

    pub fn with(mut self, entity: EntityType, ttl: Duration) -> Self {
        self.set(entity, ttl);
        self
    }
}
