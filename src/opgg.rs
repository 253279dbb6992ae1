use crate::accessor::{CacheAccessor, GroupRefresh, RefreshReport};
use crate::api::client::OpggClient;
use crate::api::models::{
    Champion, GameSummary, Keyword, SeasonMeta, SummonerProfile, SummonerSearchResult,
};
use crate::api::MetadataFetcher;
use crate::cache::{CacheStats, MetadataStore};
use crate::config::Config;
use crate::error::{AppError, CacheError};
use crate::params::{EntityType, GameType, Language, Region};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{info, warn};

/// Which groups `Opgg::force_refresh_cache` should refetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshRequest {
    /// Empty means every entity type.
    pub entity_types: Vec<EntityType>,
    /// Defaults to the configured language.
    pub language: Option<Language>,
    /// Refresh every language already cached instead of a single one.
    pub all_languages: bool,
}

impl RefreshRequest {
    pub fn all() -> Self {
        RefreshRequest::default()
    }

    pub fn entity(entity: EntityType) -> Self {
        RefreshRequest {
            entity_types: vec![entity],
            ..RefreshRequest::default()
        }
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    pub fn all_languages(mut self) -> Self {
        self.all_languages = true;
        self
    }
}

/// Splits a comma separated list of Riot IDs, rejecting any without a tag.
pub fn parse_riot_ids(query: &str) -> Result<Vec<&str>, AppError> {
    let ids: Vec<&str> = query
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .collect();
    if ids.is_empty() {
        return Err(AppError::InvalidRiotId(query.to_string()));
    }

    for id in &ids {
        match id.split_once('#') {
            Some((name, tag)) if !name.trim().is_empty() && !tag.trim().is_empty() => {}
            _ => return Err(AppError::InvalidRiotId(id.to_string())),
        }
    }
    Ok(ids)
}

/// Entry point for op.gg lookups.
///
/// Metadata calls go through the local cache; summoner lookups and match
/// history always hit the network. If the cache file cannot be opened the
/// instance keeps working without it and fetches every time.
pub struct Opgg {
    config: Config,
    store: Option<MetadataStore>,
    client: OpggClient,
    fetcher: Option<Box<dyn MetadataFetcher>>,
}

impl Opgg {
    pub fn new(config: Config) -> Self {
        let store = match MetadataStore::open(&config.cache_path) {
            Ok(store) => Some(store),
            Err(e) => {
                warn!(
                    cache = %config.cache_path.display(),
                    error = %e,
                    "Metadata cache unavailable, every lookup will hit op.gg"
                );
                None
            }
        };
        let client = OpggClient::new(config.language, config.http_timeout);
        info!(
            cache = %config.cache_path.display(),
            cached = store.is_some(),
            lang = config.language.code(),
            region = config.region.as_str(),
            "op.gg client ready"
        );
        Opgg {
            config,
            store,
            client,
            fetcher: None,
        }
    }

    /// Uses `fetcher` for metadata instead of the live op.gg API.
    pub fn with_fetcher(config: Config, fetcher: Box<dyn MetadataFetcher>) -> Self {
        let mut opgg = Opgg::new(config);
        opgg.fetcher = Some(fetcher);
        opgg
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// `None` when running without a cache.
    pub fn store(&self) -> Option<&MetadataStore> {
        self.store.as_ref()
    }

    fn metadata_source(&self) -> &dyn MetadataFetcher {
        match &self.fetcher {
            Some(fetcher) => fetcher.as_ref(),
            None => &self.client,
        }
    }

    fn accessor(&self) -> CacheAccessor<'_> {
        match &self.store {
            Some(store) => CacheAccessor::new(
                store,
                self.metadata_source(),
                self.config.ttl,
                self.config.language,
            ),
            None => CacheAccessor::without_store(
                self.metadata_source(),
                self.config.ttl,
                self.config.language,
            ),
        }
    }

    pub fn get_all_champions(
        &self,
        language: Option<Language>,
        force_refresh: bool,
    ) -> Result<Vec<Champion>, AppError> {
        self.accessor().champions(language, force_refresh)
    }

    pub fn get_champion_by_id(
        &self,
        id: u32,
        language: Option<Language>,
    ) -> Result<Option<Champion>, AppError> {
        self.accessor().champion_by_id(id, language)
    }

    pub fn find_champions(
        &self,
        name: &str,
        language: Option<Language>,
    ) -> Result<Vec<Champion>, AppError> {
        self.accessor().champions_by_name(name, language)
    }

    pub fn get_all_seasons(&self, force_refresh: bool) -> Result<Vec<SeasonMeta>, AppError> {
        self.accessor().seasons(force_refresh)
    }

    /// Game versions, newest first as op.gg lists them.
    pub fn get_versions(&self, force_refresh: bool) -> Result<Vec<String>, AppError> {
        Ok(self
            .accessor()
            .versions(force_refresh)?
            .into_iter()
            .map(|v| v.version)
            .collect())
    }

    pub fn get_keywords(
        &self,
        language: Option<Language>,
        force_refresh: bool,
    ) -> Result<Vec<Keyword>, AppError> {
        self.accessor().keywords(language, force_refresh)
    }

    fn refresh_groups(&self, request: &RefreshRequest) -> Vec<(EntityType, Option<Language>)> {
        let entities: Vec<EntityType> = if request.entity_types.is_empty() {
            EntityType::ALL.to_vec()
        } else {
            request.entity_types.clone()
        };
        let language = request.language.unwrap_or(self.config.language);

        if request.all_languages {
            return self.accessor().known_groups(&entities, &[language]);
        }
        entities
            .into_iter()
            .map(|entity| (entity, entity.scope(Some(language))))
            .collect()
    }

    /// Number of groups `request` would refresh.
    pub fn refresh_size(&self, request: &RefreshRequest) -> usize {
        self.refresh_groups(request).len()
    }

    pub fn force_refresh_cache(&self, request: &RefreshRequest) -> RefreshReport {
        self.force_refresh_cache_with(request, |_| {})
    }

    /// Like `force_refresh_cache`, calling `on_done` as each group finishes.
    pub fn force_refresh_cache_with<F>(&self, request: &RefreshRequest, on_done: F) -> RefreshReport
    where
        F: Fn(&GroupRefresh) + Sync,
    {
        let groups = self.refresh_groups(request);
        let report = self.accessor().refresh_groups(&groups, on_done);
        info!(
            groups = report.groups.len(),
            failed = report.failed().count(),
            "Cache refresh finished"
        );
        report
    }

    pub fn clear_cache(
        &self,
        entity: Option<EntityType>,
        language: Option<Language>,
    ) -> Result<usize, AppError> {
        let removed = self.accessor().clear_cache(entity, language)?;
        info!(
            entity = entity.map(EntityType::as_str).unwrap_or("all"),
            lang = language.map(Language::code).unwrap_or("all"),
            removed,
            "Cache cleared"
        );
        Ok(removed)
    }

    pub fn get_cache_stats(&self) -> Result<CacheStats, AppError> {
        let store = self.store.as_ref().ok_or(CacheError::Unavailable)?;
        Ok(store.stats(&self.config.ttl)?)
    }

    pub fn champion_cache_ttl(&self) -> Duration {
        self.config.ttl.get(EntityType::Champion)
    }

    /// Overrides the champion TTL for this instance, ahead of any
    /// environment setting. Zero disables expiry.
    pub fn set_champion_cache_ttl(&mut self, seconds: i64) -> Result<(), AppError> {
        let seconds = u64::try_from(seconds).map_err(|_| {
            AppError::ConfigError(format!("cache TTL must be non-negative, got {}", seconds))
        })?;
        self.set_cache_ttl(EntityType::Champion, Duration::from_secs(seconds));
        Ok(())
    }

    pub fn set_cache_ttl(&mut self, entity: EntityType, ttl: Duration) {
        self.config.ttl.set(entity, ttl);
    }

    /// Looks up one or more comma separated Riot IDs (`Name#TAG, Other#EUW`).
    ///
    /// Every ID must carry its tag. A summoner matched by several IDs is
    /// returned once.
    pub fn search(
        &self,
        riot_ids: &str,
        region: Option<Region>,
    ) -> Result<Vec<SummonerSearchResult>, AppError> {
        let region = region.unwrap_or(self.config.region);
        let mut seen = HashSet::new();
        let mut results = Vec::new();

        for riot_id in parse_riot_ids(riot_ids)? {
            let found = self.client.search(riot_id, region)?;
            if found.is_empty() {
                info!(riot_id, region = region.as_str(), "No summoner found");
            }
            results.extend(
                found
                    .into_iter()
                    .filter(|s| seen.insert(s.summoner_id.clone())),
            );
        }
        Ok(results)
    }

    pub fn get_summoner(
        &self,
        summoner_id: &str,
        region: Option<Region>,
    ) -> Result<SummonerProfile, AppError> {
        self.client
            .summoner(summoner_id, region.unwrap_or(self.config.region))
    }

    pub fn recent_games(
        &self,
        summoner_id: &str,
        region: Option<Region>,
        limit: usize,
        game_type: GameType,
    ) -> Result<Vec<GameSummary>, AppError> {
        self.client.recent_games(
            summoner_id,
            region.unwrap_or(self.config.region),
            limit,
            game_type,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_riot_ids_splits_on_commas() {
        let ids = parse_riot_ids("Hide on bush#KR1, Doublelift#NA1 ,").unwrap();
        assert_eq!(ids, vec!["Hide on bush#KR1", "Doublelift#NA1"]);
    }

    #[test]
    fn test_parse_riot_ids_requires_tags() {
        for query in ["Faker", "Faker#KR1,Caps", "#EUW", "Caps#", " , "] {
            let err = parse_riot_ids(query).unwrap_err();
            assert!(matches!(err, AppError::InvalidRiotId(_)), "query {:?}", query);
        }
    }
}
