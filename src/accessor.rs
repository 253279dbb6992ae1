//! Cache-aware access to metadata.
//!
//! Serves a group from the store while it is fresh, otherwise fetches it,
//! replaces the cached group, and falls back to stale rows when the network
//! is unavailable.

use crate::api::models::{Champion, GameVersion, Keyword, SeasonMeta};
use crate::api::MetadataFetcher;
use crate::cache::{CacheTtlPolicy, CachedEntity, MetadataItem, MetadataStore};
use crate::error::{AppError, CacheError};
use crate::params::{EntityType, Language};
use std::thread;
use tracing::{debug, info, warn};

/// A cacheable model together with the remote call that produces it.
pub trait RemoteEntity: CachedEntity + Send {
    fn fetch(fetcher: &dyn MetadataFetcher, language: Language) -> Result<Vec<Self>, AppError>;
}

impl RemoteEntity for Champion {
    fn fetch(fetcher: &dyn MetadataFetcher, language: Language) -> Result<Vec<Self>, AppError> {
        fetcher.fetch_champions(language)
    }
}

impl RemoteEntity for SeasonMeta {
    fn fetch(fetcher: &dyn MetadataFetcher, _language: Language) -> Result<Vec<Self>, AppError> {
        fetcher.fetch_seasons()
    }
}

impl RemoteEntity for GameVersion {
    fn fetch(fetcher: &dyn MetadataFetcher, _language: Language) -> Result<Vec<Self>, AppError> {
        Ok(fetcher
            .fetch_versions()?
            .into_iter()
            .map(GameVersion::from)
            .collect())
    }
}

impl RemoteEntity for Keyword {
    fn fetch(fetcher: &dyn MetadataFetcher, language: Language) -> Result<Vec<Self>, AppError> {
        fetcher.fetch_keywords(language)
    }
}

/// Outcome of refreshing one (entity type, language) group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRefresh {
    pub entity_type: EntityType,
    pub language: Option<Language>,
    /// Number of items stored, or the error that stopped this group.
    pub result: Result<usize, String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshReport {
    pub groups: Vec<GroupRefresh>,
}

impl RefreshReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &GroupRefresh> {
        self.groups.iter().filter(|g| g.result.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &GroupRefresh> {
        self.groups.iter().filter(|g| g.result.is_err())
    }

    /// Items stored for `entity` across all successful groups.
    pub fn count(&self, entity: EntityType) -> usize {
        self.succeeded()
            .filter(|g| g.entity_type == entity)
            .filter_map(|g| g.result.as_ref().ok())
            .sum()
    }

    pub fn languages(&self, entity: EntityType) -> Vec<Language> {
        self.succeeded()
            .filter(|g| g.entity_type == entity)
            .filter_map(|g| g.language)
            .collect()
    }
}

pub struct CacheAccessor<'a> {
    /// `None` when the cache file could not be opened; every read is then a
    /// miss and every write is skipped.
    store: Option<&'a MetadataStore>,
    fetcher: &'a dyn MetadataFetcher,
    ttl: CacheTtlPolicy,
    default_language: Language,
}

impl<'a> CacheAccessor<'a> {
    pub fn new(
        store: &'a MetadataStore,
        fetcher: &'a dyn MetadataFetcher,
        ttl: CacheTtlPolicy,
        default_language: Language,
    ) -> Self {
        CacheAccessor {
            store: Some(store),
            fetcher,
            ttl,
            default_language,
        }
    }

    /// An accessor with no backing store. Always fetches.
    pub fn without_store(
        fetcher: &'a dyn MetadataFetcher,
        ttl: CacheTtlPolicy,
        default_language: Language,
    ) -> Self {
        CacheAccessor {
            store: None,
            fetcher,
            ttl,
            default_language,
        }
    }

    fn store(&self) -> Result<&'a MetadataStore, CacheError> {
        self.store.ok_or(CacheError::Unavailable)
    }

    /// Localized entities always resolve to a concrete language; the others
    /// always resolve to the language-agnostic group.
    fn resolve(&self, entity: EntityType, language: Option<Language>) -> Option<Language> {
        entity.scope(Some(language.unwrap_or(self.default_language)))
    }

    fn cached<T: CachedEntity>(&self, language: Option<Language>) -> Result<Vec<T>, CacheError> {
        Ok(self
            .store()?
            .get_all(T::ENTITY, language)?
            .into_iter()
            .filter_map(|entry| T::from_item(entry.payload))
            .collect())
    }

    fn fresh_cached<T: CachedEntity>(
        &self,
        language: Option<Language>,
    ) -> Result<Option<Vec<T>>, CacheError> {
        if self.store()?.is_stale(T::ENTITY, language, self.ttl.get(T::ENTITY))? {
            return Ok(None);
        }
        self.cached(language).map(Some)
    }

    fn persist<T: CachedEntity>(
        &self,
        language: Option<Language>,
        items: &[T],
    ) -> Result<usize, CacheError> {
        let rows: Vec<(String, MetadataItem)> = items
            .iter()
            .cloned()
            .map(|item| {
                let item = item.into_item();
                (item.cache_key(), item)
            })
            .collect();
        self.store()?.put_many(T::ENTITY, language, &rows)
    }

    fn fetch<T: RemoteEntity>(&self, language: Option<Language>) -> Result<Vec<T>, AppError> {
        T::fetch(self.fetcher, language.unwrap_or(self.default_language))
    }

    /// Returns the cached group while it is fresh, otherwise refetches it.
    ///
    /// A failed fetch falls back to whatever is cached, stale or not, and only
    /// errors when there is nothing cached to return.
    pub fn get_or_refresh<T: RemoteEntity>(
        &self,
        language: Option<Language>,
        force_refresh: bool,
    ) -> Result<Vec<T>, AppError> {
        let entity = T::ENTITY;
        let language = self.resolve(entity, language);
        let lang = language.map(Language::code).unwrap_or("-");

        if !force_refresh {
            match self.fresh_cached::<T>(language) {
                Ok(Some(items)) => {
                    debug!(entity = %entity, lang, count = items.len(), "Serving cached group");
                    return Ok(items);
                }
                Ok(None) => debug!(entity = %entity, lang, "Cached group is stale"),
                Err(e) => warn!(entity = %entity, lang, error = %e, "Cache unavailable, fetching"),
            }
        }

        match self.fetch::<T>(language) {
            Ok(items) => {
                match self.persist(language, &items) {
                    Ok(stored) => info!(entity = %entity, lang, stored, "Cache refreshed"),
                    Err(e) => warn!(entity = %entity, lang, error = %e, "Failed to write cache"),
                }
                Ok(items)
            }
            Err(fetch_error) => match self.cached::<T>(language) {
                Ok(items) if !items.is_empty() => {
                    warn!(
                        entity = %entity,
                        lang,
                        error = %fetch_error,
                        "Fetch failed, serving stale cache"
                    );
                    Ok(items)
                }
                Ok(_) => Err(fetch_error),
                Err(cache_error) => {
                    warn!(entity = %entity, lang, error = %cache_error, "No cached fallback");
                    Err(fetch_error)
                }
            },
        }
    }

    pub fn champions(&self, language: Option<Language>, force: bool) -> Result<Vec<Champion>, AppError> {
        self.get_or_refresh(language, force)
    }

    pub fn seasons(&self, force: bool) -> Result<Vec<SeasonMeta>, AppError> {
        self.get_or_refresh(None, force)
    }

    pub fn versions(&self, force: bool) -> Result<Vec<GameVersion>, AppError> {
        self.get_or_refresh(None, force)
    }

    pub fn keywords(&self, language: Option<Language>, force: bool) -> Result<Vec<Keyword>, AppError> {
        self.get_or_refresh(language, force)
    }

    /// Point lookup with the same freshness rules as the full group.
    pub fn champion_by_id(
        &self,
        id: u32,
        language: Option<Language>,
    ) -> Result<Option<Champion>, AppError> {
        let resolved = self.resolve(EntityType::Champion, language);
        let ttl = self.ttl.get(EntityType::Champion);

        let cached = self.store().and_then(|store| {
            if store.is_stale(EntityType::Champion, resolved, ttl)? {
                return Ok(None);
            }
            store
                .get(EntityType::Champion, &id.to_string(), resolved)
                .map(Some)
        });
        match cached {
            Ok(Some(entry)) => return Ok(entry.and_then(|e| Champion::from_item(e.payload))),
            Ok(None) => {}
            Err(e) => warn!(id, error = %e, "Cached champion unavailable, fetching champions"),
        }

        Ok(self
            .champions(language, false)?
            .into_iter()
            .find(|c| c.id == id))
    }

    /// Case-insensitive match on champion name or key.
    pub fn champions_by_name(
        &self,
        fragment: &str,
        language: Option<Language>,
    ) -> Result<Vec<Champion>, AppError> {
        let needle = fragment.trim().to_lowercase();
        Ok(self
            .champions(language, false)?
            .into_iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle) || c.key.to_lowercase().contains(&needle)
            })
            .collect())
    }

    /// Unconditional fetch-and-store for one group.
    pub fn refresh_group(
        &self,
        entity: EntityType,
        language: Option<Language>,
    ) -> Result<usize, AppError> {
        let language = self.resolve(entity, language);
        match entity {
            EntityType::Champion => self.refresh::<Champion>(language),
            EntityType::Season => self.refresh::<SeasonMeta>(language),
            EntityType::Version => self.refresh::<GameVersion>(language),
            EntityType::Keyword => self.refresh::<Keyword>(language),
        }
    }

    fn refresh<T: RemoteEntity>(&self, language: Option<Language>) -> Result<usize, AppError> {
        let items = self.fetch::<T>(language)?;
        Ok(self.persist(language, &items)?)
    }

    /// The groups a full refresh should cover: every cached language of each
    /// localized entity type (or `defaults` when none is cached yet), plus the
    /// language-agnostic groups.
    pub fn known_groups(
        &self,
        entities: &[EntityType],
        defaults: &[Language],
    ) -> Vec<(EntityType, Option<Language>)> {
        let mut groups = Vec::new();
        for &entity in entities {
            if !entity.is_language_scoped() {
                groups.push((entity, None));
                continue;
            }

            let cached = self.store().and_then(|s| s.cached_languages(entity));
            let mut languages = cached.unwrap_or_else(|e| {
                warn!(entity = %entity, error = %e, "Could not list cached languages");
                Vec::new()
            });
            if languages.is_empty() {
                languages = if defaults.is_empty() {
                    vec![self.default_language]
                } else {
                    defaults.to_vec()
                };
            }
            groups.extend(languages.into_iter().map(|lang| (entity, Some(lang))));
        }
        groups
    }

    pub fn force_refresh_all(&self, defaults: &[Language]) -> RefreshReport {
        let groups = self.known_groups(&EntityType::ALL, defaults);
        self.refresh_groups(&groups, |_| {})
    }

    /// Refreshes `groups` concurrently. A failing group does not affect the
    /// others; `on_done` runs once per finished group.
    pub fn refresh_groups<F>(&self, groups: &[(EntityType, Option<Language>)], on_done: F) -> RefreshReport
    where
        F: Fn(&GroupRefresh) + Sync,
    {
        let on_done = &on_done;
        let outcomes = thread::scope(|s| {
            let handles: Vec<_> = groups
                .iter()
                .map(|&(entity, language)| {
                    let handle = s.spawn(move || {
                        let outcome = GroupRefresh {
                            entity_type: entity,
                            language: self.resolve(entity, language),
                            result: self.refresh_group(entity, language).map_err(|e| e.to_string()),
                        };
                        on_done(&outcome);
                        outcome
                    });
                    (entity, language, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(entity, language, handle)| {
                    handle.join().unwrap_or_else(|_| GroupRefresh {
                        entity_type: entity,
                        language,
                        result: Err("refresh worker panicked".to_string()),
                    })
                })
                .collect::<Vec<_>>()
        });

        for failed in outcomes.iter().filter(|g| g.result.is_err()) {
            warn!(
                entity = %failed.entity_type,
                lang = failed.language.map(Language::code).unwrap_or("-"),
                error = failed.result.as_ref().err().map(String::as_str).unwrap_or(""),
                "Group refresh failed"
            );
        }

        RefreshReport { groups: outcomes }
    }

    /// Drops cached rows. With no entity type, a language clears that
    /// language from the localized tables only; no language clears everything.
    pub fn clear_cache(
        &self,
        entity: Option<EntityType>,
        language: Option<Language>,
    ) -> Result<usize, CacheError> {
        let store = self.store()?;
        match (entity, language) {
            (Some(entity), language) => store.invalidate(entity, language),
            (None, None) => store.clear_all(),
            (None, Some(language)) => {
                let mut removed = 0;
                for entity in EntityType::ALL.into_iter().filter(|e| e.is_language_scoped()) {
                    removed += store.invalidate(entity, Some(language))?;
                }
                Ok(removed)
            }
        }
    }
}
