#![allow(dead_code)]

use opgg_client::api::models::{Champion, Keyword, SeasonMeta};
use opgg_client::api::MetadataFetcher;
use opgg_client::cache::CacheTtlPolicy;
use opgg_client::{AppError, Config, EntityType, Language};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn champion(id: u32, name: &str) -> Champion {
    Champion {
        id,
        key: name.to_string(),
        name: name.to_string(),
        image_url: String::new(),
        passive: None,
        spells: Vec::new(),
    }
}

pub fn keyword(name: &str) -> Keyword {
    Keyword {
        keyword: name.to_string(),
        label: Some(name.to_uppercase()),
        description: None,
        arrows: Vec::new(),
        is_op: None,
        context: None,
    }
}

pub fn config(dir: &Path, ttl: CacheTtlPolicy) -> Config {
    Config {
        cache_path: dir.join("cache").join("opgg.db"),
        ttl,
        ..Config::default()
    }
}

/// Handle shared between a test and the fetcher it hands to `Opgg`.
#[derive(Clone, Default)]
pub struct Script {
    failing: Arc<Mutex<HashSet<EntityType>>>,
    calls: Arc<AtomicUsize>,
}

impl Script {
    pub fn fail(&self, entity: EntityType) {
        self.failing.lock().insert(entity);
    }

    pub fn recover(&self, entity: EntityType) {
        self.failing.lock().remove(&entity);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self, entity: EntityType) -> Result<(), AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().contains(&entity) {
            return Err(AppError::HttpError(format!("{} unavailable", entity)));
        }
        Ok(())
    }
}

pub struct ScriptedFetcher {
    pub script: Script,
    pub champions: Vec<Champion>,
    pub keywords: Vec<Keyword>,
}

impl ScriptedFetcher {
    pub fn new(script: Script) -> Self {
        ScriptedFetcher {
            script,
            champions: vec![champion(103, "Ahri"), champion(84, "Akali")],
            keywords: vec![keyword("burst"), keyword("poke")],
        }
    }
}

impl MetadataFetcher for ScriptedFetcher {
    fn fetch_champions(&self, _language: Language) -> Result<Vec<Champion>, AppError> {
        self.script.check(EntityType::Champion)?;
        Ok(self.champions.clone())
    }

    fn fetch_seasons(&self) -> Result<Vec<SeasonMeta>, AppError> {
        self.script.check(EntityType::Season)?;
        Ok(vec![SeasonMeta {
            id: 27,
            season: 14,
            display_value: "S2024".to_string(),
            split: Some(1),
            is_preseason: false,
        }])
    }

    fn fetch_versions(&self) -> Result<Vec<String>, AppError> {
        self.script.check(EntityType::Version)?;
        Ok(vec!["14.3.1".to_string(), "14.2.1".to_string()])
    }

    fn fetch_keywords(&self, _language: Language) -> Result<Vec<Keyword>, AppError> {
        self.script.check(EntityType::Keyword)?;
        Ok(self.keywords.clone())
    }
}
