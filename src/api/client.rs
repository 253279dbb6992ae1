use crate::error::AppError;
use crate::params::{GameType, Language, Region};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use super::endpoints;
use super::models::*;
use super::MetadataFetcher;

const USER_AGENT: &str = concat!("opgg_client/", env!("CARGO_PKG_VERSION"));
const MAX_RETRIES: u32 = 3;
const RATE_LIMIT_POLL: Duration = Duration::from_millis(50);
// op.gg publishes no limits; stay well under what the web UI itself issues
const REQUESTS_PER_SECOND: NonZeroU32 = match NonZeroU32::new(10) {
    Some(n) => n,
    None => panic!("request quota must be non-zero"),
};

pub struct OpggClient {
    agent: ureq::Agent,
    language: Language,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl OpggClient {
    pub fn new(language: Language, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();

        OpggClient {
            agent,
            language,
            rate_limiter: RateLimiter::direct(Quota::per_second(REQUESTS_PER_SECOND)),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    fn wait_for_quota(&self) {
        while self.rate_limiter.check().is_err() {
            thread::sleep(RATE_LIMIT_POLL);
        }
    }

    fn build_request(&self, url: &str, query: &[(&str, &str)]) -> ureq::Request {
        self.agent
            .get(url)
            .set("Accept", "application/json")
            .query_pairs(query.iter().copied())
    }

    fn execute_request(&self, url: &str, query: &[(&str, &str)]) -> Result<String, AppError> {
        let mut retry_count = 0;

        loop {
            self.wait_for_quota();
            let request = self.build_request(url, query);
            debug!(url = request.url(), "GET");

            let response = request.call();

            match response {
                Ok(resp) => {
                    return resp
                        .into_string()
                        .map_err(|e| AppError::HttpError(format!("{}: {}", url, e)));
                }
                Err(ureq::Error::Status(429, _)) => {
                    if retry_count >= MAX_RETRIES {
                        return Err(AppError::RateLimited);
                    }
                    let wait_ms = 2000 * (retry_count + 1) as u64;
                    warn!(url, wait_ms, "Rate limited, backing off");
                    thread::sleep(Duration::from_millis(wait_ms));
                    retry_count += 1;
                }
                Err(ureq::Error::Status(404, _)) => {
                    return Err(AppError::NotFound(url.to_string()));
                }
                Err(ureq::Error::Status(code, _)) => {
                    return Err(AppError::HttpError(format!("{} returned HTTP {}", url, code)));
                }
                Err(e) => {
                    return Err(AppError::HttpError(e.to_string()));
                }
            }
        }
    }

    fn get_data<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let body = self.execute_request(url, query)?;
        parse_data(url, &body)
    }

    /// Looks up summoners by Riot ID (`Name#TAG`). Not cached.
    pub fn search(
        &self,
        riot_id: &str,
        region: Region,
    ) -> Result<Vec<SummonerSearchResult>, AppError> {
        self.get_data(
            &endpoints::summoner_search(region.as_str()),
            &[("riot_id", riot_id), ("hl", self.language.code())],
        )
    }

    /// Profile with ranked queues, past seasons and most played champions.
    /// Not cached.
    pub fn summoner(&self, summoner_id: &str, region: Region) -> Result<SummonerProfile, AppError> {
        let summary: SummaryEnvelope = self.get_data(
            &endpoints::summoner_summary(region.as_str(), summoner_id),
            &[("hl", self.language.code())],
        )?;
        Ok(summary.summoner)
    }

    /// Most recent games for a summoner. Not cached.
    pub fn recent_games(
        &self,
        summoner_id: &str,
        region: Region,
        limit: usize,
        game_type: GameType,
    ) -> Result<Vec<GameSummary>, AppError> {
        let limit = limit.to_string();
        self.get_data(
            &endpoints::recent_games(region.as_str(), summoner_id),
            &[
                ("limit", limit.as_str()),
                ("hl", self.language.code()),
                ("game_type", game_type.as_str()),
            ],
        )
    }
}

impl MetadataFetcher for OpggClient {
    fn fetch_champions(&self, language: Language) -> Result<Vec<Champion>, AppError> {
        self.get_data(&endpoints::champions(), &[("hl", language.code())])
    }

    fn fetch_seasons(&self) -> Result<Vec<SeasonMeta>, AppError> {
        self.get_data(&endpoints::seasons(), &[("hl", self.language.code())])
    }

    fn fetch_versions(&self) -> Result<Vec<String>, AppError> {
        self.get_data(&endpoints::versions(), &[("hl", self.language.code())])
    }

    fn fetch_keywords(&self, language: Language) -> Result<Vec<Keyword>, AppError> {
        let raw: Vec<RawKeyword> =
            self.get_data(&endpoints::keywords(), &[("hl", language.code())])?;
        let total = raw.len();
        let keywords: Vec<Keyword> = raw.into_iter().filter_map(RawKeyword::into_keyword).collect();
        if keywords.len() < total {
            debug!(dropped = total - keywords.len(), "Skipped keyword rows without a key");
        }
        Ok(keywords)
    }
}

fn parse_data<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, AppError> {
    serde_json::from_str::<DataEnvelope<T>>(body)
        .map(|envelope| envelope.data)
        .map_err(|e| AppError::JsonError(format!("{}: {}", url, e)))
}
