pub mod client;
pub mod endpoints;
pub mod models;

use crate::error::AppError;
use crate::params::Language;
use models::{Champion, Keyword, SeasonMeta};

/// Remote source of the four cached metadata collections.
///
/// `OpggClient` is the production implementation; tests plug in scripted
/// fetchers. Implementations must be shareable across the scoped threads used
/// by a full cache refresh.
pub trait MetadataFetcher: Send + Sync {
    fn fetch_champions(&self, language: Language) -> Result<Vec<Champion>, AppError>;

    fn fetch_seasons(&self) -> Result<Vec<SeasonMeta>, AppError>;

    fn fetch_versions(&self) -> Result<Vec<String>, AppError>;

    fn fetch_keywords(&self, language: Language) -> Result<Vec<Keyword>, AppError>;
}
