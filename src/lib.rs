//! Client for op.gg's League of Legends endpoints with a local SQLite cache
//! for slow-changing metadata (champions, seasons, versions, keywords).

pub mod accessor;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod opgg;
pub mod params;

pub use accessor::{CacheAccessor, GroupRefresh, RefreshReport};
pub use config::Config;
pub use error::{AppError, CacheError};
pub use opgg::{Opgg, RefreshRequest};
pub use params::{EntityType, GameType, Language, Region};
