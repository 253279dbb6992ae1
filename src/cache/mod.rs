//! Local metadata cache.
//!
//! Champions, seasons, versions and keywords change rarely, so they are kept
//! in a SQLite file and only refetched once their TTL runs out. Staleness is
//! evaluated lazily on read; there is no background sweep.

pub mod payload;
pub mod schema;
pub mod store;
pub mod ttl;

pub use payload::{CachedEntity, MetadataItem, PAYLOAD_SCHEMA_VERSION};
pub use store::{CacheEntry, CacheStats, GroupStats, MetadataStore};
pub use ttl::{CacheTtlPolicy, DEFAULT_TTL_SECS};
