//! Persisted payload format.
//!
//! Each row's `data` column holds a versioned envelope around a tagged
//! [`MetadataItem`]:
//!
//! ```json
//! {"schema_version": 1, "item": {"kind": "champion", "data": {"id": 103, ...}}}
//! ```
//!
//! Decoding fails closed: an unexpected schema version or a missing required
//! field is an error, never a half-filled record. Unknown fields are ignored so
//! additive upstream changes keep working.

use crate::api::models::{Champion, GameVersion, Keyword, SeasonMeta};
use crate::error::CacheError;
use crate::params::EntityType;
use serde::{Deserialize, Serialize};

/// Bump when a cached model changes shape incompatibly.
pub const PAYLOAD_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum MetadataItem {
    Champion(Champion),
    Season(SeasonMeta),
    Version(GameVersion),
    Keyword(Keyword),
}

impl MetadataItem {
    pub fn entity_type(&self) -> EntityType {
        match self {
            MetadataItem::Champion(_) => EntityType::Champion,
            MetadataItem::Season(_) => EntityType::Season,
            MetadataItem::Version(_) => EntityType::Version,
            MetadataItem::Keyword(_) => EntityType::Keyword,
        }
    }

    /// Natural identifier used as the row key.
    pub fn cache_key(&self) -> String {
        match self {
            MetadataItem::Champion(c) => c.id.to_string(),
            MetadataItem::Season(s) => s.id.to_string(),
            MetadataItem::Version(v) => v.version.clone(),
            MetadataItem::Keyword(k) => k.keyword.clone(),
        }
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    schema_version: u32,
    item: &'a MetadataItem,
}

#[derive(Deserialize)]
struct VersionHeader {
    schema_version: u32,
}

#[derive(Deserialize)]
struct Envelope {
    item: MetadataItem,
}

pub fn encode(item: &MetadataItem) -> Result<String, CacheError> {
    serde_json::to_string(&EnvelopeRef {
        schema_version: PAYLOAD_SCHEMA_VERSION,
        item,
    })
    .map_err(|source| CacheError::Payload {
        entity: item.entity_type(),
        key: item.cache_key(),
        source,
    })
}

pub fn decode(entity: EntityType, key: &str, raw: &str) -> Result<MetadataItem, CacheError> {
    let payload_error = |source| CacheError::Payload {
        entity,
        key: key.to_string(),
        source,
    };

    let header: VersionHeader = serde_json::from_str(raw).map_err(payload_error)?;
    if header.schema_version != PAYLOAD_SCHEMA_VERSION {
        return Err(CacheError::SchemaVersion {
            found: header.schema_version,
            expected: PAYLOAD_SCHEMA_VERSION,
        });
    }

    let envelope: Envelope = serde_json::from_str(raw).map_err(payload_error)?;
    let found = envelope.item.entity_type();
    if found != entity {
        return Err(CacheError::EntityMismatch {
            expected: entity,
            found,
        });
    }

    Ok(envelope.item)
}

/// A remote model that can live in the metadata cache.
pub trait CachedEntity: Sized + Clone {
    const ENTITY: EntityType;

    fn into_item(self) -> MetadataItem;

    fn from_item(item: MetadataItem) -> Option<Self>;
}

impl CachedEntity for Champion {
    const ENTITY: EntityType = EntityType::Champion;

    fn into_item(self) -> MetadataItem {
        MetadataItem::Champion(self)
    }

    fn from_item(item: MetadataItem) -> Option<Self> {
        match item {
            MetadataItem::Champion(c) => Some(c),
            _ => None,
        }
    }
}

impl CachedEntity for SeasonMeta {
    const ENTITY: EntityType = EntityType::Season;

    fn into_item(self) -> MetadataItem {
        MetadataItem::Season(self)
    }

    fn from_item(item: MetadataItem) -> Option<Self> {
        match item {
            MetadataItem::Season(s) => Some(s),
            _ => None,
        }
    }
}

impl CachedEntity for GameVersion {
    const ENTITY: EntityType = EntityType::Version;

    fn into_item(self) -> MetadataItem {
        MetadataItem::Version(self)
    }

    fn from_item(item: MetadataItem) -> Option<Self> {
        match item {
            MetadataItem::Version(v) => Some(v),
            _ => None,
        }
    }
}

impl CachedEntity for Keyword {
    const ENTITY: EntityType = EntityType::Keyword;

    fn into_item(self) -> MetadataItem {
        MetadataItem::Keyword(self)
    }

    fn from_item(item: MetadataItem) -> Option<Self> {
        match item {
            MetadataItem::Keyword(k) => Some(k),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ahri() -> MetadataItem {
        MetadataItem::Champion(Champion {
            id: 103,
            key: "Ahri".into(),
            name: "Ahri".into(),
            image_url: String::new(),
            passive: None,
            spells: Vec::new(),
        })
    }

    #[test]
    fn test_encoded_payload_carries_schema_version_and_kind() {
        let raw = encode(&ahri()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["schema_version"], PAYLOAD_SCHEMA_VERSION);
        assert_eq!(value["item"]["kind"], "champion");
        assert_eq!(value["item"]["data"]["name"], "Ahri");
    }

    #[test]
    fn test_decode_rejects_other_schema_versions() {
        let raw = r#"{"schema_version": 99, "item": {"kind": "version", "data": {"version": "14.1"}}}"#;
        let err = decode(EntityType::Version, "14.1", raw).unwrap_err();
        assert!(matches!(err, CacheError::SchemaVersion { found: 99, .. }));
    }

    #[test]
    fn test_decode_rejects_missing_required_fields() {
        let raw = r#"{"schema_version": 1, "item": {"kind": "champion", "data": {"id": 1}}}"#;
        let err = decode(EntityType::Champion, "1", raw).unwrap_err();
        assert!(matches!(err, CacheError::Payload { .. }));
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let raw = r#"{"schema_version": 1, "extra": true,
            "item": {"kind": "keyword", "data": {"keyword": "early", "is_op": true, "new": [1]}}}"#;
        let item = decode(EntityType::Keyword, "early", raw).unwrap();
        assert_eq!(item.cache_key(), "early");
    }

    #[test]
    fn test_decode_rejects_wrong_entity() {
        let raw = encode(&ahri()).unwrap();
        let err = decode(EntityType::Keyword, "103", &raw).unwrap_err();
        assert!(matches!(
            err,
            CacheError::EntityMismatch {
                expected: EntityType::Keyword,
                found: EntityType::Champion
            }
        ));
    }
}
