use super::payload::{self, MetadataItem};
use super::schema::{self, GROUPS_TABLE};
use super::ttl::CacheTtlPolicy;
use crate::error::CacheError;
use crate::params::{EntityType, Language};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_IDLE_READERS: usize = 4;

/// One cached metadata item as stored on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub entity_type: EntityType,
    pub language: Option<Language>,
    pub key: String,
    pub payload: MetadataItem,
    pub fetched_at: DateTime<Utc>,
}

/// Aggregates for one (entity type, language) group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    pub entity_type: EntityType,
    pub language: Option<Language>,
    /// Raw stored code, kept for codes this build does not recognize.
    pub lang_code: String,
    pub entry_count: usize,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
    pub checked_at: Option<DateTime<Utc>>,
    pub is_stale: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    pub groups: Vec<GroupStats>,
}

impl CacheStats {
    pub fn total_entries(&self) -> usize {
        self.groups.iter().map(|g| g.entry_count).sum()
    }

    pub fn entries_for(&self, entity: EntityType) -> usize {
        self.groups_for(entity).map(|g| g.entry_count).sum()
    }

    pub fn groups_for(&self, entity: EntityType) -> impl Iterator<Item = &GroupStats> {
        self.groups.iter().filter(move |g| g.entity_type == entity)
    }

    pub fn languages(&self, entity: EntityType) -> Vec<Language> {
        self.groups_for(entity).filter_map(|g| g.language).collect()
    }
}

/// SQLite-backed store for champion/season/version/keyword metadata.
///
/// Writes go through a single connection behind a mutex, so at most one write
/// transaction is open at a time. Reads check out a pooled connection; with
/// the WAL journal each read sees a committed snapshot and never a batch that
/// is still being written.
pub struct MetadataStore {
    path: PathBuf,
    writer: Mutex<Connection>,
    readers: Mutex<Vec<Connection>>,
}

impl MetadataStore {
    /// Opens (creating if needed) the cache file and ensures its schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                info!(dir = %parent.display(), "Creating cache directory");
            }
            std::fs::create_dir_all(parent).map_err(|source| CacheError::Directory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        let store = MetadataStore {
            path,
            writer: Mutex::new(conn),
            readers: Mutex::new(Vec::new()),
        };
        store.ensure_schema()?;

        debug!(path = %store.path.display(), "Metadata store opened");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ensure_schema(&self) -> Result<(), CacheError> {
        let mut conn = self.writer.lock();
        schema::ensure_schema(&mut conn)
    }

    fn open_reader(&self) -> Result<Connection, CacheError> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "query_only", true)?;
        Ok(conn)
    }

    fn with_reader<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, CacheError>,
    ) -> Result<T, CacheError> {
        let pooled = self.readers.lock().pop();
        let conn = match pooled {
            Some(conn) => conn,
            None => self.open_reader()?,
        };

        let result = f(&conn);

        let mut idle = self.readers.lock();
        if idle.len() < MAX_IDLE_READERS {
            idle.push(conn);
        }
        result
    }

    pub fn get(
        &self,
        entity: EntityType,
        key: &str,
        language: Option<Language>,
    ) -> Result<Option<CacheEntry>, CacheError> {
        let lang = lang_key(entity, language);
        let sql = format!(
            "SELECT data, fetched_at FROM {} WHERE key = ?1 AND lang_code = ?2",
            entity.table()
        );

        let row: Option<(String, i64)> = self.with_reader(|conn| {
            Ok(conn
                .query_row(&sql, params![key, lang], |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })
                .optional()?)
        })?;

        match row {
            Some((data, fetched_at)) => {
                debug!(entity = %entity, key, lang, "Cache hit");
                to_entry(entity, lang, key.to_string(), &data, fetched_at).map(Some)
            }
            None => {
                debug!(entity = %entity, key, lang, "Cache miss");
                Ok(None)
            }
        }
    }

    /// All rows of one group, in the order they were written.
    pub fn get_all(
        &self,
        entity: EntityType,
        language: Option<Language>,
    ) -> Result<Vec<CacheEntry>, CacheError> {
        let lang = lang_key(entity, language);
        let sql = format!(
            "SELECT key, data, fetched_at FROM {} WHERE lang_code = ?1 ORDER BY rowid",
            entity.table()
        );

        let rows: Vec<(String, String, i64)> = self.with_reader(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![lang], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })?;

        rows.into_iter()
            .map(|(key, data, fetched_at)| to_entry(entity, lang, key, &data, fetched_at))
            .collect()
    }

    /// Upserts a single row. Group checkpoints are left alone.
    pub fn put(
        &self,
        entity: EntityType,
        key: &str,
        language: Option<Language>,
        payload: &MetadataItem,
        fetched_at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        check_kind(entity, payload)?;
        let data = payload::encode(payload)?;
        let lang = lang_key(entity, language);

        let conn = self.writer.lock();
        conn.execute(&upsert_sql(entity), params![key, lang, data, fetched_at.timestamp_millis()])?;

        debug!(entity = %entity, key, lang, "Entry cached");
        Ok(())
    }

    /// Replaces a whole group with `items`, stamped with the current time.
    pub fn put_many(
        &self,
        entity: EntityType,
        language: Option<Language>,
        items: &[(String, MetadataItem)],
    ) -> Result<usize, CacheError> {
        self.put_many_at(entity, language, items, Utc::now())
    }

    /// Full replace of one group inside a single transaction.
    ///
    /// The previous rows are deleted, every new row gets `fetched_at`, and the
    /// group checkpoint is updated even when `items` is empty. Either all of it
    /// commits or none of it does.
    pub fn put_many_at(
        &self,
        entity: EntityType,
        language: Option<Language>,
        items: &[(String, MetadataItem)],
        fetched_at: DateTime<Utc>,
    ) -> Result<usize, CacheError> {
        let lang = lang_key(entity, language);
        let ts = fetched_at.timestamp_millis();

        let mut encoded = Vec::with_capacity(items.len());
        for (key, item) in items {
            check_kind(entity, item)?;
            encoded.push((key.as_str(), payload::encode(item)?));
        }

        let mut conn = self.writer.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let removed = tx.execute(
            &format!("DELETE FROM {} WHERE lang_code = ?1", entity.table()),
            params![lang],
        )?;

        {
            let mut stmt = tx.prepare(&upsert_sql(entity))?;
            for (key, data) in &encoded {
                stmt.execute(params![key, lang, data, ts])?;
            }
        }

        let stored: i64 = tx.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE lang_code = ?1", entity.table()),
            params![lang],
            |row| row.get(0),
        )?;

        tx.execute(
            &format!(
                "INSERT INTO {} (entity_type, lang_code, checked_at, item_count)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(entity_type, lang_code) DO UPDATE SET
                    checked_at = excluded.checked_at,
                    item_count = excluded.item_count",
                GROUPS_TABLE
            ),
            params![entity.as_str(), lang, ts, stored],
        )?;

        tx.commit()?;

        debug!(
            entity = %entity,
            lang,
            removed,
            stored,
            "Group replaced in cache"
        );
        Ok(stored as usize)
    }

    /// When the last full fetch of this group happened, even if it returned
    /// nothing. `None` means the group was never fetched.
    pub fn checked_at(
        &self,
        entity: EntityType,
        language: Option<Language>,
    ) -> Result<Option<DateTime<Utc>>, CacheError> {
        let lang = lang_key(entity, language);
        let ts: Option<i64> = self.with_reader(|conn| {
            Ok(conn
                .query_row(
                    &format!(
                        "SELECT checked_at FROM {} WHERE entity_type = ?1 AND lang_code = ?2",
                        GROUPS_TABLE
                    ),
                    params![entity.as_str(), lang],
                    |row| row.get(0),
                )
                .optional()?)
        })?;
        Ok(ts.map(from_millis))
    }

    pub fn is_stale(
        &self,
        entity: EntityType,
        language: Option<Language>,
        ttl: Duration,
    ) -> Result<bool, CacheError> {
        self.is_stale_at(entity, language, ttl, Utc::now())
    }

    /// A group is stale when it was never fetched, or when its oldest row (or
    /// its checkpoint, for a fetch that returned nothing) is older than `ttl`.
    pub fn is_stale_at(
        &self,
        entity: EntityType,
        language: Option<Language>,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<bool, CacheError> {
        let lang = lang_key(entity, language);

        let reference: Option<i64> = self.with_reader(|conn| {
            let (count, oldest): (i64, Option<i64>) = conn.query_row(
                &format!(
                    "SELECT COUNT(*), MIN(fetched_at) FROM {} WHERE lang_code = ?1",
                    entity.table()
                ),
                params![lang],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            if count > 0 {
                return Ok(oldest);
            }

            Ok(conn
                .query_row(
                    &format!(
                        "SELECT checked_at FROM {} WHERE entity_type = ?1 AND lang_code = ?2",
                        GROUPS_TABLE
                    ),
                    params![entity.as_str(), lang],
                    |row| row.get(0),
                )
                .optional()?)
        })?;

        let stale = is_expired(reference, ttl, now);
        debug!(entity = %entity, lang, stale, "Staleness checked");
        Ok(stale)
    }

    /// Deletes one language group, or every group of `entity` when `language`
    /// is `None`. Returns the number of rows removed.
    ///
    /// Seasons and versions have a single language-agnostic group; naming a
    /// language for them removes nothing.
    pub fn invalidate(
        &self,
        entity: EntityType,
        language: Option<Language>,
    ) -> Result<usize, CacheError> {
        if let (Some(lang), false) = (language, entity.is_language_scoped()) {
            warn!(
                entity = %entity,
                lang = lang.code(),
                "Entity is not cached per language, nothing invalidated"
            );
            return Ok(0);
        }

        let mut conn = self.writer.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let removed = match language {
            None => {
                tx.execute(
                    &format!("DELETE FROM {} WHERE entity_type = ?1", GROUPS_TABLE),
                    params![entity.as_str()],
                )?;
                tx.execute(&format!("DELETE FROM {}", entity.table()), [])?
            }
            Some(_) => {
                let lang = lang_key(entity, language);
                tx.execute(
                    &format!(
                        "DELETE FROM {} WHERE entity_type = ?1 AND lang_code = ?2",
                        GROUPS_TABLE
                    ),
                    params![entity.as_str(), lang],
                )?;
                tx.execute(
                    &format!("DELETE FROM {} WHERE lang_code = ?1", entity.table()),
                    params![lang],
                )?
            }
        };

        tx.commit()?;

        info!(
            entity = %entity,
            lang = language.map(Language::code).unwrap_or("*"),
            removed,
            "Cache invalidated"
        );
        Ok(removed)
    }

    /// Deletes every row and checkpoint. Returns the number of rows removed.
    pub fn clear_all(&self) -> Result<usize, CacheError> {
        let mut conn = self.writer.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut removed = 0;
        for entity in EntityType::ALL {
            removed += tx.execute(&format!("DELETE FROM {}", entity.table()), [])?;
        }
        tx.execute(&format!("DELETE FROM {}", GROUPS_TABLE), [])?;
        tx.commit()?;

        info!(removed, "Cache cleared");
        Ok(removed)
    }

    /// Languages with rows or a checkpoint for `entity`.
    pub fn cached_languages(&self, entity: EntityType) -> Result<Vec<Language>, CacheError> {
        let sql = format!(
            "SELECT lang_code FROM {table}
             UNION
             SELECT lang_code FROM {groups} WHERE entity_type = ?1
             ORDER BY lang_code",
            table = entity.table(),
            groups = GROUPS_TABLE
        );

        let codes: Vec<String> = self.with_reader(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![entity.as_str()], |row| row.get(0))?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })?;

        Ok(codes.iter().filter_map(|code| parse_lang(code)).collect())
    }

    pub fn stats(&self, policy: &CacheTtlPolicy) -> Result<CacheStats, CacheError> {
        self.stats_at(policy, Utc::now())
    }

    pub fn stats_at(
        &self,
        policy: &CacheTtlPolicy,
        now: DateTime<Utc>,
    ) -> Result<CacheStats, CacheError> {
        // (entity, lang) -> (count, oldest, newest, checked_at)
        type Raw = (i64, Option<i64>, Option<i64>, Option<i64>);
        let mut groups: BTreeMap<(EntityType, String), Raw> = BTreeMap::new();

        self.with_reader(|conn| {
            for entity in EntityType::ALL {
                let mut stmt = conn.prepare(&format!(
                    "SELECT lang_code, COUNT(*), MIN(fetched_at), MAX(fetched_at)
                     FROM {} GROUP BY lang_code",
                    entity.table()
                ))?;
                let rows = stmt.query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, Option<i64>>(2)?,
                        row.get::<_, Option<i64>>(3)?,
                    ))
                })?;
                for row in rows {
                    let (lang, count, oldest, newest) = row?;
                    groups.insert((entity, lang), (count, oldest, newest, None));
                }
            }

            let mut stmt = conn.prepare(&format!(
                "SELECT entity_type, lang_code, checked_at FROM {}",
                GROUPS_TABLE
            ))?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?;
            for row in rows {
                let (entity, lang, checked_at) = row?;
                let Ok(entity) = entity.parse::<EntityType>() else {
                    warn!(entity, "Unknown entity type in cache checkpoints");
                    continue;
                };
                groups.entry((entity, lang)).or_insert((0, None, None, None)).3 = Some(checked_at);
            }
            Ok(())
        })?;

        let groups = groups
            .into_iter()
            .map(|((entity, lang_code), (count, oldest, newest, checked_at))| {
                let reference = if count > 0 { oldest } else { checked_at };
                GroupStats {
                    entity_type: entity,
                    language: parse_lang(&lang_code),
                    lang_code,
                    entry_count: count as usize,
                    oldest: oldest.map(from_millis),
                    newest: newest.map(from_millis),
                    checked_at: checked_at.map(from_millis),
                    is_stale: is_expired(reference, policy.get(entity), now),
                }
            })
            .collect();

        Ok(CacheStats { groups })
    }

    /// Reclaims space after large clears.
    pub fn vacuum(&self) -> Result<(), CacheError> {
        let conn = self.writer.lock();
        conn.execute_batch("VACUUM")?;
        debug!("Cache database vacuumed");
        Ok(())
    }
}

impl Drop for MetadataStore {
    fn drop(&mut self) {
        // fold the WAL back into the main file so it does not grow across runs
        self.readers.get_mut().clear();
        if let Err(e) = self
            .writer
            .get_mut()
            .pragma_update(None, "wal_checkpoint", "TRUNCATE")
        {
            warn!("Failed to checkpoint WAL on MetadataStore drop: {}", e);
        }
    }
}

fn lang_key(entity: EntityType, language: Option<Language>) -> &'static str {
    entity.scope(language).map(Language::code).unwrap_or("")
}

fn parse_lang(code: &str) -> Option<Language> {
    if code.is_empty() {
        return None;
    }
    code.parse().ok()
}

fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or_default()
}

fn is_expired(reference: Option<i64>, ttl: Duration, now: DateTime<Utc>) -> bool {
    match reference {
        None => true,
        Some(_) if ttl.is_zero() => false,
        Some(ts) => {
            let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
            now.timestamp_millis() > ts.saturating_add(ttl_ms)
        }
    }
}

fn upsert_sql(entity: EntityType) -> String {
    format!(
        "INSERT INTO {} (key, lang_code, data, fetched_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(key, lang_code) DO UPDATE SET
            data = excluded.data,
            fetched_at = excluded.fetched_at",
        entity.table()
    )
}

fn check_kind(entity: EntityType, item: &MetadataItem) -> Result<(), CacheError> {
    let found = item.entity_type();
    if found != entity {
        return Err(CacheError::EntityMismatch {
            expected: entity,
            found,
        });
    }
    Ok(())
}

fn to_entry(
    entity: EntityType,
    lang: &str,
    key: String,
    data: &str,
    fetched_at: i64,
) -> Result<CacheEntry, CacheError> {
    let payload = payload::decode(entity, &key, data)?;
    Ok(CacheEntry {
        entity_type: entity,
        language: parse_lang(lang),
        key,
        payload,
        fetched_at: from_millis(fetched_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{Champion, GameVersion, Keyword};
    use chrono::Duration as ChronoDuration;
    use tempfile::tempdir;

    const WEEK: Duration = Duration::from_secs(60 * 60 * 24 * 7);

    fn champion(id: u32, name: &str) -> (String, MetadataItem) {
        let item = MetadataItem::Champion(Champion {
            id,
            key: name.to_string(),
            name: name.to_string(),
            image_url: String::new(),
            passive: None,
            spells: Vec::new(),
        });
        (item.cache_key(), item)
    }

    fn keyword(name: &str) -> (String, MetadataItem) {
        let item = MetadataItem::Keyword(Keyword {
            keyword: name.to_string(),
            label: None,
            description: None,
            arrows: Vec::new(),
            is_op: None,
            context: None,
        });
        (item.cache_key(), item)
    }

    fn version(v: &str) -> (String, MetadataItem) {
        let item = MetadataItem::Version(GameVersion::from(v.to_string()));
        (item.cache_key(), item)
    }

    fn open_store() -> (tempfile::TempDir, MetadataStore) {
        let dir = tempdir().unwrap();
        let store = MetadataStore::open(dir.path().join("cache").join("opgg.db")).unwrap();
        (dir, store)
    }

    fn keys(entries: &[CacheEntry]) -> Vec<String> {
        entries.iter().map(|e| e.key.clone()).collect()
    }

    #[test]
    fn test_open_creates_missing_directory() {
        let (dir, store) = open_store();
        assert!(dir.path().join("cache").is_dir());
        assert!(store.path().exists());
        store.ensure_schema().unwrap();
    }

    #[test]
    fn test_get_missing_is_none() {
        let (_dir, store) = open_store();
        let entry = store
            .get(EntityType::Champion, "103", Some(Language::English))
            .unwrap();
        assert!(entry.is_none());
    }

    #[test]
    fn test_put_then_get_overwrites() {
        let (_dir, store) = open_store();
        let (key, first) = champion(103, "Ahri");
        let (_, second) = champion(103, "Ahri the Nine-Tailed");
        let t1 = Utc::now() - ChronoDuration::hours(1);
        let t2 = Utc::now();

        store
            .put(EntityType::Champion, &key, Some(Language::English), &first, t1)
            .unwrap();
        store
            .put(EntityType::Champion, &key, Some(Language::English), &second, t2)
            .unwrap();

        let all = store.get_all(EntityType::Champion, Some(Language::English)).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].payload, second);
        assert_eq!(all[0].fetched_at.timestamp_millis(), t2.timestamp_millis());
        assert_eq!(all[0].language, Some(Language::English));
    }

    #[test]
    fn test_put_rejects_wrong_payload_kind() {
        let (_dir, store) = open_store();
        let (key, item) = champion(1, "Annie");
        let err = store
            .put(EntityType::Keyword, &key, None, &item, Utc::now())
            .unwrap_err();
        assert!(matches!(err, CacheError::EntityMismatch { .. }));
    }

    #[test]
    fn test_put_many_is_full_replace() {
        let (_dir, store) = open_store();
        let lang = Some(Language::English);

        store
            .put_many(EntityType::Champion, lang, &[champion(1, "Annie"), champion(2, "Olaf")])
            .unwrap();
        store
            .put_many(EntityType::Champion, lang, &[champion(3, "Galio")])
            .unwrap();

        let all = store.get_all(EntityType::Champion, lang).unwrap();
        assert_eq!(keys(&all), vec!["3"]);
    }

    #[test]
    fn test_get_all_preserves_write_order() {
        let (_dir, store) = open_store();
        let batch = [version("14.3"), version("14.2"), version("14.1")];
        store.put_many(EntityType::Version, None, &batch).unwrap();

        let all = store.get_all(EntityType::Version, None).unwrap();
        assert_eq!(keys(&all), vec!["14.3", "14.2", "14.1"]);
    }

    #[test]
    fn test_failed_batch_leaves_group_untouched() {
        let (_dir, store) = open_store();
        let lang = Some(Language::English);
        store
            .put_many(EntityType::Champion, lang, &[champion(1, "Annie")])
            .unwrap();

        // second item has the wrong kind, so nothing from this batch may land
        let bad = [champion(2, "Olaf"), keyword("early")];
        assert!(store.put_many(EntityType::Champion, lang, &bad).is_err());

        let all = store.get_all(EntityType::Champion, lang).unwrap();
        assert_eq!(keys(&all), vec!["1"]);
    }

    #[test]
    fn test_staleness_follows_ttl() {
        let (_dir, store) = open_store();
        let lang = Some(Language::English);
        let fetched = Utc::now();
        store
            .put_many_at(EntityType::Champion, lang, &[champion(1, "Annie")], fetched)
            .unwrap();

        let ttl = Duration::from_secs(60);
        assert!(!store.is_stale_at(EntityType::Champion, lang, ttl, fetched).unwrap());
        assert!(!store
            .is_stale_at(EntityType::Champion, lang, ttl, fetched + ChronoDuration::seconds(60))
            .unwrap());
        assert!(store
            .is_stale_at(EntityType::Champion, lang, ttl, fetched + ChronoDuration::seconds(61))
            .unwrap());
    }

    #[test]
    fn test_never_fetched_group_is_stale() {
        let (_dir, store) = open_store();
        assert!(store.is_stale(EntityType::Season, None, WEEK).unwrap());
        assert!(store
            .is_stale(EntityType::Keyword, Some(Language::Korean), Duration::ZERO)
            .unwrap());
    }

    #[test]
    fn test_zero_ttl_never_expires_fetched_group() {
        let (_dir, store) = open_store();
        let fetched = Utc::now() - ChronoDuration::days(365);
        store
            .put_many_at(EntityType::Version, None, &[version("14.1")], fetched)
            .unwrap();
        assert!(!store.is_stale(EntityType::Version, None, Duration::ZERO).unwrap());
    }

    #[test]
    fn test_empty_batch_still_resets_staleness() {
        let (_dir, store) = open_store();
        let lang = Some(Language::French);

        assert!(store.is_stale(EntityType::Keyword, lang, WEEK).unwrap());
        assert!(store.checked_at(EntityType::Keyword, lang).unwrap().is_none());

        let stored = store.put_many(EntityType::Keyword, lang, &[]).unwrap();
        assert_eq!(stored, 0);

        assert!(!store.is_stale(EntityType::Keyword, lang, WEEK).unwrap());
        assert!(store.checked_at(EntityType::Keyword, lang).unwrap().is_some());
        assert!(store.get_all(EntityType::Keyword, lang).unwrap().is_empty());
    }

    #[test]
    fn test_empty_batch_supersedes_previous_rows() {
        let (_dir, store) = open_store();
        let lang = Some(Language::English);
        store
            .put_many(EntityType::Keyword, lang, &[keyword("early"), keyword("late")])
            .unwrap();
        store.put_many(EntityType::Keyword, lang, &[]).unwrap();

        assert!(store.get_all(EntityType::Keyword, lang).unwrap().is_empty());
        assert!(!store.is_stale(EntityType::Keyword, lang, WEEK).unwrap());
    }

    #[test]
    fn test_absent_language_is_its_own_group() {
        let (_dir, store) = open_store();
        store
            .put_many(EntityType::Champion, None, &[champion(1, "Annie")])
            .unwrap();
        store
            .put_many(EntityType::Champion, Some(Language::English), &[champion(2, "Olaf")])
            .unwrap();
        store
            .put_many(EntityType::Champion, None, &[champion(3, "Galio")])
            .unwrap();

        assert_eq!(keys(&store.get_all(EntityType::Champion, None).unwrap()), vec!["3"]);
        assert_eq!(
            keys(&store.get_all(EntityType::Champion, Some(Language::English)).unwrap()),
            vec!["2"]
        );
    }

    #[test]
    fn test_global_entities_ignore_language() {
        let (_dir, store) = open_store();
        store
            .put_many(EntityType::Version, Some(Language::Korean), &[version("14.1")])
            .unwrap();

        let all = store.get_all(EntityType::Version, Some(Language::Japanese)).unwrap();
        assert_eq!(keys(&all), vec!["14.1"]);
        assert_eq!(all[0].language, None);
    }

    #[test]
    fn test_invalidate_one_language_only() {
        let (_dir, store) = open_store();
        let en = Some(Language::English);
        let kr = Some(Language::Korean);
        store.put_many(EntityType::Champion, en, &[champion(1, "Annie")]).unwrap();
        store.put_many(EntityType::Champion, kr, &[champion(1, "애니")]).unwrap();
        store.put_many(EntityType::Keyword, en, &[keyword("early")]).unwrap();

        let removed = store.invalidate(EntityType::Champion, en).unwrap();
        assert_eq!(removed, 1);

        assert!(store.get_all(EntityType::Champion, en).unwrap().is_empty());
        assert!(store.is_stale(EntityType::Champion, en, WEEK).unwrap());
        assert_eq!(store.get_all(EntityType::Champion, kr).unwrap().len(), 1);
        assert_eq!(store.get_all(EntityType::Keyword, en).unwrap().len(), 1);
    }

    #[test]
    fn test_invalidate_with_language_keeps_global_group() {
        let (_dir, store) = open_store();
        store.put_many(EntityType::Version, None, &[version("14.1")]).unwrap();

        let removed = store
            .invalidate(EntityType::Version, Some(Language::Korean))
            .unwrap();

        assert_eq!(removed, 0);
        assert_eq!(store.get_all(EntityType::Version, None).unwrap().len(), 1);
        assert!(!store.is_stale(EntityType::Version, None, WEEK).unwrap());

        assert_eq!(store.invalidate(EntityType::Version, None).unwrap(), 1);
    }

    #[test]
    fn test_invalidate_all_languages() {
        let (_dir, store) = open_store();
        store
            .put_many(EntityType::Keyword, Some(Language::English), &[keyword("a")])
            .unwrap();
        store
            .put_many(EntityType::Keyword, Some(Language::German), &[])
            .unwrap();
        store.put_many(EntityType::Version, None, &[version("14.1")]).unwrap();

        store.invalidate(EntityType::Keyword, None).unwrap();

        assert!(store.cached_languages(EntityType::Keyword).unwrap().is_empty());
        assert!(store
            .is_stale(EntityType::Keyword, Some(Language::German), WEEK)
            .unwrap());
        assert_eq!(store.get_all(EntityType::Version, None).unwrap().len(), 1);
    }

    #[test]
    fn test_clear_all_and_stats() {
        let (_dir, store) = open_store();
        let policy = CacheTtlPolicy::default();
        store
            .put_many(EntityType::Champion, Some(Language::English), &[champion(1, "Annie"), champion(2, "Olaf")])
            .unwrap();
        store
            .put_many(EntityType::Champion, Some(Language::Korean), &[champion(1, "Annie")])
            .unwrap();
        store.put_many(EntityType::Version, None, &[version("14.1")]).unwrap();
        store.put_many(EntityType::Keyword, Some(Language::English), &[]).unwrap();

        let stats = store.stats(&policy).unwrap();
        assert_eq!(stats.entries_for(EntityType::Champion), 3);
        assert_eq!(
            stats.languages(EntityType::Champion),
            vec![Language::English, Language::Korean]
        );
        assert_eq!(stats.entries_for(EntityType::Version), 1);
        let keyword_groups: Vec<_> = stats.groups_for(EntityType::Keyword).collect();
        assert_eq!(keyword_groups.len(), 1);
        assert_eq!(keyword_groups[0].entry_count, 0);
        assert!(keyword_groups[0].checked_at.is_some());
        assert!(stats.groups.iter().all(|g| !g.is_stale));

        let removed = store.clear_all().unwrap();
        assert_eq!(removed, 4);

        let stats = store.stats(&policy).unwrap();
        assert!(stats.groups.is_empty());
        for entity in EntityType::ALL {
            assert_eq!(stats.entries_for(entity), 0);
        }
    }

    #[test]
    fn test_stats_flags_stale_groups() {
        let (_dir, store) = open_store();
        let policy = CacheTtlPolicy::default().with(EntityType::Version, Duration::from_secs(10));
        let old = Utc::now() - ChronoDuration::minutes(5);
        store
            .put_many_at(EntityType::Version, None, &[version("14.1")], old)
            .unwrap();
        store
            .put_many_at(EntityType::Champion, Some(Language::English), &[champion(1, "Annie")], old)
            .unwrap();

        let stats = store.stats(&policy).unwrap();
        let version_group = stats.groups_for(EntityType::Version).next().unwrap();
        let champion_group = stats.groups_for(EntityType::Champion).next().unwrap();
        assert!(version_group.is_stale);
        assert!(!champion_group.is_stale);
        assert_eq!(version_group.oldest, version_group.newest);
    }

    #[test]
    fn test_cached_languages_includes_empty_checked_groups() {
        let (_dir, store) = open_store();
        store
            .put_many(EntityType::Keyword, Some(Language::Korean), &[keyword("early")])
            .unwrap();
        store
            .put_many(EntityType::Keyword, Some(Language::English), &[])
            .unwrap();

        let langs = store.cached_languages(EntityType::Keyword).unwrap();
        assert_eq!(langs, vec![Language::English, Language::Korean]);
    }

    #[test]
    fn test_corrupt_payload_surfaces_as_error() {
        let (_dir, store) = open_store();
        {
            let conn = store.writer.lock();
            conn.execute(
                "INSERT INTO champions (key, lang_code, data, fetched_at) VALUES ('1', 'en_US', 'not json', 0)",
                [],
            )
            .unwrap();
        }

        let err = store
            .get_all(EntityType::Champion, Some(Language::English))
            .unwrap_err();
        assert!(matches!(err, CacheError::Payload { .. }));
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("opgg.db");
        {
            let store = MetadataStore::open(&path).unwrap();
            store.put_many(EntityType::Version, None, &[version("14.1")]).unwrap();
        }

        let store = MetadataStore::open(&path).unwrap();
        assert_eq!(store.get_all(EntityType::Version, None).unwrap().len(), 1);
        assert!(!store.is_stale(EntityType::Version, None, WEEK).unwrap());
    }

    #[test]
    fn test_vacuum_after_clear() {
        let (_dir, store) = open_store();
        store.put_many(EntityType::Version, None, &[version("14.1")]).unwrap();
        store.clear_all().unwrap();
        store.vacuum().unwrap();
    }
}
