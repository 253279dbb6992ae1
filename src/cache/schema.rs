//! On-disk layout of the metadata cache.
//!
//! One table per entity type, each keyed by `(key, lang_code)`. The absent
//! language is stored as `''` because SQLite treats NULLs as distinct inside a
//! primary key, which would let duplicate language-agnostic rows accumulate.
//!
//! `cache_groups` records when each (entity, language) group was last fully
//! fetched, including fetches that returned nothing. `cache_metadata` holds
//! the layout version; a mismatch drops and recreates every cache table.
//!
//! Schema History:
//! - v1: Per-entity tables, group checkpoints, versioned JSON payloads

use crate::error::CacheError;
use crate::params::EntityType;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

pub const SCHEMA_VERSION: i64 = 1;

pub const GROUPS_TABLE: &str = "cache_groups";

fn entity_table_ddl(table: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            key TEXT NOT NULL,
            lang_code TEXT NOT NULL DEFAULT '',
            data TEXT NOT NULL,
            fetched_at INTEGER NOT NULL,
            PRIMARY KEY (key, lang_code)
        );
        CREATE INDEX IF NOT EXISTS idx_{table}_lang ON {table}(lang_code);
        CREATE INDEX IF NOT EXISTS idx_{table}_fetched_at ON {table}(fetched_at);
        "#
    )
}

fn create_tables(conn: &Connection) -> Result<(), CacheError> {
    let mut ddl = String::from(
        r#"
        CREATE TABLE IF NOT EXISTS cache_metadata (
            key TEXT PRIMARY KEY,
            value INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS cache_groups (
            entity_type TEXT NOT NULL,
            lang_code TEXT NOT NULL DEFAULT '',
            checked_at INTEGER NOT NULL,
            item_count INTEGER NOT NULL,
            PRIMARY KEY (entity_type, lang_code)
        );
        "#,
    );
    for entity in EntityType::ALL {
        ddl.push_str(&entity_table_ddl(entity.table()));
    }

    conn.execute_batch(&ddl)?;
    Ok(())
}

fn drop_cache_tables(conn: &Connection) -> Result<(), CacheError> {
    let mut ddl = format!("DROP TABLE IF EXISTS {};", GROUPS_TABLE);
    for entity in EntityType::ALL {
        ddl.push_str(&format!("DROP TABLE IF EXISTS {};", entity.table()));
    }
    conn.execute_batch(&ddl)?;
    Ok(())
}

/// Creates any missing tables and reconciles the stored layout version.
///
/// Safe to call any number of times.
pub fn ensure_schema(conn: &mut Connection) -> Result<(), CacheError> {
    let tx = conn.transaction()?;

    create_tables(&tx)?;

    let stored_version: Option<i64> = tx
        .query_row(
            "SELECT value FROM cache_metadata WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;

    match stored_version {
        Some(v) if v == SCHEMA_VERSION => {
            debug!("Cache schema v{} up to date", SCHEMA_VERSION);
        }
        Some(v) => {
            warn!(
                stored = v,
                current = SCHEMA_VERSION,
                "Cache schema mismatch, rebuilding cache tables"
            );
            drop_cache_tables(&tx)?;
            create_tables(&tx)?;
        }
        None => {
            info!("Initializing cache schema v{}", SCHEMA_VERSION);
        }
    }

    tx.execute(
        "INSERT OR REPLACE INTO cache_metadata (key, value) VALUES ('schema_version', ?)",
        params![SCHEMA_VERSION],
    )?;

    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect()
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        ensure_schema(&mut conn).unwrap();
        ensure_schema(&mut conn).unwrap();

        let tables = table_names(&conn);
        for expected in ["cache_groups", "cache_metadata", "champions", "keywords", "seasons", "versions"] {
            assert!(tables.iter().any(|t| t == expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_version_mismatch_clears_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        ensure_schema(&mut conn).unwrap();
        conn.execute(
            "INSERT INTO champions (key, lang_code, data, fetched_at) VALUES ('1', 'en_US', '{}', 0)",
            [],
        )
        .unwrap();
        conn.execute(
            "UPDATE cache_metadata SET value = 0 WHERE key = 'schema_version'",
            [],
        )
        .unwrap();

        ensure_schema(&mut conn).unwrap();

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM champions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 0);

        let version: i64 = conn
            .query_row(
                "SELECT value FROM cache_metadata WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_matching_version_keeps_rows() {
        let mut conn = Connection::open_in_memory().unwrap();
        ensure_schema(&mut conn).unwrap();
        conn.execute(
            "INSERT INTO versions (key, lang_code, data, fetched_at) VALUES ('14.1', '', '{}', 0)",
            [],
        )
        .unwrap();

        ensure_schema(&mut conn).unwrap();

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM versions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }
}
