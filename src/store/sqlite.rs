use std::path::Path;
use std::sync::{Mutex, PoisonError};

use rusqlite::{params, Connection, OptionalExtension};

use super::{validate_key, ProfileDocument, ProfileStore, StoreError};

/// Documents kept as JSON text in a single SQLite table, one row per key.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        init_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stmt = conn.prepare("SELECT profile_key FROM profile_documents ORDER BY profile_key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS profile_documents (
            profile_key    TEXT PRIMARY KEY,
            schema_version INTEGER NOT NULL,
            document       TEXT NOT NULL,
            updated_at     TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;
    Ok(())
}

impl ProfileStore for SqliteStore {
    fn load(&self, key: &str) -> Result<ProfileDocument, StoreError> {
        validate_key(key)?;
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let raw: Option<String> = conn
            .query_row(
                "SELECT document FROM profile_documents WHERE profile_key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(raw) => ProfileDocument::from_json(key, &raw),
            None => Ok(ProfileDocument::new(key)),
        }
    }

    fn save(&self, doc: &ProfileDocument) -> Result<(), StoreError> {
        validate_key(&doc.profile_key)?;
        let json = doc.to_json()?;
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        conn.execute(
            "INSERT INTO profile_documents (profile_key, schema_version, document, updated_at)
             VALUES (?1, ?2, ?3, datetime('now'))
             ON CONFLICT(profile_key) DO UPDATE SET
                schema_version = excluded.schema_version,
                document = excluded.document,
                updated_at = excluded.updated_at",
            params![doc.profile_key, doc.schema_version, json],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::ParsedSection;
    use crate::records::ProfileRecord;
    use crate::store::tests::post;

    #[test]
    fn round_trips_documents() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.merge("jane", ParsedSection::Posts(vec![post("a", "one")])).unwrap();
        store
            .merge(
                "jane",
                ParsedSection::Profile(ProfileRecord {
                    name: Some("Jane Doe".into()),
                    ..ProfileRecord::default()
                }),
            )
            .unwrap();
        let doc = store.load("jane").unwrap();
        assert_eq!(doc.activities.len(), 1);
        assert_eq!(doc.profile.and_then(|p| p.name).as_deref(), Some("Jane Doe"));
        assert_eq!(store.keys().unwrap(), vec!["jane"]);
    }

    #[test]
    fn file_backed_store_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.sqlite");
        SqliteStore::open(&path)
            .unwrap()
            .merge("jane", ParsedSection::Posts(vec![post("a", "one")]))
            .unwrap();
        let doc = SqliteStore::open(&path).unwrap().load("jane").unwrap();
        assert_eq!(doc.activities[0].id, "a");
    }
}
