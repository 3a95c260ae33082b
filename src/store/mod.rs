//! Per-profile persistence of parsed records.
//!
//! Each profile key owns one [`ProfileDocument`]. Feed records merge by `id`
//! (equal ids replace, new ids append); a parsed profile replaces the stored
//! one wholesale.

mod json;
mod sqlite;

pub use json::JsonFileStore;
pub use sqlite::SqliteStore;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::capture::ParsedSection;
use crate::records::{ActivityRecord, CommentRecord, ProfileRecord, ReactionRecord};

/// Version written into every saved document.
pub const SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed document for {key:?}: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("document for {key:?} has schema version {found}, this build reads up to {SCHEMA_VERSION}")]
    UnsupportedVersion { key: String, found: u32 },
    #[error("invalid profile key {0:?}")]
    InvalidKey(String),
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub added: usize,
    pub replaced: usize,
}

impl MergeStats {
    fn absorb(&mut self, other: MergeStats) {
        self.added += other.added;
        self.replaced += other.replaced;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDocument {
    pub schema_version: u32,
    pub profile_key: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub profile: Option<ProfileRecord>,
    #[serde(default)]
    pub activities: Vec<ActivityRecord>,
    #[serde(default)]
    pub comments: Vec<CommentRecord>,
    #[serde(default)]
    pub reactions: Vec<ReactionRecord>,
}

impl ProfileDocument {
    pub fn new(profile_key: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            profile_key: profile_key.into(),
            updated_at: None,
            profile: None,
            activities: Vec::new(),
            comments: Vec::new(),
            reactions: Vec::new(),
        }
    }

    /// Fold one parse result into the document.
    pub fn merge(&mut self, parsed: ParsedSection) -> MergeStats {
        let stats = match parsed {
            ParsedSection::Profile(profile) => {
                let replaced = self.profile.replace(profile).is_some();
                MergeStats {
                    added: usize::from(!replaced),
                    replaced: usize::from(replaced),
                }
            }
            ParsedSection::Posts(records) => merge_by_id(&mut self.activities, records, |r| r.id.as_str()),
            ParsedSection::Comments(records) => merge_by_id(&mut self.comments, records, |r| r.id.as_str()),
            ParsedSection::Reactions(records) => merge_by_id(&mut self.reactions, records, |r| r.id.as_str()),
        };
        self.updated_at = Some(Utc::now());
        stats
    }

    /// Read a stored document, upgrading older layouts.
    pub fn from_json(key: &str, raw: &str) -> Result<Self, StoreError> {
        let malformed = |source| StoreError::Malformed {
            key: key.to_string(),
            source,
        };
        let mut value: Value = serde_json::from_str(raw).map_err(malformed)?;
        let found = value
            .get("schemaVersion")
            .and_then(Value::as_u64)
            .map_or(1, |v| u32::try_from(v).unwrap_or(u32::MAX));

        if found > SCHEMA_VERSION {
            return Err(StoreError::UnsupportedVersion {
                key: key.to_string(),
                found,
            });
        }
        if found < 2 {
            debug!(key, from = found, "migrating stored document");
            migrate_v1(&mut value, key);
        }
        serde_json::from_value(value).map_err(malformed)
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string_pretty(self).map_err(|source| StoreError::Malformed {
            key: self.profile_key.clone(),
            source,
        })
    }
}

// Unversioned documents kept posts under "posts" and had no key or version.
fn migrate_v1(value: &mut Value, key: &str) {
    let Some(obj) = value.as_object_mut() else {
        return;
    };
    if let Some(posts) = obj.remove("posts") {
        obj.entry("activities").or_insert(posts);
    }
    obj.entry("profileKey").or_insert_with(|| Value::from(key));
    obj.insert("schemaVersion".into(), Value::from(SCHEMA_VERSION));
}

fn merge_by_id<T>(existing: &mut Vec<T>, incoming: Vec<T>, id: impl Fn(&T) -> &str) -> MergeStats {
    let mut index: HashMap<String, usize> = existing
        .iter()
        .enumerate()
        .map(|(i, r)| (id(r).to_string(), i))
        .collect();
    let mut stats = MergeStats::default();
    for record in incoming {
        match index.get(id(&record)) {
            Some(&at) => {
                existing[at] = record;
                stats.replaced += 1;
            }
            None => {
                index.insert(id(&record).to_string(), existing.len());
                existing.push(record);
                stats.added += 1;
            }
        }
    }
    stats
}

/// Keys become file names and table keys: keep them to a safe alphabet.
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    let ok = !key.is_empty()
        && key.len() <= 200
        && !key.starts_with('.')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

pub trait ProfileStore {
    /// The stored document, or an empty one for an unknown key.
    fn load(&self, key: &str) -> Result<ProfileDocument, StoreError>;

    fn save(&self, doc: &ProfileDocument) -> Result<(), StoreError>;

    fn merge(&self, key: &str, parsed: ParsedSection) -> Result<MergeStats, StoreError> {
        let mut doc = self.load(key)?;
        let section = parsed.section();
        let stats = doc.merge(parsed);
        self.save(&doc)?;
        info!(key, %section, added = stats.added, replaced = stats.replaced, "merged capture");
        Ok(stats)
    }

    fn merge_all(&self, key: &str, parsed: Vec<ParsedSection>) -> Result<MergeStats, StoreError> {
        let mut doc = self.load(key)?;
        let mut stats = MergeStats::default();
        for section in parsed {
            stats.absorb(doc.merge(section));
        }
        self.save(&doc)?;
        Ok(stats)
    }
}

/// Process-local store, mostly for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<String, ProfileDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryStore {
    fn load(&self, key: &str) -> Result<ProfileDocument, StoreError> {
        validate_key(key)?;
        let docs = self.docs.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(docs.get(key).cloned().unwrap_or_else(|| ProfileDocument::new(key)))
    }

    fn save(&self, doc: &ProfileDocument) -> Result<(), StoreError> {
        validate_key(&doc.profile_key)?;
        self.docs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(doc.profile_key.clone(), doc.clone());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::records::{ActivityType, Engagement};

    pub(crate) fn post(id: &str, content: &str) -> ActivityRecord {
        ActivityRecord {
            id: id.to_string(),
            activity_type: ActivityType::OriginalPost,
            timestamp: Some("1d".into()),
            authored_content: Some(content.to_string()),
            engagement: Engagement::default(),
            original_post: None,
            mentions: Vec::new(),
            hashtags: Vec::new(),
            media: Vec::new(),
            provenance: Vec::new(),
        }
    }

    #[test]
    fn merge_replaces_equal_ids_and_appends_new() {
        let mut doc = ProfileDocument::new("jane");
        let first = doc.merge(ParsedSection::Posts(vec![post("a", "one"), post("b", "two")]));
        assert_eq!(first, MergeStats { added: 2, replaced: 0 });

        let second = doc.merge(ParsedSection::Posts(vec![post("b", "two, edited"), post("c", "three")]));
        assert_eq!(second, MergeStats { added: 1, replaced: 1 });
        let contents: Vec<_> = doc.activities.iter().map(|a| a.authored_content.as_deref()).collect();
        assert_eq!(contents, vec![Some("one"), Some("two, edited"), Some("three")]);
    }

    #[test]
    fn merge_is_idempotent() {
        let mut doc = ProfileDocument::new("jane");
        let batch = vec![post("a", "one"), post("b", "two")];
        doc.merge(ParsedSection::Posts(batch.clone()));
        let once = doc.activities.clone();
        doc.merge(ParsedSection::Posts(batch));
        assert_eq!(doc.activities, once);
    }

    #[test]
    fn profile_is_replaced_wholesale() {
        let mut doc = ProfileDocument::new("jane");
        doc.merge(ParsedSection::Profile(ProfileRecord {
            name: Some("Jane".into()),
            headline: Some("Founder".into()),
            ..ProfileRecord::default()
        }));
        let stats = doc.merge(ParsedSection::Profile(ProfileRecord {
            name: Some("Jane Doe".into()),
            ..ProfileRecord::default()
        }));
        assert_eq!(stats.replaced, 1);
        let profile = doc.profile.unwrap();
        assert_eq!(profile.name.as_deref(), Some("Jane Doe"));
        assert_eq!(profile.headline, None);
    }

    #[test]
    fn unversioned_documents_migrate() {
        let raw = r#"{"profile": {"name": "Jane Doe"}, "posts": [], "comments": []}"#;
        let doc = ProfileDocument::from_json("jane", raw).unwrap();
        assert_eq!(doc.schema_version, SCHEMA_VERSION);
        assert_eq!(doc.profile_key, "jane");
        assert_eq!(doc.profile.and_then(|p| p.name).as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn newer_documents_are_rejected() {
        let raw = r#"{"schemaVersion": 99, "profileKey": "jane"}"#;
        assert!(matches!(
            ProfileDocument::from_json("jane", raw),
            Err(StoreError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn keys_are_validated() {
        let store = MemoryStore::new();
        assert!(matches!(store.load("../etc"), Err(StoreError::InvalidKey(_))));
        assert!(store.load("jane-doe_1").is_ok());
    }

    #[test]
    fn memory_store_merges() {
        let store = MemoryStore::new();
        store.merge("jane", ParsedSection::Posts(vec![post("a", "one")])).unwrap();
        let stats = store
            .merge_all(
                "jane",
                vec![
                    ParsedSection::Posts(vec![post("a", "one")]),
                    ParsedSection::Comments(Vec::new()),
                ],
            )
            .unwrap();
        assert_eq!(stats, MergeStats { added: 0, replaced: 1 });
        assert_eq!(store.load("jane").unwrap().activities.len(), 1);
    }
}
