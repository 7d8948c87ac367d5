//! Persistent search history.
//!
//! [`HistoryStore`] owns the dedup and id rules; a [`HistoryBackend`] only
//! knows how to load and replace the whole collection. Every operation runs
//! a full load-modify-persist cycle under the store's lock, so concurrent
//! callers sharing one store never lose each other's writes.
//!
//! Store policy:
//! - adding a name that already exists (ignoring case) returns the existing
//!   entry and writes nothing;
//! - a backing file that is not valid JSON surfaces [`Error::CorruptStore`]
//!   and is never overwritten.

use std::{
    fmt::Debug,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    model::HistoryEntry,
};

#[async_trait]
pub trait HistoryBackend: Send + Sync + Debug {
    /// The full collection in insertion order; an absent store is empty.
    async fn load(&self) -> Result<Vec<HistoryEntry>>;

    /// Replace the stored collection with `entries`.
    async fn persist(&self, entries: &[HistoryEntry]) -> Result<()>;
}

/// Human-readable JSON file, rewritten in full on every mutation.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "history.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl HistoryBackend for JsonFileBackend {
    async fn load(&self) -> Result<Vec<HistoryEntry>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io(&self.path, e)),
        };

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&contents).map_err(|source| Error::CorruptStore {
            path: self.path.clone(),
            source,
        })
    }

    async fn persist(&self, entries: &[HistoryEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io(parent, e))?;
        }

        let json = to_tab_indented_json(entries).map_err(|source| Error::CorruptStore {
            path: self.path.clone(),
            source,
        })?;

        // Write aside and rename so a crash never leaves a half-written file.
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| Error::io(&tmp, e))?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                tracing::warn!(path = %tmp.display(), error = %cleanup, "failed to remove temporary history file");
            }
            return Err(Error::io(&self.path, e));
        }

        Ok(())
    }
}

fn to_tab_indented_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    out.push(b'\n');
    Ok(out)
}

/// Keeps the collection in memory only.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<HistoryEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }
}

#[async_trait]
impl HistoryBackend for MemoryBackend {
    async fn load(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.entries.lock().await.clone())
    }

    async fn persist(&self, entries: &[HistoryEntry]) -> Result<()> {
        *self.entries.lock().await = entries.to_vec();
        Ok(())
    }
}

#[derive(Debug)]
pub struct HistoryStore<B> {
    backend: B,
    lock: Mutex<()>,
}

impl HistoryStore<JsonFileBackend> {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(JsonFileBackend::new(path))
    }
}

impl<B: HistoryBackend> HistoryStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            lock: Mutex::new(()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn list(&self) -> Result<Vec<HistoryEntry>> {
        let _guard = self.lock.lock().await;
        self.backend.load().await
    }

    /// Case-insensitive lookup by name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<HistoryEntry>> {
        let key = dedup_key(name);
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|entry| dedup_key(&entry.name) == key))
    }

    pub async fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.find_by_name(name).await?.is_some())
    }

    /// Record `name`, or return the entry already recorded under it.
    ///
    /// `name` is stored exactly as submitted. Surrounding whitespace only
    /// matters for the blank check and the case-insensitive duplicate check.
    pub async fn add(&self, name: &str) -> Result<HistoryEntry> {
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("city name cannot be blank".to_string()));
        }

        let _guard = self.lock.lock().await;
        let mut entries = self.backend.load().await?;

        let key = dedup_key(name);
        if let Some(existing) = entries.iter().find(|entry| dedup_key(&entry.name) == key) {
            tracing::debug!(id = %existing.id, name = %existing.name, "city already in history");
            return Ok(existing.clone());
        }

        let entry = HistoryEntry {
            id: new_id(&entries),
            name: name.to_string(),
        };
        entries.push(entry.clone());
        self.backend.persist(&entries).await?;

        tracing::info!(id = %entry.id, name = %entry.name, "added city to history");
        Ok(entry)
    }

    /// Returns whether an entry with `id` existed. Nothing is written when
    /// it did not.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let entries = self.backend.load().await?;
        let before = entries.len();

        let remaining: Vec<HistoryEntry> = entries.into_iter().filter(|e| e.id != id).collect();
        if remaining.len() == before {
            tracing::debug!(id, "no history entry to remove");
            return Ok(false);
        }

        self.backend.persist(&remaining).await?;
        tracing::info!(id, "removed city from history");
        Ok(true)
    }
}

fn dedup_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn new_id(existing: &[HistoryEntry]) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if existing.iter().all(|e| e.id != id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn entry(id: &str, name: &str) -> HistoryEntry {
        HistoryEntry {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn add_is_case_insensitive_and_returns_existing() {
        let store = HistoryStore::new(MemoryBackend::new());

        let first = store.add("Paris").await.unwrap();
        let second = store.add("paris").await.unwrap();

        assert_eq!(first, second);
        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Paris");
    }

    #[tokio::test]
    async fn add_rejects_blank_names() {
        let store = HistoryStore::new(MemoryBackend::new());

        for name in ["", "   ", "\t"] {
            let err = store.add(name).await.unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)));
        }
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_preserves_insertion_order_with_unique_ids() {
        let store = HistoryStore::new(MemoryBackend::new());
        for name in ["Tokyo", "Lima", "Oslo"] {
            store.add(name).await.unwrap();
        }

        let all = store.list().await.unwrap();
        let names: Vec<_> = all.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Tokyo", "Lima", "Oslo"]);

        assert!(all.iter().all(|e| !e.id.is_empty()));
        assert_ne!(all[0].id, all[1].id);
        assert_ne!(all[1].id, all[2].id);
        assert_ne!(all[0].id, all[2].id);
    }

    #[tokio::test]
    async fn add_stores_name_as_submitted() {
        let store = HistoryStore::new(MemoryBackend::new());

        let entry = store.add("  Tokyo ").await.unwrap();
        assert_eq!(entry.name, "  Tokyo ");

        let again = store.add("tokyo").await.unwrap();
        assert_eq!(again, entry);
        assert_eq!(store.list().await.unwrap(), vec![entry]);
    }

    #[tokio::test]
    async fn remove_unknown_id_returns_false_and_changes_nothing() {
        let seeded = vec![entry("a", "Rome"), entry("b", "Cairo")];
        let store = HistoryStore::new(MemoryBackend::with_entries(seeded.clone()));

        assert!(!store.remove("zzz").await.unwrap());
        assert_eq!(store.list().await.unwrap(), seeded);
    }

    #[tokio::test]
    async fn remove_known_id_drops_only_that_entry() {
        let store = HistoryStore::new(MemoryBackend::with_entries(vec![
            entry("a", "Rome"),
            entry("b", "Cairo"),
        ]));

        assert!(store.remove("a").await.unwrap());
        assert_eq!(store.list().await.unwrap(), vec![entry("b", "Cairo")]);
        assert!(!store.remove("a").await.unwrap());
    }

    #[tokio::test]
    async fn find_by_name_ignores_case() {
        let store = HistoryStore::new(MemoryBackend::with_entries(vec![entry("a", "New York")]));

        assert_eq!(store.find_by_name("NEW YORK").await.unwrap(), Some(entry("a", "New York")));
        assert!(store.contains("new york").await.unwrap());
        assert!(!store.contains("York").await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_adds_are_not_lost() {
        let store = Arc::new(HistoryStore::new(MemoryBackend::new()));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.add(&format!("City {i}")).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.list().await.unwrap().len(), 16);
    }

    #[tokio::test]
    async fn json_file_round_trip_preserves_order_and_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db").join("history.json");

        let store = HistoryStore::open(&path);
        let tokyo = store.add("Tokyo").await.unwrap();
        store.add("Berlin").await.unwrap();

        let reopened = HistoryStore::open(&path);
        let all = reopened.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], tokyo);
        assert_eq!(all[1].name, "Berlin");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\t"));
        assert!(!dir.path().join("db").join("history.json.tmp").exists());
    }

    #[tokio::test]
    async fn failed_rename_removes_temporary_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        // A non-empty directory at the target path makes the rename fail.
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "x").unwrap();

        let backend = JsonFileBackend::new(&path);
        let err = backend.persist(&[entry("a", "Rome")]).await.unwrap_err();

        assert!(matches!(err, Error::Io { .. }), "unexpected: {err}");
        assert!(!dir.path().join("history.json.tmp").exists());
        assert!(path.join("keep").exists());
    }

    #[tokio::test]
    async fn missing_file_lists_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join("absent.json"));

        assert!(store.list().await.unwrap().is_empty());
        assert!(!store.remove("anything").await.unwrap());
        assert!(!dir.path().join("absent.json").exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_reported_and_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = HistoryStore::open(&path);
        assert!(matches!(store.list().await, Err(Error::CorruptStore { .. })));
        assert!(matches!(store.add("Paris").await, Err(Error::CorruptStore { .. })));

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[tokio::test]
    async fn removal_is_not_resurrected_by_later_add() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join("history.json"));

        let rome = store.add("Rome").await.unwrap();
        assert!(store.remove(&rome.id).await.unwrap());
        store.add("Cairo").await.unwrap();

        let names: Vec<_> = store.list().await.unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, ["Cairo"]);
    }
}
