use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::debug;

/// Bumped whenever the on-disk entry format changes; entries written under a
/// different version are discarded on read.
pub const CACHE_VERSION: &str = "1.0";

const STORAGE_PREFIX: &str = "pokedraw_cache";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: serde_json::Value,
    pub fetched_at_ms: u64,
    pub version: String,
}

impl CacheEntry {
    pub fn new(data: serde_json::Value, fetched_at_ms: u64) -> Self {
        Self {
            data,
            fetched_at_ms,
            version: CACHE_VERSION.to_string(),
        }
    }

    pub fn is_expired(&self, now_ms: u64, ttl_ms: u64) -> bool {
        now_ms.saturating_sub(self.fetched_at_ms) > ttl_ms
    }

    fn is_compatible(&self) -> bool {
        self.version == CACHE_VERSION
    }
}

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Cross-session key-value tier. Writes may fail (quota, permissions); the
/// store swallows those failures and the overall fetch proceeds uncached.
#[async_trait]
pub trait DurableStore: Send + Sync {
    async fn read(&self, key: &str) -> Option<CacheEntry>;
    async fn write(&self, key: &str, entry: &CacheEntry);
    async fn remove(&self, key: &str);
}

/// Filesystem-backed durable tier. Each entry lives in its own file named by
/// the SHA-256 of the cache key, serialized as JSON.
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn default_root() -> PathBuf {
        dirs_next::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pokedraw")
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let digest = hex::encode(hasher.finalize());
        self.root.join(STORAGE_PREFIX).join(format!("{digest}.json"))
    }

    async fn read_entry(path: &Path) -> Option<CacheEntry> {
        let bytes = fs::read(path).await.ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!("discarding unreadable cache file {}: {err}", path.display());
                let _ = fs::remove_file(path).await;
                None
            }
        }
    }
}

#[async_trait]
impl DurableStore for DiskStore {
    async fn read(&self, key: &str) -> Option<CacheEntry> {
        Self::read_entry(&self.entry_path(key)).await
    }

    async fn write(&self, key: &str, entry: &CacheEntry) {
        let path = self.entry_path(key);
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent).await;
        }
        let Ok(bytes) = serde_json::to_vec(entry) else {
            return;
        };
        if let Err(err) = fs::write(&path, bytes).await {
            debug!("cache write skipped for {}: {err}", path.display());
        }
    }

    async fn remove(&self, key: &str) {
        let _ = fs::remove_file(self.entry_path(key)).await;
    }
}

/// Outcome of a cache consult. `fresh` is a within-TTL copy; `stale` is the
/// newest copy seen past its TTL, kept so a failed refresh can still serve it.
#[derive(Clone, Debug, Default)]
pub struct Lookup {
    pub fresh: Option<serde_json::Value>,
    pub stale: Option<serde_json::Value>,
}

/// In-memory tier over a durable tier. Keys are fully-qualified request URLs;
/// values are immutable snapshots, so concurrent writes are last-writer-wins.
pub struct TieredCache {
    memory: moka::future::Cache<String, CacheEntry>,
    durable: Arc<dyn DurableStore>,
    ttl_ms: u64,
}

impl TieredCache {
    pub fn new(memory_capacity: u64, ttl_ms: u64, durable: Arc<dyn DurableStore>) -> Self {
        Self {
            memory: moka::future::Cache::builder()
                .max_capacity(memory_capacity)
                .build(),
            durable,
            ttl_ms,
        }
    }

    pub async fn lookup(&self, key: &str) -> Lookup {
        self.lookup_at(key, now_ms()).await
    }

    async fn lookup_at(&self, key: &str, now_ms: u64) -> Lookup {
        let mut outcome = Lookup::default();

        if let Some(entry) = self.memory.get(key).await {
            if !entry.is_compatible() {
                self.memory.invalidate(key).await;
            } else if entry.is_expired(now_ms, self.ttl_ms) {
                // Expired memory entries are skipped, not evicted: they back
                // the stale fallback until a refresh overwrites them.
                outcome.stale = Some(entry.data);
            } else {
                outcome.fresh = Some(entry.data);
                return outcome;
            }
        }

        if let Some(entry) = self.durable.read(key).await {
            if !entry.is_compatible() {
                self.durable.remove(key).await;
            } else if entry.is_expired(now_ms, self.ttl_ms) {
                self.durable.remove(key).await;
                if outcome.stale.is_none() {
                    outcome.stale = Some(entry.data);
                }
            } else {
                // Promote with the entry's original fetch time; the TTL clock
                // starts at fetch, not at promotion.
                self.memory.insert(key.to_string(), entry.clone()).await;
                outcome.fresh = Some(entry.data);
            }
        }

        outcome
    }

    pub async fn put(&self, key: &str, value: serde_json::Value) {
        self.put_at(key, value, now_ms()).await;
    }

    async fn put_at(&self, key: &str, value: serde_json::Value, now_ms: u64) {
        let entry = CacheEntry::new(value, now_ms);
        self.memory.insert(key.to_string(), entry.clone()).await;
        self.durable.write(key, &entry).await;
    }

    pub async fn evict(&self, key: &str) {
        self.memory.invalidate(key).await;
        self.durable.remove(key).await;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct MemStore {
        entries: Mutex<HashMap<String, CacheEntry>>,
    }

    #[async_trait]
    impl DurableStore for MemStore {
        async fn read(&self, key: &str) -> Option<CacheEntry> {
            self.entries.lock().expect("store lock").get(key).cloned()
        }

        async fn write(&self, key: &str, entry: &CacheEntry) {
            self.entries
                .lock()
                .expect("store lock")
                .insert(key.to_string(), entry.clone());
        }

        async fn remove(&self, key: &str) {
            self.entries.lock().expect("store lock").remove(key);
        }
    }

    const TTL: u64 = 300_000;

    fn cache_with_store() -> (TieredCache, Arc<MemStore>) {
        let store = Arc::new(MemStore::default());
        (TieredCache::new(64, TTL, store.clone()), store)
    }

    #[test]
    fn entry_expires_strictly_after_ttl() {
        let entry = CacheEntry::new(json!(1), 1_000);
        assert!(!entry.is_expired(1_000 + TTL - 1, TTL));
        assert!(!entry.is_expired(1_000 + TTL, TTL));
        assert!(entry.is_expired(1_000 + TTL + 1, TTL));
    }

    #[tokio::test]
    async fn put_then_lookup_is_fresh_within_ttl() {
        let (cache, _store) = cache_with_store();
        cache.put_at("k", json!({"id": 1}), 1_000).await;

        let outcome = cache.lookup_at("k", 1_000 + TTL - 1).await;
        assert_eq!(outcome.fresh, Some(json!({"id": 1})));
        assert!(outcome.stale.is_none());
    }

    #[tokio::test]
    async fn expired_memory_entry_becomes_stale_candidate() {
        let (cache, _store) = cache_with_store();
        cache.put_at("k", json!("old"), 1_000).await;

        let outcome = cache.lookup_at("k", 1_000 + TTL + 1).await;
        assert!(outcome.fresh.is_none());
        assert_eq!(outcome.stale, Some(json!("old")));

        // Still reported stale on the next miss; nothing evicted it.
        let again = cache.lookup_at("k", 1_000 + TTL + 2).await;
        assert_eq!(again.stale, Some(json!("old")));
    }

    #[tokio::test]
    async fn durable_hit_promotes_with_original_fetch_time() {
        let (cache, store) = cache_with_store();
        store
            .write("k", &CacheEntry::new(json!("durable"), 1_000))
            .await;

        let outcome = cache.lookup_at("k", 2_000).await;
        assert_eq!(outcome.fresh, Some(json!("durable")));

        let promoted = cache.memory.get("k").await.expect("promoted entry");
        assert_eq!(promoted.fetched_at_ms, 1_000);

        // The TTL clock keeps running from the original fetch.
        let later = cache.lookup_at("k", 1_000 + TTL + 1).await;
        assert!(later.fresh.is_none());
        assert_eq!(later.stale, Some(json!("durable")));
    }

    #[tokio::test]
    async fn expired_durable_entry_is_removed_but_reported_stale() {
        let (cache, store) = cache_with_store();
        store.write("k", &CacheEntry::new(json!("old"), 1_000)).await;

        let outcome = cache.lookup_at("k", 1_000 + TTL + 1).await;
        assert!(outcome.fresh.is_none());
        assert_eq!(outcome.stale, Some(json!("old")));
        assert!(store.read("k").await.is_none());
    }

    #[tokio::test]
    async fn version_mismatch_is_discarded_not_served() {
        let (cache, store) = cache_with_store();
        let mut entry = CacheEntry::new(json!("incompatible"), 1_000);
        entry.version = "0.9".to_string();
        store.write("k", &entry).await;

        let outcome = cache.lookup_at("k", 1_100).await;
        assert!(outcome.fresh.is_none());
        assert!(outcome.stale.is_none());
        assert!(store.read("k").await.is_none());
    }

    #[tokio::test]
    async fn put_writes_through_to_both_tiers() {
        let (cache, store) = cache_with_store();
        cache.put_at("k", json!(7), 1_000).await;

        assert!(cache.memory.get("k").await.is_some());
        assert_eq!(store.read("k").await.map(|entry| entry.data), Some(json!(7)));
    }

    #[tokio::test]
    async fn evict_clears_both_tiers() {
        let (cache, store) = cache_with_store();
        cache.put_at("k", json!(7), 1_000).await;
        cache.evict("k").await;

        assert!(cache.memory.get("k").await.is_none());
        assert!(store.read("k").await.is_none());
        let outcome = cache.lookup_at("k", 1_100).await;
        assert!(outcome.fresh.is_none() && outcome.stale.is_none());
    }

    #[tokio::test]
    async fn disk_store_round_trips_and_removes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DiskStore::new(dir.path().to_path_buf());
        let entry = CacheEntry::new(json!({"name": "bulbasaur"}), 42);

        store.write("https://example/pokemon/1", &entry).await;
        let read = store.read("https://example/pokemon/1").await;
        assert_eq!(read, Some(entry));

        store.remove("https://example/pokemon/1").await;
        assert!(store.read("https://example/pokemon/1").await.is_none());
    }

    #[tokio::test]
    async fn disk_store_drops_corrupt_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DiskStore::new(dir.path().to_path_buf());
        let path = store.entry_path("k");
        fs::create_dir_all(path.parent().expect("parent"))
            .await
            .expect("mkdir");
        fs::write(&path, b"not json").await.expect("seed");

        assert!(store.read("k").await.is_none());
        assert!(!path.exists());
    }
}
