//! Content-addressed, TTL-bounded on-disk memoization.
//!
//! Two codecs: [`Codec::Json`] for small structured values (station
//! metadata, inventory records) and [`Codec::Parquet`] for tabular frames,
//! via the `parquet` feature of the `polars` dependency already on the
//! dependency tree. `None` results are never cached — a function that legitimately
//! returns nothing (e.g. a provider that fails open on missing auth) must be
//! re-invoked on the next call, not silently frozen at "no data".
//!
//! Cache errors never fail a call: every fallible operation here degrades
//! to a logged MISS rather than propagating to the caller.

use std::fs;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use polars::prelude::*;
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Json,
    Parquet,
}

impl Codec {
    fn extension(self) -> &'static str {
        match self {
            Codec::Json => "json",
            Codec::Parquet => "parquet",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

/// Derive a stable textual key from a function identity and its serialized
/// argument tuple. Two calls with the same `function_id` and structurally
/// equal args always land on the same key regardless of call order.
pub fn cache_key(function_id: &str, args: &impl Serialize) -> CacheKey {
    let mut hasher = Sha256::new();
    hasher.update(function_id.as_bytes());
    hasher.update(b"|");
    let serialized = serde_json::to_vec(args).unwrap_or_default();
    hasher.update(&serialized);
    CacheKey(hex::encode(hasher.finalize()))
}

#[derive(Clone)]
pub struct Cache {
    directory: PathBuf,
    enabled: bool,
}

impl Cache {
    pub fn new(directory: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            directory: directory.into(),
            enabled,
        }
    }

    fn path_for(&self, key: &CacheKey, codec: Codec) -> PathBuf {
        self.directory.join(format!("{}.{}", key.0, codec.extension()))
    }

    fn is_fresh(path: &Path, ttl: Duration) -> bool {
        let Ok(meta) = fs::metadata(path) else {
            return false;
        };
        let Ok(modified) = meta.modified() else {
            return false;
        };
        match SystemTime::now().duration_since(modified) {
            Ok(age) => age <= ttl,
            Err(_) => true, // clock skew into the future: treat as fresh
        }
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        fs::create_dir_all(&self.directory)?;
        let tmp = path.with_extension(format!("{}.tmp", path.extension().and_then(|e| e.to_str()).unwrap_or("")));
        {
            let mut f = fs::File::create(&tmp)?;
            f.write_all(bytes)?;
        }
        fs::rename(&tmp, path)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
        }
        Ok(())
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &CacheKey, ttl: Duration) -> Option<T> {
        if !self.enabled {
            return None;
        }
        let path = self.path_for(key, Codec::Json);
        if !Self::is_fresh(&path, ttl) {
            return None;
        }
        match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!(error = %e, "cache decode failure, treating as MISS");
                    None
                }
            },
            Err(_) => None,
        }
    }

    pub fn put_json<T: Serialize>(&self, key: &CacheKey, value: &T) {
        if !self.enabled {
            return;
        }
        let path = self.path_for(key, Codec::Json);
        let Ok(bytes) = serde_json::to_vec(value) else {
            return;
        };
        if let Err(e) = self.write_atomic(&path, &bytes) {
            tracing::warn!(error = %e, "cache write failure, degrading to MISS");
        }
    }

    pub fn get_frame(&self, key: &CacheKey, ttl: Duration) -> Option<DataFrame> {
        if !self.enabled {
            return None;
        }
        let path = self.path_for(key, Codec::Parquet);
        if !Self::is_fresh(&path, ttl) {
            return None;
        }
        let file = fs::File::open(&path).ok()?;
        ParquetReader::new(file).finish().ok()
    }

    pub fn put_frame(&self, key: &CacheKey, df: &DataFrame) {
        if !self.enabled {
            return;
        }
        let path = self.path_for(key, Codec::Parquet);
        if fs::create_dir_all(&self.directory).is_err() {
            return;
        }
        let tmp = path.with_extension("parquet.tmp");
        let write_result = (|| -> PolarsResult<()> {
            let mut file = fs::File::create(&tmp)?;
            let mut df = df.clone();
            ParquetWriter::new(&mut file).finish(&mut df)?;
            Ok(())
        })();
        match write_result {
            Ok(()) => {
                if let Err(e) = fs::rename(&tmp, &path) {
                    tracing::warn!(error = %e, "cache rename failure, degrading to MISS");
                }
            }
            Err(e) => tracing::warn!(error = %e, "cache frame write failure, degrading to MISS"),
        }
    }

    /// Scan and remove entries older than `older_than`. Runs once on first
    /// access after startup, not continuously.
    pub fn purge(&self, older_than: Duration) {
        let Ok(entries) = fs::read_dir(&self.directory) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !Self::is_fresh(&path, older_than) {
                let _ = fs::remove_file(&path);
            }
        }
    }
}

/// Cache decorator for functions returning a JSON-codec-able scalar/record.
/// `None` results are never cached, so a call that legitimately finds
/// nothing is retried next time rather than pinned to "no data" forever.
pub async fn cached_json<T, F, Fut>(
    cache: &Cache,
    function_id: &str,
    args: &impl Serialize,
    ttl: Duration,
    f: F,
) -> Option<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let key = cache_key(function_id, args);
    if let Some(hit) = cache.get_json::<T>(&key, ttl) {
        return Some(hit);
    }
    let result = f().await;
    if let Some(ref value) = result {
        cache.put_json(&key, value);
    }
    result
}

/// Cache decorator for functions returning a tabular [`DataFrame`].
pub async fn cached_frame<F, Fut>(
    cache: &Cache,
    function_id: &str,
    args: &impl Serialize,
    ttl: Duration,
    f: F,
) -> Option<DataFrame>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Option<DataFrame>>,
{
    let key = cache_key(function_id, args);
    if let Some(hit) = cache.get_frame(&key, ttl) {
        return Some(hit);
    }
    let result = f().await;
    if let Some(ref df) = result {
        cache.put_frame(&key, df);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn none_result_is_not_cached_and_retried() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path(), true);
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = calls.clone();
            let result: Option<String> = cached_json(&cache, "fn_a", &("x", 1), Duration::from_secs(60), || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                None
            })
            .await;
            assert!(result.is_none());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn some_result_is_cached_and_not_recomputed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path(), true);
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = calls.clone();
            let result: Option<String> = cached_json(&cache, "fn_b", &("x", 1), Duration::from_secs(60), || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Some("hit".to_string())
            })
            .await;
            assert_eq!(result, Some("hit".to_string()));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn disabled_cache_always_misses() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path(), false);
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let calls = calls.clone();
            let _: Option<String> = cached_json(&cache, "fn_c", &("x", 1), Duration::from_secs(60), || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Some("hit".to_string())
            })
            .await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn same_args_same_key_different_args_different_key() {
        let k1 = cache_key("fn_a", &("x", 1));
        let k2 = cache_key("fn_a", &("x", 1));
        let k3 = cache_key("fn_a", &("x", 2));
        assert_eq!(k1, k2);
        assert_ne!(k1, k3);
    }
}
