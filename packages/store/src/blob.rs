use crate::error::{BlobError, BlobResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use vidnote_document::{LogicalPath, ResolvedUrl};

/// Remote storage for videos and images.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `path`. Never overwrites.
    async fn upload(&self, path: &LogicalPath, bytes: Vec<u8>) -> BlobResult<()>;

    /// Issue a short-lived fetchable URL for `path`.
    async fn resolve_download_url(&self, path: &LogicalPath) -> BlobResult<ResolvedUrl>;

    /// Make `path` publicly reachable. Callers treat failure as non-fatal.
    async fn publish(&self, path: &LogicalPath) -> BlobResult<()>;
}

/// In-process blob store for tests and local runs.
pub struct MemoryBlobStore {
    url_base: String,
    blobs: Mutex<HashMap<LogicalPath, Vec<u8>>>,
    published: Mutex<HashSet<LogicalPath>>,
    unresolvable: Mutex<HashSet<LogicalPath>>,
    resolve_calls: Mutex<HashMap<LogicalPath, usize>>,
    total_resolve_calls: AtomicUsize,
    fail_uploads: AtomicBool,
    latency: Option<Duration>,
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new("memory://")
    }
}

impl MemoryBlobStore {
    /// Resolved URLs are `url_base` followed by the logical path.
    pub fn new(url_base: impl Into<String>) -> Self {
        Self {
            url_base: url_base.into(),
            blobs: Mutex::new(HashMap::new()),
            published: Mutex::new(HashSet::new()),
            unresolvable: Mutex::new(HashSet::new()),
            resolve_calls: Mutex::new(HashMap::new()),
            total_resolve_calls: AtomicUsize::new(0),
            fail_uploads: AtomicBool::new(false),
            latency: None,
        }
    }

    /// Delay every resolution, to observe concurrent fan-out.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub async fn insert(&self, path: impl Into<LogicalPath>, bytes: Vec<u8>) {
        self.blobs.lock().await.insert(path.into(), bytes);
    }

    pub async fn get(&self, path: &LogicalPath) -> Option<Vec<u8>> {
        self.blobs.lock().await.get(path).cloned()
    }

    /// Make resolution of `path` fail from now on.
    pub async fn fail_resolution(&self, path: impl Into<LogicalPath>) {
        self.unresolvable.lock().await.insert(path.into());
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub async fn is_published(&self, path: &LogicalPath) -> bool {
        self.published.lock().await.contains(path)
    }

    pub fn resolve_calls(&self) -> usize {
        self.total_resolve_calls.load(Ordering::SeqCst)
    }

    pub async fn resolve_calls_for(&self, path: &LogicalPath) -> usize {
        self.resolve_calls
            .lock()
            .await
            .get(path)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, path: &LogicalPath, bytes: Vec<u8>) -> BlobResult<()> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(BlobError::Failure("upload rejected".to_string()));
        }

        let mut blobs = self.blobs.lock().await;
        if blobs.contains_key(path) {
            return Err(BlobError::Conflict { path: path.clone() });
        }
        blobs.insert(path.clone(), bytes);
        Ok(())
    }

    async fn resolve_download_url(&self, path: &LogicalPath) -> BlobResult<ResolvedUrl> {
        self.total_resolve_calls.fetch_add(1, Ordering::SeqCst);
        *self
            .resolve_calls
            .lock()
            .await
            .entry(path.clone())
            .or_insert(0) += 1;

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.unresolvable.lock().await.contains(path) {
            return Err(BlobError::unavailable(path, "resolution disabled"));
        }
        if !self.blobs.lock().await.contains_key(path) {
            return Err(BlobError::unavailable(path, "no such blob"));
        }

        Ok(ResolvedUrl::new(format!("{}{}", self.url_base, path)))
    }

    async fn publish(&self, path: &LogicalPath) -> BlobResult<()> {
        if !self.blobs.lock().await.contains_key(path) {
            return Err(BlobError::unavailable(path, "no such blob"));
        }
        self.published.lock().await.insert(path.clone());
        Ok(())
    }
}
