//! Key-value storage port for job records and results

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::StoreError;

const STATUS_PREFIX: &str = "job_status:";
const RESULT_PREFIX: &str = "job_result:";

pub fn status_key(job_id: &str) -> String {
    format!("{}{}", STATUS_PREFIX, job_id)
}

pub fn result_key(job_id: &str) -> String {
    format!("{}{}", RESULT_PREFIX, job_id)
}

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value, for `ttl`
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError>;

    /// Current value, `None` when absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
}

#[async_trait]
impl<T: JobStore + ?Sized> JobStore for Arc<T> {
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError> {
        (**self).put(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }
}

struct Entry {
    value: String,
    expires_at: Instant,
}

fn drop_expired(entries: &mut HashMap<String, Entry>, now: Instant) -> usize {
    let before = entries.len();
    entries.retain(|_, e| e.expires_at > now);
    before - entries.len()
}

/// In-process store with per-key expiry
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop expired entries, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        drop_expired(&mut *self.entries.write().await, Instant::now())
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        // Writes reclaim what reads only hide
        drop_expired(&mut entries, now);
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| e.value.clone()))
    }
}
