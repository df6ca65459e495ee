//! Lazy, never-invalidated snapshot of the review list
//!
//! The first successful load is kept for the lifetime of the cache. Failed
//! loads (including not-found) are not cached, so the next call retries.
//! Reviews edited in the database after the first load stay invisible until
//! restart.

use super::{ReviewRecord, ReviewStore};
use crate::core::error::StorageResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct ReviewCache<S> {
    inner: S,
    snapshot: RwLock<Option<Arc<Vec<ReviewRecord>>>>,
}

impl<S: ReviewStore> ReviewCache<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            snapshot: RwLock::new(None),
        }
    }

    pub async fn is_populated(&self) -> bool {
        self.snapshot.read().await.is_some()
    }
}

#[async_trait]
impl<S: ReviewStore> ReviewStore for ReviewCache<S> {
    async fn list_reviews(&self) -> StorageResult<Vec<ReviewRecord>> {
        if let Some(cached) = self.snapshot.read().await.as_ref() {
            return Ok(cached.as_ref().clone());
        }

        let mut slot = self.snapshot.write().await;
        // another caller may have loaded while we waited for the write lock
        if let Some(cached) = slot.as_ref() {
            return Ok(cached.as_ref().clone());
        }

        let rows = self.inner.list_reviews().await?;
        tracing::debug!(count = rows.len(), "reviews cached");
        *slot = Some(Arc::new(rows.clone()));

        Ok(rows)
    }
}
