//! Review service

use super::ReviewService;
use crate::core::error::{ServiceError, ServiceResult};
use crate::storage::{ReviewRecord, ReviewStore};
use async_trait::async_trait;
use std::sync::Arc;

/// Public projection of a review. Source URL and timestamps stay in storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub id: u64,
    pub name: String,
    pub rate: i32,
    pub text: String,
    pub photo_url: String,
}

impl From<ReviewRecord> for Review {
    fn from(record: ReviewRecord) -> Self {
        Review {
            id: record.id,
            name: record.name,
            rate: record.rate,
            text: record.text,
            photo_url: record.photo_url,
        }
    }
}

/// Store-backed [`ReviewService`]
#[derive(Clone)]
pub struct Reviews {
    store: Arc<dyn ReviewStore>,
}

impl Reviews {
    pub fn new(store: Arc<dyn ReviewStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ReviewService for Reviews {
    async fn list_reviews(&self) -> ServiceResult<Vec<Review>> {
        let records = self
            .store
            .list_reviews()
            .await
            .map_err(|e| ServiceError::from_storage("reviews", "list reviews", e))?;

        Ok(records.into_iter().map(Review::from).collect())
    }
}
