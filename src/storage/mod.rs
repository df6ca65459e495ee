//! Storage layer: record types, store traits and backends
//!
//! Records here are the storage-side shape of each entity. They carry the
//! shared status enums; the column encoding of those enums is owned by each
//! backend.

pub mod cache;
pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use cache::ReviewCache;
pub use in_memory::{InMemoryOrderStore, InMemoryReviewStore};
#[cfg(feature = "postgres")]
pub use postgres::{PostgresOrderStore, PostgresReviewStore, ensure_schema};

use crate::core::error::{StorageError, StorageResult};
use crate::core::status::{OrderStatus, PropertySize};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A stored order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub id: u64,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub move_date: NaiveDate,
    pub move_from: String,
    pub move_to: String,
    pub property_size: PropertySize,
    pub status: OrderStatus,
    pub additional_info: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload. The status is not part of it: new orders always start
/// as [`OrderStatus::Created`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderRecord {
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub move_date: NaiveDate,
    pub move_from: String,
    pub move_to: String,
    pub property_size: PropertySize,
    pub additional_info: Option<String>,
}

/// Sparse update: `None` leaves the column untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPatch {
    pub property_size: Option<PropertySize>,
    pub status: Option<OrderStatus>,
    pub move_date: Option<NaiveDate>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub move_from: Option<String>,
    pub move_to: Option<String>,
    pub additional_info: Option<String>,
}

impl OrderPatch {
    pub fn is_empty(&self) -> bool {
        *self == OrderPatch::default()
    }

    /// Apply the present fields onto `record`
    pub fn apply_to(self, record: &mut OrderRecord) {
        if let Some(v) = self.property_size {
            record.property_size = v;
        }
        if let Some(v) = self.status {
            record.status = v;
        }
        if let Some(v) = self.move_date {
            record.move_date = v;
        }
        if let Some(v) = self.name {
            record.name = v;
        }
        if let Some(v) = self.email {
            record.email = Some(v);
        }
        if let Some(v) = self.phone {
            record.phone = v;
        }
        if let Some(v) = self.move_from {
            record.move_from = v;
        }
        if let Some(v) = self.move_to {
            record.move_to = v;
        }
        if let Some(v) = self.additional_info {
            record.additional_info = Some(v);
        }
    }
}

/// List filter. Bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub property_size: Option<PropertySize>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub move_date_from: Option<NaiveDate>,
    pub move_date_to: Option<NaiveDate>,
}

impl OrderQuery {
    pub fn is_empty(&self) -> bool {
        *self == OrderQuery::default()
    }

    /// Whether `record` passes every present predicate
    pub fn matches(&self, record: &OrderRecord) -> bool {
        self.status.is_none_or(|s| record.status == s)
            && self.property_size.is_none_or(|p| record.property_size == p)
            && self.created_from.is_none_or(|t| record.created_at >= t)
            && self.created_to.is_none_or(|t| record.created_at <= t)
            && self.move_date_from.is_none_or(|d| record.move_date >= d)
            && self.move_date_to.is_none_or(|d| record.move_date <= d)
    }
}

/// A stored customer review
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRecord {
    pub id: u64,
    pub name: String,
    pub rate: i32,
    pub text: String,
    pub photo_url: String,
    pub review_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What a list query returns when it matches no rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyListPolicy {
    /// Zero rows is reported as [`StorageError::NotFound`]
    #[default]
    NotFound,
    /// Zero rows is an ordinary empty list
    EmptyList,
}

impl EmptyListPolicy {
    pub fn apply<T>(self, rows: Vec<T>) -> StorageResult<Vec<T>> {
        match self {
            EmptyListPolicy::NotFound if rows.is_empty() => Err(StorageError::NotFound),
            _ => Ok(rows),
        }
    }
}

/// Reject an update before it reaches the store
pub fn check_update(id: u64, patch: &OrderPatch) -> StorageResult<()> {
    if id == 0 {
        return Err(StorageError::InvalidId);
    }
    if patch.is_empty() {
        return Err(StorageError::EmptyPatch);
    }
    Ok(())
}

/// Order persistence
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert with status `created`; returns the hydrated row
    async fn create_order(&self, order: NewOrderRecord) -> StorageResult<OrderRecord>;

    /// Newest first. `None` lists every row.
    async fn list_orders(&self, query: Option<&OrderQuery>) -> StorageResult<Vec<OrderRecord>>;

    async fn get_order(&self, id: u64) -> StorageResult<OrderRecord>;

    /// Touch only the fields present in `patch`; `updated_at` strictly increases
    async fn update_order(&self, id: u64, patch: OrderPatch) -> StorageResult<()>;
}

/// Review persistence (read-only)
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn list_reviews(&self) -> StorageResult<Vec<ReviewRecord>>;
}
