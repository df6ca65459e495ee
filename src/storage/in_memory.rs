//! In-memory order and review stores for tests and local runs

use super::{
    EmptyListPolicy, NewOrderRecord, OrderPatch, OrderQuery, OrderRecord, OrderStore,
    ReviewRecord, ReviewStore, check_update,
};
use crate::core::error::{StorageError, StorageResult};
use crate::core::status::OrderStatus;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// In-memory order store
///
/// Ids come from a monotonically increasing counter and are never reused.
#[derive(Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<BTreeMap<u64, OrderRecord>>>,
    next_id: Arc<AtomicU64>,
    empty_list: EmptyListPolicy,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::with_policy(EmptyListPolicy::default())
    }

    pub fn with_policy(empty_list: EmptyListPolicy) -> Self {
        Self {
            orders: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            empty_list,
        }
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create_order(&self, order: NewOrderRecord) -> StorageResult<OrderRecord> {
        let mut orders = self
            .orders
            .write()
            .map_err(|e| StorageError::backend("acquire write lock", e.to_string()))?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let record = OrderRecord {
            id,
            name: order.name,
            email: order.email,
            phone: order.phone,
            move_date: order.move_date,
            move_from: order.move_from,
            move_to: order.move_to,
            property_size: order.property_size,
            status: OrderStatus::Created,
            additional_info: order.additional_info,
            created_at: now,
            updated_at: now,
        };
        orders.insert(id, record.clone());

        Ok(record)
    }

    async fn list_orders(&self, query: Option<&OrderQuery>) -> StorageResult<Vec<OrderRecord>> {
        let orders = self
            .orders
            .read()
            .map_err(|e| StorageError::backend("acquire read lock", e.to_string()))?;

        let mut rows: Vec<OrderRecord> = orders
            .values()
            .filter(|record| query.is_none_or(|q| q.matches(record)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        self.empty_list.apply(rows)
    }

    async fn get_order(&self, id: u64) -> StorageResult<OrderRecord> {
        let orders = self
            .orders
            .read()
            .map_err(|e| StorageError::backend("acquire read lock", e.to_string()))?;

        orders.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn update_order(&self, id: u64, patch: OrderPatch) -> StorageResult<()> {
        check_update(id, &patch)?;

        let mut orders = self
            .orders
            .write()
            .map_err(|e| StorageError::backend("acquire write lock", e.to_string()))?;

        let record = orders.get_mut(&id).ok_or(StorageError::NotFound)?;
        let previous = record.updated_at;
        patch.apply_to(record);
        record.updated_at = Utc::now().max(previous + Duration::microseconds(1));

        Ok(())
    }
}

/// In-memory review store, seeded up front
#[derive(Clone, Default)]
pub struct InMemoryReviewStore {
    reviews: Arc<RwLock<Vec<ReviewRecord>>>,
    empty_list: EmptyListPolicy,
}

impl InMemoryReviewStore {
    pub fn new(reviews: Vec<ReviewRecord>) -> Self {
        Self::with_policy(reviews, EmptyListPolicy::default())
    }

    pub fn with_policy(reviews: Vec<ReviewRecord>, empty_list: EmptyListPolicy) -> Self {
        Self {
            reviews: Arc::new(RwLock::new(reviews)),
            empty_list,
        }
    }

    /// Add a review; used to seed and to observe caching from tests
    pub fn push(&self, review: ReviewRecord) -> StorageResult<()> {
        self.reviews
            .write()
            .map_err(|e| StorageError::backend("acquire write lock", e.to_string()))?
            .push(review);
        Ok(())
    }
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn list_reviews(&self) -> StorageResult<Vec<ReviewRecord>> {
        let reviews = self
            .reviews
            .read()
            .map_err(|e| StorageError::backend("acquire read lock", e.to_string()))?;

        let mut rows = reviews.clone();
        rows.sort_by_key(|review| review.id);

        self.empty_list.apply(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tests::new_order;

    #[tokio::test]
    async fn test_create_forces_created_status() {
        let store = InMemoryOrderStore::new();
        let order = store.create_order(new_order("Ann")).await.unwrap();

        assert!(order.id > 0);
        assert_eq!(order.status, OrderStatus::Created);
        assert_eq!(order.created_at, order.updated_at);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused() {
        let store = InMemoryOrderStore::new();
        let a = store.create_order(new_order("A")).await.unwrap();
        let b = store.create_order(new_order("B")).await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn test_empty_list_is_not_found_by_default() {
        let store = InMemoryOrderStore::new();
        assert!(matches!(
            store.list_orders(None).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_empty_list_policy_can_be_switched() {
        let store = InMemoryOrderStore::with_policy(EmptyListPolicy::EmptyList);
        assert!(store.list_orders(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_bumps_updated_at() {
        let store = InMemoryOrderStore::new();
        let order = store.create_order(new_order("Ann")).await.unwrap();

        let patch = OrderPatch {
            status: Some(OrderStatus::Done),
            ..Default::default()
        };
        store.update_order(order.id, patch).await.unwrap();

        let updated = store.get_order(order.id).await.unwrap();
        assert_eq!(updated.status, OrderStatus::Done);
        assert!(updated.updated_at > order.updated_at);
        assert_eq!(updated.created_at, order.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_order() {
        let store = InMemoryOrderStore::new();
        let patch = OrderPatch {
            name: Some("X".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            store.update_order(42, patch).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_reviews_not_found_when_empty() {
        let store = InMemoryReviewStore::default();
        assert!(matches!(
            store.list_reviews().await,
            Err(StorageError::NotFound)
        ));
    }
}
