//! Domain services
//!
//! Thin orchestration between the transport and storage layers. The service
//! traits are the seam the transport depends on; [`orders::Orders`] and
//! [`reviews::Reviews`] are the store-backed implementations.

pub mod orders;
pub mod reviews;

pub use orders::{CreateOrder, Order, OrderFilter, Orders, UpdateOrder};
pub use reviews::{Review, Reviews};

use crate::core::error::ServiceResult;
use async_trait::async_trait;

/// Order operations
#[async_trait]
pub trait OrderService: Send + Sync {
    async fn create_order(&self, request: CreateOrder) -> ServiceResult<Order>;

    /// `None` (or an all-empty filter) lists every order
    async fn list_orders(&self, filter: Option<OrderFilter>) -> ServiceResult<Vec<Order>>;

    async fn get_order(&self, id: u64) -> ServiceResult<Order>;

    async fn update_order(&self, request: UpdateOrder) -> ServiceResult<()>;
}

/// Review operations
#[async_trait]
pub trait ReviewService: Send + Sync {
    async fn list_reviews(&self) -> ServiceResult<Vec<Review>>;
}
