//! # moving-orders
//!
//! Order management backend for a moving company, served over gRPC and a
//! JSON/HTTP gateway on one port.
//!
//! ## Layers
//!
//! ```text
//! wire request ─▶ interceptor chain ─▶ transport mapping ─▶ service ─▶ store
//!                 metrics → tracing → logging → auth → panic guard
//! ```
//!
//! - [`storage`]: record types, the [`OrderStore`](storage::OrderStore) and
//!   [`ReviewStore`](storage::ReviewStore) traits, in-memory and Postgres
//!   backends, the reviews snapshot cache
//! - [`services`]: thin orchestration with its own DTOs
//! - [`server`]: interceptors, the gRPC service, the gateway, wiring
//! - [`notify`]: new-order notifications off the request path
//! - [`config`]: environment and YAML configuration
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use moving::prelude::*;
//!
//! let config = AppConfig::load()?;
//! let orders = Orders::new(Arc::new(InMemoryOrderStore::new()));
//! let reviews = Reviews::new(Arc::new(ReviewCache::new(InMemoryReviewStore::new(vec![]))));
//!
//! ServerBuilder::new(&config.service.name)
//!     .with_order_service(Arc::new(orders))
//!     .with_review_service(Arc::new(reviews))
//!     .with_chain(standard_chain(&config))
//!     .serve(config.listen_addr()?)
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod notify;
pub mod server;
pub mod services;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        auth::{AccessPolicy, AuthContext, TokenPools},
        error::{ApiError, ServiceError, StorageError},
        events::{EventBus, OrderEvent},
        status::{OrderStatus, PropertySize},
    };

    // === Storage ===
    pub use crate::storage::{
        EmptyListPolicy, InMemoryOrderStore, InMemoryReviewStore, OrderStore, ReviewCache,
        ReviewStore,
    };
    #[cfg(feature = "postgres")]
    pub use crate::storage::{PostgresOrderStore, PostgresReviewStore, ensure_schema};

    // === Services ===
    pub use crate::services::{
        CreateOrder, Order, OrderFilter, OrderService, Orders, Review, ReviewService, Reviews,
        UpdateOrder,
    };

    // === Server ===
    pub use crate::server::{
        MetricsServer, ServerBuilder, ServerHost, shutdown_signal, standard_chain,
    };
    pub use crate::server::exposure::grpc::proto;

    // === Notifications ===
    pub use crate::notify::{NoopNotifier, NotificationSink, OrderNotifier};
    #[cfg(feature = "telegram")]
    pub use crate::notify::TelegramNotifier;

    // === Config ===
    pub use crate::config::AppConfig;

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, NaiveDate, Utc};
    pub use std::sync::Arc;
}
