//! Core types shared by every layer: enum codecs, optional-field mapping,
//! the error taxonomy, token auth and the order event bus

pub mod auth;
pub mod error;
pub mod events;
pub mod optional;
pub mod status;

pub use auth::{AccessPolicy, AuthContext, AuthError, TokenPools};
pub use error::{ApiError, ConfigError, ServiceError, StorageError};
pub use events::{EventBus, OrderEvent};
pub use optional::{non_zero, non_zero_opt};
pub use status::{OrderStatus, PropertySize};
