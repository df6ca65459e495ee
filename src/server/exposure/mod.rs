//! API exposures
//!
//! Each exposure consumes a `ServerHost` and produces a router for its
//! protocol. Both are merged onto one port by the server builder.

pub mod gateway;
pub mod grpc;

pub use gateway::GatewayExposure;
pub use grpc::GrpcExposure;
