//! Server: interceptor chain, exposures and their wiring
//!
//! - `interceptors`: the middleware chain every RPC passes through
//! - `exposure`: native gRPC and the JSON/HTTP gateway, sharing one port
//! - `metrics`: the Prometheus endpoint on its own port
//! - `builder`: assembles the above and serves with graceful shutdown

pub mod builder;
pub mod exposure;
pub mod host;
pub mod interceptors;
pub mod metrics;

pub use builder::{ServerBuilder, shutdown_signal, standard_chain};
pub use exposure::{GatewayExposure, GrpcExposure};
pub use host::ServerHost;
pub use metrics::MetricsServer;
