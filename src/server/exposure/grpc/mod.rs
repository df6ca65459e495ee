//! gRPC API exposure
//!
//! Serves `moving.v1.MovingService` together with the standard health and
//! reflection services. All three are mounted on an axum router through
//! tonic's `Routes`, so they share the port with the JSON gateway.

pub mod convert;
pub mod service;
pub mod validation;

pub mod proto {
    tonic::include_proto!("moving.v1");

    /// Encoded descriptor set, registered with the reflection service
    pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("moving_descriptor");
}

pub use service::MovingServiceImpl;

use crate::server::host::ServerHost;
use anyhow::Result;
use axum::Router;
use proto::moving_service_server::MovingServiceServer;
use std::sync::Arc;
use tonic_health::server::HealthReporter;

/// Fully-qualified name of the order service, as reported by health checks
pub const SERVICE_NAME: &str = "moving.v1.MovingService";

pub struct GrpcExposure;

impl GrpcExposure {
    /// Build the gRPC router and a reporter for the health service mounted
    /// in it. Both the configured service name and [`SERVICE_NAME`] start
    /// out as serving.
    pub async fn build_router(host: Arc<ServerHost>) -> Result<(Router, HealthReporter)> {
        use tonic::service::Routes;

        let (reporter, health_service) = tonic_health::server::health_reporter();
        reporter
            .set_serving::<MovingServiceServer<MovingServiceImpl>>()
            .await;
        reporter
            .set_service_status(
                host.service_name.as_str(),
                tonic_health::ServingStatus::Serving,
            )
            .await;

        let reflection = tonic_reflection::server::Builder::configure()
            .register_encoded_file_descriptor_set(proto::FILE_DESCRIPTOR_SET)
            .build_v1()?;

        let mut builder = Routes::builder();
        builder.add_service(MovingServiceServer::new(MovingServiceImpl::new(host)));
        builder.add_service(health_service);
        builder.add_service(reflection);

        Ok((builder.routes().into_axum_router(), reporter))
    }
}

/// Flip every health entry to not-serving; called when shutdown begins
pub async fn mark_not_serving(reporter: &HealthReporter, service_name: &str) {
    reporter
        .set_not_serving::<MovingServiceServer<MovingServiceImpl>>()
        .await;
    reporter
        .set_service_status(service_name, tonic_health::ServingStatus::NotServing)
        .await;
}
