//! ServerBuilder: wires services, interceptors and exposures into one
//! multiplexed router and serves it with graceful shutdown

use super::exposure::grpc::{self, GrpcExposure};
use super::exposure::GatewayExposure;
use super::host::ServerHost;
use super::interceptors::{
    AuthInterceptor, InterceptorChain, LoggingInterceptor, MetricsInterceptor, PanicGuard,
    TracingInterceptor,
};
use crate::config::AppConfig;
use crate::core::auth::TokenPools;
use crate::services::{OrderService, ReviewService};
use anyhow::Result;
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tonic_health::server::HealthReporter;

/// The fixed interceptor order:
/// metrics → tracing → logging → auth → panic guard → handler
pub fn standard_chain(config: &AppConfig) -> InterceptorChain {
    let pools = TokenPools::new(
        config.auth.admin_tokens.clone(),
        config.auth.client_tokens.clone(),
    );

    InterceptorChain::new()
        .with(MetricsInterceptor::new(
            &config.service.name,
            config.metrics.enabled,
        ))
        .with(TracingInterceptor::new(
            &config.service.name,
            config.tracing.enabled,
        ))
        .with(LoggingInterceptor::new(config.service.debug))
        .with(AuthInterceptor::new(Arc::new(pools)))
        .with(PanicGuard::new())
}

/// Builder for the order service server
///
/// # Example
///
/// ```ignore
/// ServerBuilder::new(&config.service.name)
///     .with_order_service(orders)
///     .with_review_service(reviews)
///     .with_chain(standard_chain(&config))
///     .serve(config.listen_addr()?)
///     .await?;
/// ```
pub struct ServerBuilder {
    service_name: String,
    orders: Option<Arc<dyn OrderService>>,
    reviews: Option<Arc<dyn ReviewService>>,
    chain: InterceptorChain,
    cors_enabled: bool,
}

impl ServerBuilder {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            orders: None,
            reviews: None,
            chain: InterceptorChain::new(),
            cors_enabled: false,
        }
    }

    /// Set the order service (required)
    pub fn with_order_service(mut self, service: Arc<dyn OrderService>) -> Self {
        self.orders = Some(service);
        self
    }

    /// Set the review service (required)
    pub fn with_review_service(mut self, service: Arc<dyn ReviewService>) -> Self {
        self.reviews = Some(service);
        self
    }

    pub fn with_chain(mut self, chain: InterceptorChain) -> Self {
        self.chain = chain;
        self
    }

    /// Answer CORS preflight permissively on the gateway
    pub fn with_cors(mut self, enabled: bool) -> Self {
        self.cors_enabled = enabled;
        self
    }

    /// Build the transport-agnostic host
    pub fn build_host(self) -> Result<ServerHost> {
        let orders = self
            .orders
            .ok_or_else(|| anyhow::anyhow!("OrderService is required. Call .with_order_service()"))?;
        let reviews = self.reviews.ok_or_else(|| {
            anyhow::anyhow!("ReviewService is required. Call .with_review_service()")
        })?;

        Ok(ServerHost::new(self.service_name, orders, reviews).with_chain(self.chain))
    }

    /// Build the combined gRPC + gateway router and the health reporter of
    /// its health service
    pub async fn build(self) -> Result<(Router, HealthReporter)> {
        let cors_enabled = self.cors_enabled;
        let host = Arc::new(self.build_host()?);

        let (grpc_router, reporter) = GrpcExposure::build_router(host.clone()).await?;
        let app = GatewayExposure::build_router(host).merge(grpc_router);

        Ok((GatewayExposure::apply_http_layers(app, cors_enabled), reporter))
    }

    /// Serve on `addr` until SIGINT or SIGTERM
    pub async fn serve(self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve_with_shutdown(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    ///
    /// Once `shutdown` fires, health checks report not-serving, the listener
    /// stops accepting and in-flight calls are drained before this returns.
    pub async fn serve_with_shutdown<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let service_name = self.service_name.clone();
        let (app, reporter) = self.build().await?;

        tracing::info!(
            service = %service_name,
            addr = %listener.local_addr()?,
            "server listening (gRPC + gateway)"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                grpc::mark_not_serving(&reporter, &service_name).await;
                tracing::info!("health set to not serving, draining in-flight calls");
            })
            .await?;

        tracing::info!("server shutdown complete");
        Ok(())
    }
}

/// Resolves on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("received SIGTERM, initiating graceful shutdown");
        },
    }
}
