//! moving-orders server binary
//!
//! Startup: config → logging → Postgres pool + schema → services →
//! notification sink → metrics server → gRPC/gateway listener.
//! Shutdown: stop accepting and drain calls, stop the metrics server,
//! flush notifications, close the pool.

use anyhow::{Context, Result};
use moving::config::{AppConfig, LogFormat};
use moving::notify::{NoopNotifier, NotificationSink, OrderNotifier};
use moving::prelude::*;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    match config.log.format {
        LogFormat::Json => fmt.json().init(),
        LogFormat::Compact => fmt.compact().init(),
    }
}

fn build_notifier(config: &AppConfig) -> Result<Arc<dyn OrderNotifier>> {
    if !config.telegram.enabled {
        return Ok(Arc::new(NoopNotifier));
    }

    #[cfg(feature = "telegram")]
    {
        let notifier = TelegramNotifier::new(&config.telegram)
            .context("failed to create telegram notifier")?;
        Ok(Arc::new(notifier))
    }

    #[cfg(not(feature = "telegram"))]
    {
        tracing::warn!("telegram enabled in config but built without the telegram feature");
        Ok(Arc::new(NoopNotifier))
    }
}

/// Resolves once the shutdown flag is raised
async fn shutdown_requested(mut flag: watch::Receiver<bool>) {
    let _ = flag.wait_for(|stop| *stop).await;
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config);
    config.validate().context("invalid configuration")?;

    tracing::info!(
        service = %config.service.name,
        host = %config.service.host,
        "starting moving-orders"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.postgres.max_connections)
        .connect(&config.postgres.url)
        .await
        .context("failed to connect to postgres")?;
    ensure_schema(&pool)
        .await
        .context("failed to prepare database schema")?;

    let policy = config.orders.empty_list;
    let events = EventBus::default();
    // the order service owns the only sender from here on
    let orders = Orders::new(Arc::new(PostgresOrderStore::new(pool.clone(), policy)))
        .with_events(events);
    let reviews = Reviews::new(Arc::new(ReviewCache::new(PostgresReviewStore::new(
        pool.clone(),
        policy,
    ))));

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = stop_tx.send(true);
    });

    let metrics = MetricsServer::new(config.metrics.enabled, config.metrics_addr())?;
    tracing::info!(server = metrics.name(), "metrics server");
    let metrics_task = tokio::spawn(metrics.serve(shutdown_requested(stop_rx.clone())));

    let listener = tokio::net::TcpListener::bind(config.listen_addr()?)
        .await
        .context("failed to bind listener")?;

    ServerBuilder::new(&config.service.name)
        .with_order_service(Arc::new(orders))
        .with_review_service(Arc::new(reviews))
        .with_chain(standard_chain(&config))
        .with_cors(config.gateway.cors_enabled)
        .serve_with_shutdown(listener, shutdown_requested(stop_rx))
        .await?;

    metrics_task.await??;

    // the order service went away with the router; the sink drains and exits
    if tokio::time::timeout(Duration::from_secs(5), sink).await.is_err() {
        tracing::warn!("notification sink did not finish in time");
    }

    pool.close().await;
    tracing::info!("shutdown complete");
    Ok(())
}
