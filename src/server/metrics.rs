//! Prometheus exposition on a separate port
//!
//! The recorder is process-wide and installed at most once. When metrics are
//! disabled the server reports itself as "not operational" and binds
//! nothing.

use anyhow::Result;
use axum::{Router, extract::State, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Mutex;

pub const PROMETHEUS: &str = "prometheus";
pub const NOT_OPERATIONAL: &str = "not operational";

static METRICS_HANDLE: Mutex<Option<PrometheusHandle>> = Mutex::new(None);

/// Install the global Prometheus recorder, or return the installed one
///
/// The lock is held across the install so concurrent first callers never
/// race into a second `install_recorder`.
pub fn install_recorder() -> Result<PrometheusHandle> {
    let mut slot = METRICS_HANDLE
        .lock()
        .map_err(|_| anyhow::anyhow!("metrics recorder lock poisoned"))?;
    if let Some(handle) = slot.as_ref() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new().install_recorder()?;
    *slot = Some(handle.clone());
    Ok(handle)
}

pub struct MetricsServer {
    addr: SocketAddr,
    handle: Option<PrometheusHandle>,
}

impl MetricsServer {
    /// An enabled server installs the recorder immediately so metrics
    /// recorded before `serve` are kept
    pub fn new(enabled: bool, addr: SocketAddr) -> Result<Self> {
        let handle = if enabled {
            Some(install_recorder()?)
        } else {
            None
        };
        Ok(Self { addr, handle })
    }

    pub fn name(&self) -> &'static str {
        if self.handle.is_some() {
            PROMETHEUS
        } else {
            NOT_OPERATIONAL
        }
    }

    /// `/metrics` route, `None` when disabled
    pub fn router(&self) -> Option<Router> {
        let handle = self.handle.clone()?;
        Some(
            Router::new()
                .route("/metrics", get(render))
                .with_state(handle),
        )
    }

    /// Serve until `shutdown` resolves. Returns at once when disabled.
    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Some(router) = self.router() else {
            tracing::info!(server = self.name(), "metrics server disabled");
            return Ok(());
        };

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!(server = self.name(), addr = %self.addr, "metrics server listening");
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

async fn render(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_server_binds_nothing() {
        let server = MetricsServer::new(false, SocketAddr::from(([127, 0, 0, 1], 1))).unwrap();
        assert_eq!(server.name(), NOT_OPERATIONAL);
        assert!(server.router().is_none());
        // port 1 would fail to bind; a disabled server never tries
        server.serve(async {}).await.unwrap();
    }

    #[test]
    fn test_enabled_server_identity() {
        let server = MetricsServer::new(true, SocketAddr::from(([127, 0, 0, 1], 0))).unwrap();
        assert_eq!(server.name(), PROMETHEUS);
        assert!(server.router().is_some());
        // a second install reuses the recorder
        assert!(install_recorder().is_ok());
    }

    #[test]
    fn test_concurrent_installs_share_one_recorder() {
        let installers: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(install_recorder))
            .collect();
        for installer in installers {
            assert!(installer.join().unwrap().is_ok());
        }
    }
}
