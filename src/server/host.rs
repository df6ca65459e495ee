//! Server host for transport-agnostic API exposure
//!
//! `ServerHost` holds everything an exposure needs to serve a call: the
//! domain services and the interceptor chain every RPC passes through. The
//! gRPC service and the JSON gateway both consume the same
//! host, so a call behaves identically whichever way it arrives.

use crate::server::interceptors::InterceptorChain;
use crate::services::{OrderService, ReviewService};
use std::sync::Arc;

pub struct ServerHost {
    /// Service name used for metrics, tracing and health reporting
    pub service_name: String,

    pub orders: Arc<dyn OrderService>,

    pub reviews: Arc<dyn ReviewService>,

    /// Applied around every RPC, in order
    pub chain: InterceptorChain,
}

impl ServerHost {
    pub fn new(
        service_name: impl Into<String>,
        orders: Arc<dyn OrderService>,
        reviews: Arc<dyn ReviewService>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            orders,
            reviews,
            chain: InterceptorChain::new(),
        }
    }

    pub fn with_chain(mut self, chain: InterceptorChain) -> Self {
        self.chain = chain;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::interceptors::PanicGuard;
    use crate::services::{Orders, Reviews};
    use crate::storage::{InMemoryOrderStore, InMemoryReviewStore};

    fn make_host() -> ServerHost {
        ServerHost::new(
            "moving-service",
            Arc::new(Orders::new(Arc::new(InMemoryOrderStore::new()))),
            Arc::new(Reviews::new(Arc::new(InMemoryReviewStore::new(vec![])))),
        )
    }

    #[test]
    fn test_new_host_has_empty_chain() {
        let host = make_host();
        assert_eq!(host.service_name, "moving-service");
        assert!(host.chain.names().is_empty());
    }

    #[test]
    fn test_with_chain() {
        let host = make_host().with_chain(InterceptorChain::new().with(PanicGuard::new()));
        assert_eq!(host.chain.names(), vec!["panic"]);
    }
}
