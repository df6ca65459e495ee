//! Interceptor chain wrapped around every RPC
//!
//! An [`InterceptorChain`] is an explicit ordered list of [`Interceptor`]s.
//! The driver walks the list around a terminal handler: each interceptor
//! receives the [`Call`] and a [`Next`] cursor, may act before and after
//! `next.run(call)`, and annotates rather than rewrites the result.
//!
//! ```text
//! metrics → tracing → logging → auth → panic guard → handler
//! ```
//!
//! Request and response messages travel type-erased as `Box<dyn Payload>`
//! so the chain is written once for every method.

pub mod auth;
pub mod logging;
pub mod metrics;
pub mod panic;
pub mod tracing;

pub use self::auth::AuthInterceptor;
pub use self::logging::LoggingInterceptor;
pub use self::metrics::MetricsInterceptor;
pub use self::panic::PanicGuard;
pub use self::tracing::{TraceId, TracingInterceptor};

use crate::core::error::ApiError;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;
use tonic::metadata::MetadataMap;
use tonic::{Extensions, Status};

/// Metadata key the JSON gateway sets on every call it forwards
pub const GATEWAY_MARKER: &str = "grpcgateway-user-agent";

/// Method label used when a full method name has no usable short form
pub const UNKNOWN_METHOD: &str = "unknown";

/// A request or response message moving through the chain
pub trait Payload: Debug + Send + 'static {
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

impl<T: prost::Message + Debug + 'static> Payload for T {
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

/// Recover the concrete message type behind a payload
pub fn downcast<T: 'static>(payload: Box<dyn Payload>) -> Result<T, Status> {
    payload
        .into_any()
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| {
            ApiError::Unknown {
                message: format!("unexpected payload type, wanted {}", std::any::type_name::<T>()),
            }
            .into_status()
        })
}

/// What the chain returns: a response payload or a wire status
pub type CallResult = Result<Box<dyn Payload>, Status>;

/// Terminal handler invoked once every interceptor has passed the call on
pub type Handler = dyn Fn(Call) -> BoxFuture<'static, CallResult> + Send + Sync;

/// One RPC invocation in flight
#[derive(Debug)]
pub struct Call {
    /// Fully-qualified method, `/package.Service/Method`
    pub method: String,
    pub metadata: MetadataMap,
    /// Per-call values set by interceptors (trace id, auth context)
    pub extensions: Extensions,
    pub payload: Box<dyn Payload>,
}

impl Call {
    pub fn new(method: impl Into<String>, metadata: MetadataMap, payload: Box<dyn Payload>) -> Self {
        Self {
            method: method.into(),
            metadata,
            extensions: Extensions::new(),
            payload,
        }
    }

    /// Text after the last `/` of the method, or `"unknown"`
    pub fn short_method(&self) -> &str {
        short_method(&self.method)
    }

    /// `"http"` when forwarded by the gateway, `"grpc"` otherwise
    pub fn protocol(&self) -> &'static str {
        if self.metadata.contains_key(GATEWAY_MARKER) {
            "http"
        } else {
            "grpc"
        }
    }
}

pub fn short_method(method: &str) -> &str {
    match method.rsplit_once('/') {
        Some((_, short)) if !short.is_empty() => short,
        _ => UNKNOWN_METHOD,
    }
}

/// A middleware wrapped around one RPC invocation
#[async_trait]
pub trait Interceptor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn invoke(&self, call: Call, next: Next<'_>) -> CallResult;
}

/// Cursor over the interceptors that have not run yet
pub struct Next<'a> {
    rest: &'a [Arc<dyn Interceptor>],
    handler: &'a Handler,
}

impl<'a> Next<'a> {
    /// Pass the call to the next interceptor, or to the handler at the end
    pub fn run(self, call: Call) -> BoxFuture<'a, CallResult> {
        match self.rest.split_first() {
            Some((current, rest)) => current.invoke(
                call,
                Next {
                    rest,
                    handler: self.handler,
                },
            ),
            // built inside the future so a panic while creating it is
            // still caught by an outer guard
            None => {
                let handler = self.handler;
                Box::pin(async move { handler(call).await })
            }
        }
    }
}

/// Ordered interceptor list
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an interceptor; it runs after every one added before it
    pub fn with(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    pub async fn run(&self, call: Call, handler: &Handler) -> CallResult {
        Next {
            rest: &self.interceptors,
            handler,
        }
        .run(call)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::exposure::grpc::proto::GetOrderRequest;
    use std::sync::Mutex;

    struct Recorder {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Interceptor for Recorder {
        fn name(&self) -> &'static str {
            self.label
        }

        async fn invoke(&self, call: Call, next: Next<'_>) -> CallResult {
            self.log.lock().unwrap().push(format!("{} before", self.label));
            let result = next.run(call).await;
            self.log.lock().unwrap().push(format!("{} after", self.label));
            result
        }
    }

    fn echo() -> Box<Handler> {
        Box::new(|call: Call| -> BoxFuture<'static, CallResult> {
            Box::pin(async move { Ok(call.payload) })
        })
    }

    #[tokio::test]
    async fn test_interceptors_wrap_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = InterceptorChain::new()
            .with(Recorder {
                label: "outer",
                log: log.clone(),
            })
            .with(Recorder {
                label: "inner",
                log: log.clone(),
            });
        assert_eq!(chain.names(), vec!["outer", "inner"]);

        let call = Call::new(
            "/moving.v1.MovingService/GetOrder",
            MetadataMap::new(),
            Box::new(GetOrderRequest { id: 5 }),
        );
        let payload = chain.run(call, &*echo()).await.unwrap();
        let request: GetOrderRequest = downcast(payload).unwrap();
        assert_eq!(request.id, 5);

        assert_eq!(
            *log.lock().unwrap(),
            vec!["outer before", "inner before", "inner after", "outer after"]
        );
    }

    #[tokio::test]
    async fn test_empty_chain_calls_handler() {
        let call = Call::new("/x/Y", MetadataMap::new(), Box::new(GetOrderRequest { id: 1 }));
        assert!(InterceptorChain::new().run(call, &*echo()).await.is_ok());
    }

    #[test]
    fn test_downcast_mismatch_is_status() {
        let status = downcast::<()>(Box::new(GetOrderRequest { id: 1 })).unwrap_err();
        assert_eq!(status.code(), tonic::Code::Unknown);
    }

    #[test]
    fn test_short_method() {
        assert_eq!(short_method("/moving.v1.MovingService/ListOrders"), "ListOrders");
        assert_eq!(short_method("ListOrders"), UNKNOWN_METHOD);
        assert_eq!(short_method("/svc/"), UNKNOWN_METHOD);
    }

    #[test]
    fn test_protocol_from_marker() {
        let mut metadata = MetadataMap::new();
        let call = Call::new("/a/B", metadata.clone(), Box::new(()));
        assert_eq!(call.protocol(), "grpc");

        metadata.insert(GATEWAY_MARKER, "gateway".parse().unwrap());
        let call = Call::new("/a/B", metadata, Box::new(()));
        assert_eq!(call.protocol(), "http");
    }
}
