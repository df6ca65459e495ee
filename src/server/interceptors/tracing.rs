//! Per-call span and trace id propagation

use super::{Call, CallResult, Interceptor, Next};
use async_trait::async_trait;
use tracing::Instrument;
use uuid::Uuid;

/// W3C trace context header
pub const TRACEPARENT: &str = "traceparent";

/// Trace id of the current call, stored in the call extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceId(String);

impl TraceId {
    pub fn generate() -> Self {
        TraceId(Uuid::new_v4().simple().to_string())
    }

    /// Trace id carried by a `traceparent` value, if well-formed
    ///
    /// `version-traceid-parentid-flags`, with a 32 hex digit, non-zero trace id.
    pub fn from_traceparent(value: &str) -> Option<Self> {
        let mut parts = value.trim().split('-');
        let _version = parts.next()?;
        let trace_id = parts.next()?;
        let _parent = parts.next()?;
        let _flags = parts.next()?;

        let valid = trace_id.len() == 32
            && trace_id.bytes().all(|b| b.is_ascii_hexdigit())
            && trace_id.bytes().any(|b| b != b'0');
        valid.then(|| TraceId(trace_id.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opens one span per call and records the terminal code on it
pub struct TracingInterceptor {
    service: String,
    enabled: bool,
}

impl TracingInterceptor {
    pub fn new(service: &str, enabled: bool) -> Self {
        Self {
            service: service.to_string(),
            enabled,
        }
    }
}

#[async_trait]
impl Interceptor for TracingInterceptor {
    fn name(&self) -> &'static str {
        "tracing"
    }

    async fn invoke(&self, mut call: Call, next: Next<'_>) -> CallResult {
        if !self.enabled {
            return next.run(call).await;
        }

        let trace_id = call
            .metadata
            .get(TRACEPARENT)
            .and_then(|v| v.to_str().ok())
            .and_then(TraceId::from_traceparent)
            .unwrap_or_else(TraceId::generate);

        let span = tracing::info_span!(
            "rpc",
            otel.name = %call.method,
            service = %self.service,
            trace_id = %trace_id.as_str(),
            code = tracing::field::Empty,
            error = tracing::field::Empty,
        );
        call.extensions.insert(trace_id);

        let result = next.run(call).instrument(span.clone()).await;

        match &result {
            Ok(_) => {
                span.record("code", "Ok");
            }
            Err(status) => {
                span.record("code", tracing::field::debug(status.code()));
                span.record("error", status.message());
            }
        }

        result
    }
}
