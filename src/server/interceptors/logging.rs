//! One structured log line per call

use super::tracing::TraceId;
use super::{Call, CallResult, Interceptor, Next};
use async_trait::async_trait;
use std::time::Instant;
use tonic::Code;

pub struct LoggingInterceptor {
    /// Log request and response payloads
    debug: bool,
}

impl LoggingInterceptor {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }
}

#[async_trait]
impl Interceptor for LoggingInterceptor {
    fn name(&self) -> &'static str {
        "logging"
    }

    async fn invoke(&self, call: Call, next: Next<'_>) -> CallResult {
        let method = call.method.clone();
        let protocol = call.protocol();
        let trace_id = call
            .extensions
            .get::<TraceId>()
            .map(|t| t.as_str().to_string());

        if self.debug {
            tracing::debug!(
                method = %method,
                trace_id = trace_id.as_deref(),
                request = ?call.payload,
                "rpc request"
            );
        }

        let started = Instant::now();
        let result = next.run(call).await;
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(response) => {
                if self.debug {
                    tracing::debug!(
                        method = %method,
                        trace_id = trace_id.as_deref(),
                        response = ?response,
                        "rpc response"
                    );
                }
                tracing::info!(
                    method = %method,
                    protocol,
                    duration_ms,
                    status = ?Code::Ok,
                    trace_id = trace_id.as_deref(),
                    "rpc finished"
                );
            }
            Err(status) => {
                tracing::info!(
                    method = %method,
                    protocol,
                    duration_ms,
                    status = ?status.code(),
                    error = %status.message(),
                    trace_id = trace_id.as_deref(),
                    "rpc finished"
                );
            }
        }

        result
    }
}
