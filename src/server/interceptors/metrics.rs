//! Request duration and error metrics per call

use super::{Call, CallResult, Interceptor, Next};
use async_trait::async_trait;
use metrics::{Unit, counter, describe_counter, describe_histogram, histogram};
use std::sync::Once;
use std::time::Instant;
use tonic::Code;

pub const REQUEST_DURATION: &str = "rpc_request_duration_seconds";
pub const REQUEST_ERRORS: &str = "rpc_request_errors_total";

static DESCRIBE: Once = Once::new();

fn describe() {
    DESCRIBE.call_once(|| {
        describe_histogram!(
            REQUEST_DURATION,
            Unit::Seconds,
            "Time spent serving one RPC, labelled by service, subsystem, method and code"
        );
        describe_counter!(REQUEST_ERRORS, "RPCs that finished with a non-OK code");
    });
}

/// Records a duration histogram and an error counter per call
///
/// When disabled it is a single-branch pass-through.
pub struct MetricsInterceptor {
    service: String,
    enabled: bool,
}

impl MetricsInterceptor {
    pub fn new(service: &str, enabled: bool) -> Self {
        if enabled {
            describe();
        }
        Self {
            service: service.replace('-', "_"),
            enabled,
        }
    }
}

/// Code label for a call result
pub fn code_label(result: &CallResult) -> String {
    let code = match result {
        Ok(_) => Code::Ok,
        Err(status) => status.code(),
    };
    format!("{:?}", code)
}

#[async_trait]
impl Interceptor for MetricsInterceptor {
    fn name(&self) -> &'static str {
        "metrics"
    }

    async fn invoke(&self, call: Call, next: Next<'_>) -> CallResult {
        if !self.enabled {
            return next.run(call).await;
        }

        let subsystem = call.protocol();
        let method = call.short_method().to_string();
        let started = Instant::now();

        let result = next.run(call).await;

        let labels = [
            ("service", self.service.clone()),
            ("subsystem", subsystem.to_string()),
            ("method", method),
            ("code", code_label(&result)),
        ];
        histogram!(REQUEST_DURATION, &labels).record(started.elapsed().as_secs_f64());
        if result.is_err() {
            counter!(REQUEST_ERRORS, &labels).increment(1);
        }

        result
    }
}
