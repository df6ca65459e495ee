//! Panic containment around the handler
//!
//! A panicking handler is turned into an opaque `PanicHandled` status; the
//! message and backtrace go to the log and a per-method counter is bumped.
//! The worker keeps serving.

use super::{Call, CallResult, Interceptor, Next};
use crate::core::error::ApiError;
use async_trait::async_trait;
use futures::FutureExt;
use metrics::{counter, describe_counter};
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

pub const PANICS_COUNT: &str = "panics_count";

static INSTALL_HOOK: Once = Once::new();

thread_local! {
    static LAST_BACKTRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Chain a hook in front of the existing one that keeps the backtrace of
/// the last panic on this thread
fn install_backtrace_hook() {
    INSTALL_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let backtrace = Backtrace::force_capture().to_string();
            LAST_BACKTRACE.with(|slot| *slot.borrow_mut() = Some(backtrace));
            previous(info);
        }));
        describe_counter!(PANICS_COUNT, "Handler panics recovered, by method");
    });
}

fn take_backtrace() -> String {
    LAST_BACKTRACE
        .with(|slot| slot.borrow_mut().take())
        .unwrap_or_else(|| "<unavailable>".to_string())
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "<non-string panic payload>"
    }
}

pub struct PanicGuard;

impl PanicGuard {
    pub fn new() -> Self {
        install_backtrace_hook();
        PanicGuard
    }
}

impl Default for PanicGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Interceptor for PanicGuard {
    fn name(&self) -> &'static str {
        "panic"
    }

    async fn invoke(&self, call: Call, next: Next<'_>) -> CallResult {
        let method = call.method.clone();
        let short_method = call.short_method().to_string();

        match AssertUnwindSafe(next.run(call)).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => {
                let backtrace = take_backtrace();
                tracing::warn!(
                    method = %method,
                    panic = panic_message(payload.as_ref()),
                    backtrace = %backtrace,
                    "panic handled"
                );
                counter!(PANICS_COUNT, "method" => short_method).increment(1);
                Err(ApiError::PanicHandled.into_status())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::interceptors::InterceptorChain;
    use futures::future::BoxFuture;
    use tonic::Code;
    use tonic::metadata::MetadataMap;
    use tonic_types::StatusExt;

    #[tokio::test]
    async fn test_panic_becomes_status_and_chain_survives() {
        let chain = InterceptorChain::new().with(PanicGuard::new());
        let handler = |call: Call| -> BoxFuture<'static, CallResult> {
            Box::pin(async move {
                if call.method.ends_with("Boom") {
                    panic!("handler exploded");
                }
                Ok(call.payload)
            })
        };

        let status = chain
            .run(Call::new("/a/Boom", MetadataMap::new(), Box::new(())), &handler)
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::Unknown);
        assert_eq!(status.get_details_error_info().unwrap().reason, "PANIC_HANDLED");
        assert!(!status.message().contains("exploded"));

        let next = chain
            .run(Call::new("/a/Fine", MetadataMap::new(), Box::new(())), &handler)
            .await;
        assert!(next.is_ok());
    }

    #[tokio::test]
    async fn test_panic_while_building_future_is_contained() {
        let chain = InterceptorChain::new().with(PanicGuard::new());
        let handler = |call: Call| -> BoxFuture<'static, CallResult> {
            if call.method.ends_with("Eager") {
                panic!("failed before any future existed");
            }
            Box::pin(async move { Ok(call.payload) })
        };

        let status = chain
            .run(Call::new("/a/Eager", MetadataMap::new(), Box::new(())), &handler)
            .await
            .unwrap_err();
        assert_eq!(status.get_details_error_info().unwrap().reason, "PANIC_HANDLED");
    }

    #[tokio::test]
    async fn test_panic_counter_uses_short_method() {
        let handle = crate::server::metrics::install_recorder().unwrap();
        let chain = InterceptorChain::new().with(PanicGuard::new());
        let handler = |_: Call| -> BoxFuture<'static, CallResult> {
            Box::pin(async move { panic!("boom") })
        };

        let call = Call::new(
            "/moving.v1.MovingService/ExplodingMethod",
            MetadataMap::new(),
            Box::new(()),
        );
        assert!(chain.run(call, &handler).await.is_err());

        let rendered = handle.render();
        assert!(rendered.contains(r#"panics_count{method="ExplodingMethod"}"#));
        assert!(!rendered.contains("/moving.v1.MovingService/ExplodingMethod"));
    }

    #[test]
    fn test_panic_message_extraction() {
        let owned: Box<dyn Any + Send> = Box::new("boom".to_string());
        assert_eq!(panic_message(owned.as_ref()), "boom");
        let borrowed: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(borrowed.as_ref()), "static");
        let other: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(other.as_ref()), "<non-string panic payload>");
    }
}
