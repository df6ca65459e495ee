//! New-order notifications
//!
//! A [`NotificationSink`] task consumes the event bus and hands every
//! created order to an [`OrderNotifier`]. Delivery runs off the request
//! path; failures are logged by the notifier and never reach the caller.

#[cfg(feature = "telegram")]
pub mod telegram;

#[cfg(feature = "telegram")]
pub use telegram::TelegramNotifier;

use crate::core::events::{EventBus, OrderEvent};
use crate::services::Order;
use async_trait::async_trait;
use std::fmt::Write;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// One-way sink for new orders
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Deliver to every recipient; failures are logged, not returned
    async fn notify_new_order(&self, order: &Order);
}

/// Used when notifications are disabled
pub struct NoopNotifier;

#[async_trait]
impl OrderNotifier for NoopNotifier {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn notify_new_order(&self, _order: &Order) {}
}

pub struct NotificationSink;

impl NotificationSink {
    /// Subscribe to `bus` and forward created orders until the bus closes
    pub fn spawn(bus: &EventBus, notifier: Arc<dyn OrderNotifier>) -> JoinHandle<()> {
        let mut receiver = bus.subscribe();
        tracing::info!(notifier = notifier.name(), "notification sink started");

        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        tracing::debug!(order_id = event.order_id(), "forwarding order event");
                        match event {
                            OrderEvent::Created(order) => notifier.notify_new_order(&order).await,
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "notification sink lagged, events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            tracing::info!(notifier = notifier.name(), "notification sink stopped");
        })
    }
}

/// Escape text for HTML parse mode
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// HTML summary of a new order. Empty optional fields are left out.
pub fn format_order_message(order: &Order) -> String {
    let mut text = format!("<b>NEW ORDER</b> #{}\n\n", order.id);
    // writing to a String cannot fail
    let _ = writeln!(text, "<b>From:</b> {}", escape_html(&order.move_from));
    let _ = writeln!(text, "<b>To:</b> {}", escape_html(&order.move_to));
    let _ = writeln!(text, "<b>Date:</b> {}", order.move_date.format("%Y-%m-%d"));

    if !order.phone.is_empty() {
        let _ = writeln!(text, "<b>Phone:</b> {}", escape_html(&order.phone));
    }
    if let Some(email) = order.email.as_deref().filter(|e| !e.is_empty()) {
        let _ = writeln!(text, "<b>Email:</b> {}", escape_html(email));
    }
    if let Some(info) = order.additional_info.as_deref().filter(|i| !i.is_empty()) {
        let _ = write!(text, "\n<b>Description:</b>\n{}", escape_html(info));
    }

    text.trim_end_matches('\n').to_string()
}
