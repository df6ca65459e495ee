//! Internal event bus for order notifications
//!
//! Mutations publish onto a `tokio::sync::broadcast` channel and the
//! notification sink consumes from it on its own task, so a slow or failing
//! chat transport never sits on the CreateOrder critical path.
//!
//! ```text
//! Orders::create_order ──▶ EventBus::publish() ──▶ broadcast ──▶ NotificationSink
//! ```

use crate::services::orders::Order;
use tokio::sync::broadcast;

/// Order lifecycle events
#[derive(Debug, Clone)]
pub enum OrderEvent {
    /// An order was stored successfully
    Created(Order),
}

impl OrderEvent {
    pub fn order_id(&self) -> u64 {
        match self {
            OrderEvent::Created(order) => order.id,
        }
    }
}

/// Broadcast-based event bus
///
/// Cheap to clone; every clone publishes into the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<OrderEvent>,
}

impl EventBus {
    /// `capacity` bounds how far a slow subscriber may fall behind before it
    /// starts receiving `Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Fire-and-forget publish. Returns the number of receivers reached.
    pub fn publish(&self, event: OrderEvent) -> usize {
        // send() only fails when nobody is subscribed
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
