use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

// The various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Restaurant events
    RestaurantRegistered(Uuid),
    RestaurantUpdated(Uuid),

    // Menu events
    MenuItemCreated(Uuid),
    MenuItemUpdated(Uuid),
    MenuItemDeleted(Uuid),

    // Order events
    OrderCreated(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },
    OrderCancelled(Uuid),
    OrderCompleted(Uuid),

    // Discount events
    DiscountRedeemed {
        order_id: Uuid,
        review_id: Uuid,
        code: String,
    },

    // Review events
    ReviewCreated {
        review_id: Uuid,
        order_id: Uuid,
        discount_code_issued: bool,
    },
}

// Drains the event channel and logs each event. Handlers that need to react
// to specific events (notifications, analytics) hang off this loop.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => {
                info!(
                    %order_id,
                    old_status,
                    new_status,
                    "order status changed"
                );
            }
            Event::DiscountRedeemed {
                order_id,
                review_id,
                code,
            } => {
                info!(%order_id, %review_id, code, "discount code redeemed");
            }
            Event::ReviewCreated {
                review_id,
                order_id,
                discount_code_issued,
            } => {
                info!(
                    %review_id,
                    %order_id,
                    discount_code_issued,
                    "review created"
                );
            }
            other => info!(event = ?other, "event received"),
        }
    }

    warn!("Event processing loop terminated: channel closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_sender_delivers_events() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        let order_id = Uuid::new_v4();
        sender.send(Event::OrderCreated(order_id)).await.unwrap();

        match rx.recv().await {
            Some(Event::OrderCreated(id)) => assert_eq!(id, order_id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn event_sender_errors_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let sender = EventSender::new(tx);
        let result = sender.send(Event::OrderCancelled(Uuid::new_v4())).await;
        assert!(result.is_err());
    }
}
