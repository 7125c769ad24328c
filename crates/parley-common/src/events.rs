use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Session and conversation lifecycle notifications for presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    SessionStarted { username: String },
    SessionRenewed,
    /// Renewal failed; credentials were dropped and the user must sign in again.
    SessionExpired,
    SessionEnded,
    ConversationLoaded { count: usize },
    ConversationCleared,
    ExchangeCommitted { id: i64 },
    ExchangeRolledBack { local_id: u64 },
    #[serde(other)]
    Unknown,
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: Event) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(Event::SessionExpired);

        let event = rx.recv().await.unwrap();
        assert_eq!(event, Event::SessionExpired);
    }

    #[tokio::test]
    async fn cloned_bus_shares_subscribers() {
        let bus = EventBus::new(16);
        let other = bus.clone();
        let mut rx = bus.subscribe();

        other.publish(Event::SessionStarted {
            username: "alice".into(),
        });

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, Event::SessionStarted { ref username } if username == "alice"));
    }

    #[tokio::test]
    async fn conversation_events_arrive_in_order() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(Event::ConversationLoaded { count: 2 });
        bus.publish(Event::ExchangeRolledBack { local_id: 1 });
        bus.publish(Event::ExchangeCommitted { id: 42 });
        bus.publish(Event::ConversationCleared);

        assert_eq!(rx.recv().await.unwrap(), Event::ConversationLoaded { count: 2 });
        assert_eq!(rx.recv().await.unwrap(), Event::ExchangeRolledBack { local_id: 1 });
        assert_eq!(rx.recv().await.unwrap(), Event::ExchangeCommitted { id: 42 });
        assert_eq!(rx.recv().await.unwrap(), Event::ConversationCleared);
    }

    #[test]
    fn publish_returns_zero_with_no_subscribers() {
        let bus = EventBus::new(16);
        assert_eq!(bus.publish(Event::SessionEnded), 0);
    }

    #[test]
    fn unknown_event_deserializes() {
        let json = r#"{"type":"SomeNewEventWeNeverHeardOf","data":null}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event, Event::Unknown);
    }
}
