//! In-process publish/subscribe hub for realtime notifications.
//!
//! Services publish a `RealtimeEvent` after committing a change. Each connected
//! client holds a broadcast receiver and only forwards events that concern its
//! user. Events carry ids only: clients refetch the affected resource.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Change notification delivered over the realtime feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RealtimeEvent {
    MessageCreated {
        conversation_id: Uuid,
        message_id: Uuid,
        sender_id: Uuid,
        recipient_id: Uuid,
    },
    MessagesRead {
        conversation_id: Uuid,
        reader_id: Uuid,
        sender_id: Uuid,
    },
    BookingChanged {
        booking_id: Uuid,
        artist_id: Uuid,
        venue_id: Uuid,
        status: String,
    },
    OfferChanged {
        offer_id: Uuid,
        artist_id: Uuid,
        venue_id: Uuid,
        status: String,
    },
    GigApplicationChanged {
        gig_id: Uuid,
        application_id: Uuid,
        artist_id: Uuid,
        venue_id: Uuid,
        status: String,
    },
}

impl RealtimeEvent {
    /// Whether `user_id` should receive this event.
    pub fn concerns(&self, user_id: Uuid) -> bool {
        match self {
            RealtimeEvent::MessageCreated { recipient_id, .. } => *recipient_id == user_id,
            RealtimeEvent::MessagesRead { sender_id, .. } => *sender_id == user_id,
            RealtimeEvent::BookingChanged {
                artist_id,
                venue_id,
                ..
            }
            | RealtimeEvent::OfferChanged {
                artist_id,
                venue_id,
                ..
            }
            | RealtimeEvent::GigApplicationChanged {
                artist_id,
                venue_id,
                ..
            } => *artist_id == user_id || *venue_id == user_id,
        }
    }

    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            RealtimeEvent::MessageCreated { .. } => "message_created",
            RealtimeEvent::MessagesRead { .. } => "messages_read",
            RealtimeEvent::BookingChanged { .. } => "booking_changed",
            RealtimeEvent::OfferChanged { .. } => "offer_changed",
            RealtimeEvent::GigApplicationChanged { .. } => "gig_application_changed",
        }
    }
}

/// Cloneable handle to the broadcast channel.
#[derive(Debug, Clone)]
pub struct EventHub {
    sender: broadcast::Sender<RealtimeEvent>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: RealtimeEvent) {
        let name = event.name();
        match self.sender.send(event) {
            Ok(receivers) => tracing::debug!("Published {} to {} subscribers", name, receivers),
            Err(_) => tracing::trace!("Dropped {}: no subscribers", name),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_events_reach_the_recipient_only() {
        let sender = Uuid::new_v4();
        let recipient = Uuid::new_v4();
        let event = RealtimeEvent::MessageCreated {
            conversation_id: Uuid::new_v4(),
            message_id: Uuid::new_v4(),
            sender_id: sender,
            recipient_id: recipient,
        };
        assert!(event.concerns(recipient));
        assert!(!event.concerns(sender));
    }

    #[test]
    fn booking_events_reach_both_parties() {
        let artist = Uuid::new_v4();
        let venue = Uuid::new_v4();
        let event = RealtimeEvent::BookingChanged {
            booking_id: Uuid::new_v4(),
            artist_id: artist,
            venue_id: venue,
            status: "confirmed".into(),
        };
        assert!(event.concerns(artist));
        assert!(event.concerns(venue));
        assert!(!event.concerns(Uuid::new_v4()));
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = RealtimeEvent::MessagesRead {
            conversation_id: Uuid::nil(),
            reader_id: Uuid::nil(),
            sender_id: Uuid::nil(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "messages_read");
    }

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let hub = EventHub::new(8);
        let mut rx = hub.subscribe();
        let event = RealtimeEvent::OfferChanged {
            offer_id: Uuid::new_v4(),
            artist_id: Uuid::new_v4(),
            venue_id: Uuid::new_v4(),
            status: "pending".into(),
        };

        hub.publish(event.clone());

        assert_eq!(rx.recv().await.unwrap(), event);
    }

    #[test]
    fn publishing_without_subscribers_does_not_panic() {
        let hub = EventHub::new(1);
        hub.publish(RealtimeEvent::MessagesRead {
            conversation_id: Uuid::nil(),
            reader_id: Uuid::nil(),
            sender_id: Uuid::nil(),
        });
    }
}
