//! Server-sent event feed.
//!
//! `GET /api/v1/realtime` streams the events that concern the caller:
//! new messages, read receipts, booking, offer and application changes.
//! Events carry ids only; clients refetch the resources they care about.

use crate::{
    middleware::auth::AuthContext,
    realtime::{EventHub, RealtimeEvent},
};
use axum::{
    Extension,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use std::{convert::Infallible, time::Duration};
use tokio_stream::{
    Stream, StreamExt,
    wrappers::{BroadcastStream, errors::BroadcastStreamRecvError},
};
use uuid::Uuid;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Keep `received` if it is an event for `user_id`. Lag is logged and skipped.
fn event_for(
    received: Result<RealtimeEvent, BroadcastStreamRecvError>,
    user_id: Uuid,
) -> Option<RealtimeEvent> {
    match received {
        Ok(event) if event.concerns(user_id) => Some(event),
        Ok(_) => None,
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!("Realtime feed for {} lagged, {} events skipped", user_id, skipped);
            None
        }
    }
}

fn to_sse(event: &RealtimeEvent) -> Option<Event> {
    match Event::default().event(event.name()).json_data(event) {
        Ok(sse) => Some(sse),
        Err(e) => {
            tracing::warn!("Failed to serialize {} event: {}", event.name(), e);
            None
        }
    }
}

pub async fn event_stream(
    State(events): State<EventHub>,
    Extension(auth): Extension<AuthContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let user_id = auth.user_id;
    tracing::debug!("Realtime client connected: {} ({})", auth.display_name, user_id);

    let stream = BroadcastStream::new(events.subscribe())
        .filter_map(move |received| event_for(received, user_id))
        .filter_map(|event| to_sse(&event))
        .map(Ok);

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_to(recipient: Uuid) -> RealtimeEvent {
        RealtimeEvent::MessageCreated {
            conversation_id: Uuid::new_v4(),
            message_id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            recipient_id: recipient,
        }
    }

    #[tokio::test]
    async fn feed_only_carries_the_callers_events() {
        let hub = EventHub::new(16);
        let me = Uuid::new_v4();
        let someone_else = Uuid::new_v4();

        let mut feed = BroadcastStream::new(hub.subscribe())
            .filter_map(move |received| event_for(received, me));

        hub.publish(message_to(someone_else));
        hub.publish(message_to(me));

        match feed.next().await {
            Some(RealtimeEvent::MessageCreated { recipient_id, .. }) => {
                assert_eq!(recipient_id, me)
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn lagged_receivers_skip_instead_of_failing() {
        assert!(event_for(Err(BroadcastStreamRecvError::Lagged(3)), Uuid::new_v4()).is_none());
    }
}
