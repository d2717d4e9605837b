//! Chat service - conversations, messages and unread counts.
//!
//! A pair of users shares exactly one conversation. Read state is tracked per
//! message in a `read_by` array; unread counts are computed per request.

use crate::{
    db::DbPool,
    error::AppError,
    models::chat::{Conversation, ConversationSummary, Message, MessagePage},
    realtime::{EventHub, RealtimeEvent},
};
use uuid::Uuid;

/// Longest accepted message body, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 5000;

/// Largest page of message history returned at once.
pub const MAX_PAGE_SIZE: i64 = 200;

/// Participants in the order they are stored (`participant_a < participant_b`).
pub fn ordered_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a < b { (a, b) } else { (b, a) }
}

/// Trim a message body and check its length.
pub fn validate_body(body: &str) -> Result<&str, AppError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidRequest(
            "Message must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(AppError::InvalidRequest(format!(
            "Message must be at most {MAX_MESSAGE_LENGTH} characters"
        )));
    }
    Ok(trimmed)
}

/// Count messages unread by `user_id`: not written by them and not in their read list.
pub fn count_unread<'a>(messages: impl IntoIterator<Item = &'a Message>, user_id: Uuid) -> usize {
    messages
        .into_iter()
        .filter(|m| m.is_unread_for(user_id))
        .count()
}

/// Find the conversation between the caller and `participant_id`, creating it if needed.
///
/// When `booking_id` is given the caller must be a party to that booking; it is
/// attached to the conversation if none was attached before.
pub async fn open_conversation(
    pool: &DbPool,
    user_id: Uuid,
    participant_id: Uuid,
    booking_id: Option<Uuid>,
) -> Result<Conversation, AppError> {
    if participant_id == user_id {
        return Err(AppError::InvalidRequest(
            "Cannot start a conversation with yourself".to_string(),
        ));
    }

    let participant_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(participant_id)
            .fetch_one(pool)
            .await?;
    if !participant_exists {
        return Err(AppError::InvalidRequest(
            "Participant does not exist".to_string(),
        ));
    }

    if let Some(booking_id) = booking_id {
        let is_party: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM bookings WHERE id = $1 AND (artist_id = $2 OR venue_id = $2))",
        )
        .bind(booking_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        if !is_party {
            return Err(AppError::BookingNotFound);
        }
    }

    let (participant_a, participant_b) = ordered_pair(user_id, participant_id);

    let conversation = sqlx::query_as::<_, Conversation>(
        r#"
        INSERT INTO conversations (participant_a, participant_b, booking_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (participant_a, participant_b)
        DO UPDATE SET booking_id = COALESCE(conversations.booking_id, EXCLUDED.booking_id)
        RETURNING *
        "#,
    )
    .bind(participant_a)
    .bind(participant_b)
    .bind(booking_id)
    .fetch_one(pool)
    .await?;

    Ok(conversation)
}

/// Fetch a conversation the caller takes part in.
pub async fn get_conversation(
    pool: &DbPool,
    user_id: Uuid,
    conversation_id: Uuid,
) -> Result<Conversation, AppError> {
    let conversation = sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = $1")
        .bind(conversation_id)
        .fetch_optional(pool)
        .await?
        .filter(|c| c.includes(user_id))
        .ok_or(AppError::ConversationNotFound)?;

    Ok(conversation)
}

/// The caller's conversations, most recently active first, with unread counts.
pub async fn list_conversations(
    pool: &DbPool,
    user_id: Uuid,
) -> Result<Vec<ConversationSummary>, AppError> {
    let conversations = sqlx::query_as::<_, ConversationSummary>(
        r#"
        SELECT c.id,
               u.id AS other_user_id,
               u.display_name AS other_user_name,
               c.booking_id,
               c.last_message_at,
               (
                   SELECT m.body FROM messages m
                   WHERE m.conversation_id = c.id
                   ORDER BY m.created_at DESC
                   LIMIT 1
               ) AS last_message_body,
               (
                   SELECT COUNT(*) FROM messages m
                   WHERE m.conversation_id = c.id
                     AND m.sender_id <> $1
                     AND NOT ($1 = ANY(m.read_by))
               ) AS unread_count
        FROM conversations c
        JOIN users u
          ON u.id = CASE WHEN c.participant_a = $1 THEN c.participant_b ELSE c.participant_a END
        WHERE c.participant_a = $1 OR c.participant_b = $1
        ORDER BY c.last_message_at DESC NULLS LAST, c.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(conversations)
}

/// A page of message history, newest first.
pub async fn list_messages(
    pool: &DbPool,
    user_id: Uuid,
    conversation_id: Uuid,
    page: &MessagePage,
) -> Result<Vec<Message>, AppError> {
    get_conversation(pool, user_id, conversation_id).await?;

    let limit = page.limit.clamp(1, MAX_PAGE_SIZE);

    let messages = sqlx::query_as::<_, Message>(
        r#"
        SELECT * FROM messages
        WHERE conversation_id = $1
          AND ($2::timestamptz IS NULL OR created_at < $2)
        ORDER BY created_at DESC
        LIMIT $3
        "#,
    )
    .bind(conversation_id)
    .bind(page.before)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}

/// Post a message and notify the other participant.
pub async fn send_message(
    pool: &DbPool,
    events: &EventHub,
    user_id: Uuid,
    conversation_id: Uuid,
    body: &str,
) -> Result<Message, AppError> {
    let body = validate_body(body)?;
    let conversation = get_conversation(pool, user_id, conversation_id).await?;

    let mut tx = pool.begin().await?;

    let message = sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (conversation_id, sender_id, body)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(conversation_id)
    .bind(user_id)
    .bind(body)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE conversations SET last_message_at = $2 WHERE id = $1")
        .bind(conversation_id)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    events.publish(RealtimeEvent::MessageCreated {
        conversation_id,
        message_id: message.id,
        sender_id: user_id,
        recipient_id: conversation.other_participant(user_id),
    });

    Ok(message)
}

/// Mark every message in the conversation as read by the caller.
///
/// Returns how many messages changed state.
pub async fn mark_read(
    pool: &DbPool,
    events: &EventHub,
    user_id: Uuid,
    conversation_id: Uuid,
) -> Result<u64, AppError> {
    let conversation = get_conversation(pool, user_id, conversation_id).await?;

    let marked = sqlx::query(
        r#"
        UPDATE messages
        SET read_by = array_append(read_by, $2)
        WHERE conversation_id = $1
          AND sender_id <> $2
          AND NOT ($2 = ANY(read_by))
        "#,
    )
    .bind(conversation_id)
    .bind(user_id)
    .execute(pool)
    .await?
    .rows_affected();

    if marked > 0 {
        events.publish(RealtimeEvent::MessagesRead {
            conversation_id,
            reader_id: user_id,
            sender_id: conversation.other_participant(user_id),
        });
    }

    Ok(marked)
}

/// Total unread messages across all of the caller's conversations.
pub async fn unread_count(pool: &DbPool, user_id: Uuid) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM messages m
        JOIN conversations c ON c.id = m.conversation_id
        WHERE (c.participant_a = $1 OR c.participant_b = $1)
          AND m.sender_id <> $1
          AND NOT ($1 = ANY(m.read_by))
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn message(sender: Uuid, read_by: Vec<Uuid>) -> Message {
        Message {
            id: Uuid::new_v4(),
            conversation_id: Uuid::nil(),
            sender_id: sender,
            body: "See you at soundcheck".into(),
            read_by,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn pair_order_does_not_depend_on_caller() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(ordered_pair(a, b), ordered_pair(b, a));
        let (first, second) = ordered_pair(a, b);
        assert!(first < second);
    }

    #[test]
    fn unread_excludes_own_and_read_messages() {
        let me = Uuid::new_v4();
        let venue = Uuid::new_v4();
        let messages = vec![
            message(venue, vec![]),
            message(venue, vec![me]),
            message(me, vec![]),
            message(venue, vec![venue]),
        ];
        assert_eq!(count_unread(&messages, me), 2);
        assert_eq!(count_unread(&messages, venue), 1);
    }

    #[test]
    fn bodies_are_trimmed_and_bounded() {
        assert_eq!(validate_body("  hello \n").unwrap(), "hello");
        assert!(validate_body("   ").is_err());
        assert!(validate_body(&"x".repeat(MAX_MESSAGE_LENGTH + 1)).is_err());
        assert!(validate_body(&"x".repeat(MAX_MESSAGE_LENGTH)).is_ok());
    }
}
