//! Conversation and message models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a conversation between two users from the `conversations` table.
///
/// Participants are stored in sorted order (`participant_a < participant_b`) so a
/// pair of users has exactly one conversation.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Conversation {
    pub id: Uuid,
    pub participant_a: Uuid,
    pub participant_b: Uuid,

    /// Booking the conversation was started from, if any
    pub booking_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub last_message_at: Option<DateTime<Utc>>,
}

impl Conversation {
    pub fn includes(&self, user_id: Uuid) -> bool {
        self.participant_a == user_id || self.participant_b == user_id
    }

    /// The participant that is not `user_id`.
    pub fn other_participant(&self, user_id: Uuid) -> Uuid {
        if self.participant_a == user_id {
            self.participant_b
        } else {
            self.participant_a
        }
    }
}

/// Conversation listing row with the counterpart's name and unread count.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct ConversationSummary {
    pub id: Uuid,
    pub other_user_id: Uuid,
    pub other_user_name: String,
    pub booking_id: Option<Uuid>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub last_message_body: Option<String>,
    pub unread_count: i64,
}

/// Represents a message from the `messages` table.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,

    /// Users who have read this message
    pub read_by: Vec<Uuid>,

    pub created_at: DateTime<Utc>,
}

impl Message {
    /// A message is unread for a user who neither wrote nor read it.
    pub fn is_unread_for(&self, user_id: Uuid) -> bool {
        self.sender_id != user_id && !self.read_by.contains(&user_id)
    }
}

/// Request body for opening (or finding) a conversation.
///
/// ```json
/// { "participant_id": "660e8400-...", "booking_id": null }
/// ```
#[derive(Debug, Deserialize)]
pub struct OpenConversationRequest {
    pub participant_id: Uuid,
    pub booking_id: Option<Uuid>,
}

/// Request body for posting a message.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub body: String,
}

/// Paging for message history: messages strictly older than `before`, newest first.
#[derive(Debug, Deserialize)]
pub struct MessagePage {
    pub before: Option<DateTime<Utc>>,

    #[serde(default = "default_page_size")]
    pub limit: i64,
}

fn default_page_size() -> i64 {
    50
}

/// Response for the unread badge.
#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(sender: Uuid, read_by: Vec<Uuid>) -> Message {
        Message {
            id: Uuid::new_v4(),
            conversation_id: Uuid::new_v4(),
            sender_id: sender,
            body: "hi".into(),
            read_by,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn own_messages_are_never_unread() {
        let me = Uuid::new_v4();
        assert!(!message(me, vec![]).is_unread_for(me));
    }

    #[test]
    fn read_by_list_clears_unread() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        assert!(message(other, vec![]).is_unread_for(me));
        assert!(message(other, vec![other]).is_unread_for(me));
        assert!(!message(other, vec![me]).is_unread_for(me));
    }

    #[test]
    fn other_participant_is_symmetric() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let conversation = Conversation {
            id: Uuid::new_v4(),
            participant_a: a,
            participant_b: b,
            booking_id: None,
            created_at: Utc::now(),
            last_message_at: None,
        };
        assert_eq!(conversation.other_participant(a), b);
        assert_eq!(conversation.other_participant(b), a);
        assert!(!conversation.includes(Uuid::new_v4()));
    }
}
