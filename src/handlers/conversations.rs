//! Chat handlers.
//!
//! - POST /api/v1/conversations - Open (or reuse) a conversation with another user
//! - GET /api/v1/conversations - The caller's conversations with unread counts
//! - GET /api/v1/conversations/{id}/messages - Message history (`before`, `limit`)
//! - POST /api/v1/conversations/{id}/messages - Send a message
//! - POST /api/v1/conversations/{id}/read - Mark everything read
//! - GET /api/v1/messages/unread-count - Unread badge

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::chat::{
        Conversation, ConversationSummary, Message, MessagePage, OpenConversationRequest,
        SendMessageRequest, UnreadCountResponse,
    },
    realtime::EventHub,
    services::chat_service,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub marked: u64,
}

/// A page of history, newest first, with how many of these messages the caller
/// has not read yet.
#[derive(Debug, Serialize)]
pub struct MessageHistory {
    pub messages: Vec<Message>,
    pub unread_in_page: usize,
}

/// Open a conversation with `participant_id`.
///
/// Each pair of users has one conversation; opening it again returns the
/// existing one. A `booking_id` is attached only if none was attached before.
pub async fn open_conversation(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<OpenConversationRequest>,
) -> Result<Json<Conversation>, AppError> {
    let conversation = chat_service::open_conversation(
        &pool,
        auth.user_id,
        request.participant_id,
        request.booking_id,
    )
    .await?;

    Ok(Json(conversation))
}

pub async fn list_conversations(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<ConversationSummary>>, AppError> {
    Ok(Json(
        chat_service::list_conversations(&pool, auth.user_id).await?,
    ))
}

pub async fn list_messages(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(conversation_id): Path<Uuid>,
    Query(page): Query<MessagePage>,
) -> Result<Json<MessageHistory>, AppError> {
    let messages =
        chat_service::list_messages(&pool, auth.user_id, conversation_id, &page).await?;
    let unread_in_page = chat_service::count_unread(&messages, auth.user_id);

    Ok(Json(MessageHistory {
        messages,
        unread_in_page,
    }))
}

/// Send a message. The recipient is notified over the realtime feed.
pub async fn send_message(
    State(pool): State<DbPool>,
    State(events): State<EventHub>,
    Extension(auth): Extension<AuthContext>,
    Path(conversation_id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let message =
        chat_service::send_message(&pool, &events, auth.user_id, conversation_id, &request.body)
            .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn mark_read(
    State(pool): State<DbPool>,
    State(events): State<EventHub>,
    Extension(auth): Extension<AuthContext>,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<MarkReadResponse>, AppError> {
    let marked = chat_service::mark_read(&pool, &events, auth.user_id, conversation_id).await?;

    Ok(Json(MarkReadResponse { marked }))
}

pub async fn unread_count(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<UnreadCountResponse>, AppError> {
    let unread = chat_service::unread_count(&pool, auth.user_id).await?;

    Ok(Json(UnreadCountResponse { unread }))
}
