use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use journey_persist::Session;
use journey_types::ChatMessage;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ThreadResponse {
    pub thread_id: String,
    pub thread_name: String,
    pub user_id: Option<String>,
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Session> for ThreadResponse {
    fn from(session: Session) -> Self {
        Self {
            message_count: session.messages.len(),
            thread_id: session.thread_id,
            thread_name: session.thread_name,
            user_id: session.user_id,
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub thread_id: String,
    pub messages: Vec<ChatMessage>,
}

/// Get thread metadata
#[utoipa::path(
    get,
    path = "/threads/{thread_id}",
    params(("thread_id" = String, Path, description = "Thread ID")),
    responses(
        (status = 200, description = "Thread found", body = ThreadResponse),
        (status = 404, description = "Thread not found")
    ),
    tag = "threads"
)]
pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<ThreadResponse>> {
    let session = state
        .conversations
        .session(&thread_id)
        .await?
        .ok_or(ApiError::ThreadNotFound(thread_id))?;
    Ok(Json(session.into()))
}

/// List a thread's messages in order
#[utoipa::path(
    get,
    path = "/threads/{thread_id}/messages",
    params(("thread_id" = String, Path, description = "Thread ID")),
    responses(
        (status = 200, description = "Ordered message history"),
        (status = 404, description = "Thread not found")
    ),
    tag = "threads"
)]
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<MessagesResponse>> {
    let session = state
        .conversations
        .session(&thread_id)
        .await?
        .ok_or_else(|| ApiError::ThreadNotFound(thread_id.clone()))?;
    Ok(Json(MessagesResponse {
        thread_id,
        messages: session.messages,
    }))
}
