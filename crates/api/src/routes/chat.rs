//! Direct chat route handlers.
//!
//! Messages belong to their sender; edit and delete on someone else's
//! message return 403, not 404, so the sender can tell the difference
//! between a missing message and a permission problem.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use bazaar_core::{MessageId, UserId};

use crate::db::messages::MessageRepository;
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireUser;
use crate::models::message::Message;
use crate::state::AppState;

/// Message body payload, shared by send and edit.
#[derive(Debug, Deserialize)]
pub struct MessageBody {
    pub body: String,
}

/// `GET /api/chat/{user_id}`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn conversation(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(other): Path<UserId>,
) -> Result<Json<Vec<Message>>> {
    let messages = MessageRepository::new(state.pool())
        .conversation(user.id, other)
        .await?;
    Ok(Json(messages))
}

/// `POST /api/chat/{user_id}`
#[instrument(skip(state, req, user), fields(user_id = %user.id))]
pub async fn send(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(recipient): Path<UserId>,
    Json(req): Json<MessageBody>,
) -> Result<(StatusCode, Json<Message>)> {
    validate_body(&req.body)?;
    if recipient == user.id {
        return Err(AppError::validation("cannot message yourself"));
    }

    UserRepository::new(state.pool())
        .get_by_id(recipient)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {recipient}")))?;

    let message = MessageRepository::new(state.pool())
        .create(user.id, recipient, &req.body)
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// `PUT /api/chat/messages/{id}`
#[instrument(skip(state, req, user), fields(user_id = %user.id))]
pub async fn edit(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<MessageId>,
    Json(req): Json<MessageBody>,
) -> Result<Json<Message>> {
    validate_body(&req.body)?;

    let repo = MessageRepository::new(state.pool());
    match repo.update_body(id, user.id, &req.body).await? {
        Some(message) => Ok(Json(message)),
        None => Err(not_updatable(&repo, id).await?),
    }
}

/// `DELETE /api/chat/messages/{id}`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<MessageId>,
) -> Result<StatusCode> {
    let repo = MessageRepository::new(state.pool());
    if repo.delete(id, user.id).await? {
        return Ok(StatusCode::NO_CONTENT);
    }

    Err(not_updatable(&repo, id).await?)
}

/// Distinguish a missing message from someone else's message.
async fn not_updatable(repo: &MessageRepository<'_>, id: MessageId) -> Result<AppError> {
    Ok(if repo.get(id).await?.is_some() {
        AppError::Forbidden("Message belongs to another user".to_owned())
    } else {
        AppError::NotFound(format!("message {id}"))
    })
}

fn validate_body(body: &str) -> Result<()> {
    if body.trim().is_empty() {
        return Err(AppError::validation("message body must not be empty"));
    }
    Ok(())
}
