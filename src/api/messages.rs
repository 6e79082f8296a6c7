// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Message endpoints: posting to arbitrary rooms, editing, deleting.
//!
//! Posting accepts either a registered author (`authorId`, which must
//! match the caller's token) or a guest label (`guestName`, public room
//! only). Checks run in a fixed order: authentication, then resource
//! existence, then permission, so a missing room is always 404 before any
//! 403 can reveal it exists.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::{self, Auth, Caller, OptionalAuth},
    error::ApiError,
    models::{
        MessageAuthor, MessageAuthorView, MessageResponse, MessageView, MessagesResponse,
        NewMessageRequest, NewMessageResponse, ProfileView, UpdateMessageRequest,
    },
    state::AppState,
    storage::{
        ChatDatabase, MessageRepository, RoomRepository, StoredMessage, StoredRoom, UserRepository,
        GENERAL_SLUG,
    },
};

/// Longest accepted message text, in characters.
const MAX_TEXT_LEN: usize = 1024;

/// Trim and length-check message text.
pub(crate) fn validate_text(text: &str) -> Result<&str, ApiError> {
    let text = text.trim();
    if text.is_empty() || text.chars().count() > MAX_TEXT_LEN {
        return Err(ApiError::bad_request(
            "Message must be between 1 and 1024 characters",
        ));
    }
    Ok(text)
}

/// Build the wire view of a message, expanding a registered author that
/// still exists with their profile.
pub(crate) fn expand_message(
    db: &ChatDatabase,
    message: &StoredMessage,
) -> Result<MessageView, ApiError> {
    let author = match message.author.user_id() {
        Some(user_id) => {
            let users = UserRepository::new(db);
            match users.find_by_id(user_id)? {
                Some(user) => {
                    let profile = users.profile_of(&user)?;
                    Some(MessageAuthorView {
                        id: user.id,
                        email: user.email,
                        profile: ProfileView {
                            name: profile.name,
                            display_color: profile.display_color,
                        },
                    })
                }
                // Author account is gone; keep the message, drop the expansion.
                None => None,
            }
        }
        None => None,
    };

    Ok(MessageView {
        id: message.id,
        chat_room_id: message.room_id,
        text: message.text.clone(),
        author_id: message.author.user_id(),
        guest_name: message.author.guest_name().map(str::to_string),
        author,
        created_at: message.created_at,
    })
}

/// Fold the optional wire author fields into a [`MessageAuthor`], checking
/// that a registered author is the authenticated caller.
pub(crate) fn resolve_author(
    request: &NewMessageRequest,
    caller: Option<&Caller>,
) -> Result<MessageAuthor, ApiError> {
    let author = MessageAuthor::from_parts(request.author_id, request.guest_name.clone())
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    if let Some(author_id) = author.user_id() {
        match caller {
            None => {
                return Err(ApiError::unauthorized(
                    "Authentication required to post as a registered user",
                ))
            }
            Some(caller) if caller.id != author_id => {
                return Err(ApiError::forbidden("Can't post messages as another user"))
            }
            Some(_) => {}
        }
    }
    Ok(author)
}

/// Everything posting needs to check once the room is loaded: membership
/// for registered authors, public room only for guests.
pub(crate) fn check_post_access(
    author: &MessageAuthor,
    room: &StoredRoom,
) -> Result<(), ApiError> {
    match author {
        MessageAuthor::Registered { user_id } => {
            if !room.admits(*user_id) {
                return Err(ApiError::forbidden(
                    "Can't comment on chatRooms that you don't participate",
                ));
            }
        }
        MessageAuthor::Guest { .. } => {
            if room.slug.as_deref() != Some(GENERAL_SLUG) {
                return Err(ApiError::forbidden("Guests can only comment on General Chat"));
            }
        }
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/messages",
    tag = "Messages",
    responses((status = 200, body = MessagesResponse))
)]
pub async fn list_general(
    State(state): State<AppState>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let room = RoomRepository::new(&state.db)
        .find_by_slug(GENERAL_SLUG)?
        .ok_or_else(|| ApiError::not_found("General Chat not found"))?;

    let stored = MessageRepository::new(&state.db).list_by_room(room.id)?;
    let mut messages = Vec::with_capacity(stored.len());
    for message in &stored {
        messages.push(expand_message(&state.db, message)?);
    }

    Ok(Json(MessagesResponse {
        message: "List of all general messages fetched successfully".to_string(),
        messages,
    }))
}

#[utoipa::path(
    post,
    path = "/messages/{room_id}",
    params(("room_id" = i64, Path, description = "Target chat room")),
    request_body = NewMessageRequest,
    tag = "Messages",
    responses(
        (status = 201, body = NewMessageResponse),
        (status = 400, description = "Invalid text or author fields"),
        (status = 403, description = "Not a member, or guest outside General Chat"),
        (status = 404, description = "Chat room not found")
    )
)]
pub async fn create_in_room(
    OptionalAuth(caller): OptionalAuth,
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
    Json(request): Json<NewMessageRequest>,
) -> Result<(StatusCode, Json<NewMessageResponse>), ApiError> {
    let text = validate_text(&request.text)?;
    let author = resolve_author(&request, caller.as_ref())?;

    let room = RoomRepository::new(&state.db)
        .find_by_id(room_id)?
        .ok_or_else(|| ApiError::not_found(format!("chatRoom with id {room_id} not found")))?;

    check_post_access(&author, &room)?;

    let message = MessageRepository::new(&state.db).create(room.id, author, text)?;
    tracing::debug!(room_id, message_id = message.id, "message created");

    Ok((
        StatusCode::CREATED,
        Json(NewMessageResponse {
            message: format!("New message for chatRoom with id: {room_id} created"),
            new_message: expand_message(&state.db, &message)?,
        }),
    ))
}

#[utoipa::path(
    patch,
    path = "/messages/{id}",
    params(("id" = i64, Path, description = "Message to edit")),
    request_body = UpdateMessageRequest,
    tag = "Messages",
    responses(
        (status = 200, description = "Message patched"),
        (status = 403, description = "Caller is not the author"),
        (status = 404, description = "Message not found")
    )
)]
pub async fn update_message(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateMessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let text = validate_text(&request.text)?;

    let messages = MessageRepository::new(&state.db);
    let message = messages
        .find_by_id(id)?
        .ok_or_else(|| ApiError::not_found(format!("Message with id: {id} not found")))?;

    auth::require_message_owner(&caller, &message)
        .map_err(|_| ApiError::forbidden("You are not authorized to edit this message"))?;

    messages.update_text(id, text)?;

    Ok(Json(MessageResponse {
        message: format!("Message with id: {id} was successfully patched"),
    }))
}

#[utoipa::path(
    delete,
    path = "/messages/{id}",
    params(("id" = i64, Path, description = "Message to delete")),
    tag = "Messages",
    responses(
        (status = 204, description = "Message deleted"),
        (status = 403, description = "Caller is not the author"),
        (status = 404, description = "Message not found")
    )
)]
pub async fn delete_message(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let messages = MessageRepository::new(&state.db);
    let message = messages
        .find_by_id(id)?
        .ok_or_else(|| ApiError::not_found(format!("Message with id: {id} not found")))?;

    auth::require_message_owner(&caller, &message)
        .map_err(|_| ApiError::forbidden("You are not authorized to delete this message"))?;

    messages.delete(id)?;

    Ok(StatusCode::NO_CONTENT)
}
