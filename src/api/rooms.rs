// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chat room endpoints: the public room feed and private room creation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::{self, Auth, OptionalAuth},
    error::ApiError,
    models::{
        CreateRoomRequest, MessagesResponse, NewMessageRequest, NewMessageResponse,
        NewRoomResponse, RoomView,
    },
    state::AppState,
    storage::{
        MessageRepository, RoomRepository, StoreError, StoredRoom, UserRepository, GENERAL_SLUG,
    },
};

use super::messages::{check_post_access, expand_message, resolve_author, validate_text};

fn room_view(room: &StoredRoom) -> RoomView {
    RoomView {
        id: room.id,
        slug: room.slug.clone(),
        name: Some(room.name.clone()),
        is_private: room.is_private,
        member_ids: room.member_ids.clone(),
    }
}

#[utoipa::path(
    post,
    path = "/chat-rooms/general",
    request_body = NewMessageRequest,
    tag = "Chat rooms",
    responses(
        (status = 201, body = NewMessageResponse),
        (status = 400, description = "Invalid text or author fields"),
        (status = 404, description = "General Chat not found")
    )
)]
pub async fn post_general(
    OptionalAuth(caller): OptionalAuth,
    State(state): State<AppState>,
    Json(request): Json<NewMessageRequest>,
) -> Result<(StatusCode, Json<NewMessageResponse>), ApiError> {
    let text = validate_text(&request.text)?;
    let author = resolve_author(&request, caller.as_ref())?;

    let room = RoomRepository::new(&state.db)
        .find_by_slug(GENERAL_SLUG)?
        .ok_or_else(|| ApiError::not_found("General Chat not found"))?;

    check_post_access(&author, &room)?;

    let message = MessageRepository::new(&state.db).create(room.id, author, text)?;

    Ok((
        StatusCode::CREATED,
        Json(NewMessageResponse {
            message: "New message for General Chat created successfully".to_string(),
            new_message: expand_message(&state.db, &message)?,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/chat-rooms",
    request_body = CreateRoomRequest,
    tag = "Chat rooms",
    responses(
        (status = 201, body = NewRoomResponse),
        (status = 400, description = "Bad member list"),
        (status = 403, description = "Caller not in the member list"),
        (status = 409, description = "Room for this member set already exists")
    )
)]
pub async fn create_room(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<NewRoomResponse>), ApiError> {
    let mut member_ids = request.member_ids.clone();
    member_ids.sort_unstable();
    member_ids.dedup();

    if member_ids.len() < 2 {
        return Err(ApiError::bad_request(
            "memberIds must be an array with at least 2 items.",
        ));
    }

    let users = UserRepository::new(&state.db);
    for member_id in &member_ids {
        if users.find_by_id(*member_id)?.is_none() {
            return Err(ApiError::bad_request(
                "Can't create chat room with users that don't exist",
            ));
        }
    }

    if !member_ids.contains(&caller.id) {
        return Err(ApiError::forbidden("Failed to create chat-room"));
    }

    let room = RoomRepository::new(&state.db)
        .create_private(&member_ids)
        .map_err(|e| match e {
            StoreError::AlreadyExists(_) => {
                ApiError::conflict("Chat room between memberIds already exists")
            }
            other => other.into(),
        })?;

    tracing::info!(room_id = room.id, "chat room created");

    Ok((
        StatusCode::CREATED,
        Json(NewRoomResponse {
            message: "Chat room created successfully".to_string(),
            chat_room: room_view(&room),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/chat-rooms/{id}/messages",
    params(("id" = i64, Path, description = "Chat room id")),
    tag = "Chat rooms",
    responses(
        (status = 200, body = MessagesResponse),
        (status = 403, description = "Caller is not a member"),
        (status = 404, description = "Chat room not found")
    )
)]
pub async fn room_messages(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let room = RoomRepository::new(&state.db)
        .find_by_id(id)?
        .ok_or_else(|| ApiError::not_found("Chat room not found"))?;

    auth::require_room_member(&caller, &room)
        .map_err(|_| ApiError::forbidden("Unauthorized to access this resource"))?;

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
    path = "/chat-rooms/{id}/messages",
    params(("id" = i64, Path, description = "Chat room id")),
    request_body = crate::models::UpdateMessageRequest,
    tag = "Chat rooms",
    responses(
        (status = 201, body = NewMessageResponse),
        (status = 403, description = "Caller is not a member"),
        (status = 404, description = "Chat room not found")
    )
)]
pub async fn post_room_message(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<crate::models::UpdateMessageRequest>,
) -> Result<(StatusCode, Json<NewMessageResponse>), ApiError> {
    let text = validate_text(&request.text)?;

    let room = RoomRepository::new(&state.db)
        .find_by_id(id)?
        .ok_or_else(|| ApiError::not_found("Chat room not found"))?;

    auth::require_room_member(&caller, &room)
        .map_err(|_| ApiError::forbidden("Unauthorized to access this resource"))?;

    let message = MessageRepository::new(&state.db).create(
        room.id,
        crate::models::MessageAuthor::Registered { user_id: caller.id },
        text,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(NewMessageResponse {
            message: format!("New message for Chat with id: {id} created successfully"),
            new_message: expand_message(&state.db, &message)?,
        }),
    ))
}
