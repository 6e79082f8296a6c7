// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API, plus the [`MessageAuthor`] domain type shared with storage.
//! All wire types derive `Serialize`, `Deserialize`, and `ToSchema` for
//! automatic JSON handling and OpenAPI documentation.
//!
//! Field names follow the client wire format (camelCase: `guestName`,
//! `memberIds`, `displayColor`, `expiresIn`).
//!
//! ## Model Categories
//!
//! - **Users**: registration, login, profile, follow relationships
//! - **Chat rooms**: room creation and summaries
//! - **Messages**: posting, editing, and listing with expanded authors

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Roles
// =============================================================================

/// Role tag attached to every user account.
///
/// There is no privilege hierarchy in the chat service today; the tag is
/// stored and echoed so clients can distinguish account kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Normal registered account.
    #[default]
    User,
    /// Reserved for operational tooling.
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

// =============================================================================
// Message Author
// =============================================================================

/// Author of a message: exactly one of a registered user or a pseudonymous
/// guest.
///
/// The wire format carries two optional fields (`authorId` / `guestName`);
/// this union makes the invalid both-set and neither-set shapes
/// unrepresentable once a request has been admitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageAuthor {
    /// Message posted by a registered, authenticated user.
    Registered { user_id: i64 },
    /// Message posted by an unauthenticated guest (public room only).
    Guest { name: String },
}

impl MessageAuthor {
    /// Build an author from the two optional wire fields.
    ///
    /// Rejects both-set and neither-set, mirroring the exactly-one-of rule.
    pub fn from_parts(
        author_id: Option<i64>,
        guest_name: Option<String>,
    ) -> Result<Self, AuthorFieldsError> {
        match (author_id, guest_name) {
            (Some(_), Some(_)) => Err(AuthorFieldsError::Both),
            (None, None) => Err(AuthorFieldsError::Neither),
            (Some(user_id), None) => Ok(MessageAuthor::Registered { user_id }),
            (None, Some(name)) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    Err(AuthorFieldsError::Neither)
                } else {
                    Ok(MessageAuthor::Guest { name })
                }
            }
        }
    }

    /// Registered author's user id, if any.
    pub fn user_id(&self) -> Option<i64> {
        match self {
            MessageAuthor::Registered { user_id } => Some(*user_id),
            MessageAuthor::Guest { .. } => None,
        }
    }

    /// Guest display label, if any.
    pub fn guest_name(&self) -> Option<&str> {
        match self {
            MessageAuthor::Registered { .. } => None,
            MessageAuthor::Guest { name } => Some(name),
        }
    }
}

/// Violation of the exactly-one-of author rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthorFieldsError {
    #[error("Message cannot have both authorId and guestName")]
    Both,
    #[error("Message must have either authorId or guestName")]
    Neither,
}

// =============================================================================
// Generic envelopes
// =============================================================================

/// Plain acknowledgement envelope used by several endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Response for `GET /connect`: a stable pseudonymous guest identity.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectResponse {
    pub message: String,
    pub guest_name: String,
}

// =============================================================================
// Users
// =============================================================================

/// Request body for `POST /users/register`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    /// Must match `password`.
    pub password_confirm: String,
}

/// Request body for `POST /users/login`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `PATCH /users/profile/{id}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub profile_name: String,
    pub display_color: String,
}

/// Public view of a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub name: String,
    pub display_color: String,
}

/// Public view of a user (never carries the password hash).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserView {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub profile: ProfileView,
    /// Ids of users this user follows.
    pub following: Vec<i64>,
}

/// Entry in a following list (`GET /users/following/{id}`).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FollowedUser {
    pub id: i64,
    pub email: String,
}

/// Response for register/login: user payload plus a bearer credential.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub message: String,
    pub user: UserView,
    /// `Bearer <jwt>` — ready to be echoed into the Authorization header.
    pub token: String,
    pub expires_in: String,
}

/// Response for `GET /users/me`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserInfoResponse {
    pub message: String,
    pub user: UserView,
}

// =============================================================================
// Chat rooms
// =============================================================================

/// Request body for `POST /chat-rooms`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    /// At least two distinct user ids; must include the caller.
    pub member_ids: Vec<i64>,
}

/// Public view of a chat room.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub is_private: bool,
    pub member_ids: Vec<i64>,
}

/// Envelope for a freshly created chat room.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewRoomResponse {
    pub message: String,
    pub chat_room: RoomView,
}

// =============================================================================
// Messages
// =============================================================================

/// Request body for posting a message.
///
/// Exactly one of `authorId` / `guestName` must be set; the pair is folded
/// into a [`MessageAuthor`] before anything touches storage.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageRequest {
    pub text: String,
    #[serde(default)]
    pub author_id: Option<i64>,
    #[serde(default)]
    pub guest_name: Option<String>,
}

/// Request body for `PATCH /messages/{id}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateMessageRequest {
    pub text: String,
}

/// Registered author expanded with profile data for message listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageAuthorView {
    pub id: i64,
    pub email: String,
    pub profile: ProfileView,
}

/// Public view of a message.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: i64,
    pub chat_room_id: i64,
    pub text: String,
    /// Registered author id (`null` for guest messages).
    pub author_id: Option<i64>,
    /// Guest label (`null` for registered messages).
    pub guest_name: Option<String>,
    /// Expanded author record when the message was posted by a registered
    /// user that still exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<MessageAuthorView>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Envelope for message listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessagesResponse {
    pub message: String,
    pub messages: Vec<MessageView>,
}

/// Envelope for a freshly created message.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageResponse {
    pub message: String,
    pub new_message: MessageView,
}
