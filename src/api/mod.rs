// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        AuthResponse, ConnectResponse, CreateRoomRequest, FollowedUser, LoginRequest,
        MessageAuthorView, MessageResponse, MessageView, MessagesResponse, NewMessageRequest,
        NewMessageResponse, NewRoomResponse, ProfileView, RegisterRequest, Role, RoomView,
        UpdateMessageRequest, UpdateProfileRequest, UserInfoResponse, UserView,
    },
    state::AppState,
};

pub mod connect;
pub mod health;
pub mod messages;
pub mod rooms;
pub mod users;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(connect::index))
        .route("/connect", get(connect::connect))
        .route("/health", get(health::health))
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/users/logout", get(users::logout))
        .route("/users/me", get(users::me))
        .route(
            "/users/following/{id}",
            get(users::following_list)
                .post(users::follow)
                .delete(users::unfollow),
        )
        .route("/users/profile/{id}", patch(users::patch_profile))
        .route("/chat-rooms", post(rooms::create_room))
        .route(
            "/chat-rooms/general",
            get(messages::list_general).post(rooms::post_general),
        )
        .route(
            "/chat-rooms/{id}/messages",
            get(rooms::room_messages).post(rooms::post_room_message),
        )
        .route("/messages", get(messages::list_general))
        .route(
            "/messages/{id}",
            post(messages::create_in_room)
                .patch(messages::update_message)
                .delete(messages::delete_message),
        )
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        connect::index,
        connect::connect,
        health::health,
        users::register,
        users::login,
        users::logout,
        users::me,
        users::following_list,
        users::follow,
        users::unfollow,
        users::patch_profile,
        rooms::create_room,
        rooms::post_general,
        rooms::room_messages,
        rooms::post_room_message,
        messages::list_general,
        messages::create_in_room,
        messages::update_message,
        messages::delete_message
    ),
    components(
        schemas(
            Role,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            UserView,
            UserInfoResponse,
            ProfileView,
            UpdateProfileRequest,
            FollowedUser,
            MessageResponse,
            ConnectResponse,
            CreateRoomRequest,
            RoomView,
            NewRoomResponse,
            NewMessageRequest,
            UpdateMessageRequest,
            MessageView,
            MessageAuthorView,
            MessagesResponse,
            NewMessageResponse
        )
    ),
    tags(
        (name = "Connect", description = "Index page and guest identity"),
        (name = "Health", description = "Service health"),
        (name = "Users", description = "Accounts, profiles, follow relations"),
        (name = "Chat rooms", description = "Public feed and private rooms"),
        (name = "Messages", description = "Posting, editing, deleting messages")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let (state, _dir) = test_state();
        let app = router(state);
        // Ensure the router can be converted into a service without panicking.
        let _ = app.into_make_service();
    }
}
