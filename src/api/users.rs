// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User account endpoints: registration, login, profile, follow relations.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::{self, Auth},
    error::ApiError,
    models::{
        AuthResponse, FollowedUser, LoginRequest, MessageResponse, ProfileView, RegisterRequest,
        UpdateProfileRequest, UserInfoResponse, UserView,
    },
    state::AppState,
    storage::{ChatDatabase, StoredUser, UserRepository},
};

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 8;

fn valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Build the public view of a user, profile included.
pub(crate) fn user_view(db: &ChatDatabase, user: &StoredUser) -> Result<UserView, ApiError> {
    let profile = UserRepository::new(db).profile_of(user)?;
    Ok(UserView {
        id: user.id,
        email: user.email.clone(),
        role: user.role,
        profile: ProfileView {
            name: profile.name,
            display_color: profile.display_color,
        },
        following: user.following.clone(),
    })
}

#[utoipa::path(
    post,
    path = "/users/register",
    request_body = RegisterRequest,
    tag = "Users",
    responses(
        (status = 201, body = AuthResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let email = request.email.trim().to_lowercase();
    let password = request.password.trim();
    let password_confirm = request.password_confirm.trim();

    if !valid_email(&email) {
        return Err(ApiError::bad_request("Please enter a valid email address"));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request("Password minimum length is 8"));
    }
    if password != password_confirm {
        return Err(ApiError::bad_request(
            "Your password and password confirm value didn't match",
        ));
    }

    let hash = auth::hash_password(password).map_err(|e| {
        tracing::error!(error = %e, "password hashing failed");
        ApiError::internal()
    })?;

    let (user, _profile) = UserRepository::new(&state.db).create(&email, &hash)?;
    let issued = state.tokens.issue(user.id).map_err(|e| {
        tracing::error!(error = %e, "token issuing failed");
        ApiError::internal()
    })?;

    tracing::info!(user_id = user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully".to_string(),
            user: user_view(&state.db, &user)?,
            token: issued.token,
            expires_in: issued.expires_in.to_string(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    tag = "Users",
    responses(
        (status = 200, body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = request.email.trim().to_lowercase();
    let password = request.password.trim();

    if email.is_empty() {
        return Err(ApiError::bad_request("Email is required"));
    }
    if !valid_email(&email) {
        return Err(ApiError::bad_request("Please enter a valid email address"));
    }
    if password.is_empty() {
        return Err(ApiError::bad_request("Password is required"));
    }

    let user = UserRepository::new(&state.db).find_by_email(&email)?;

    // Same response for unknown email and wrong password.
    let Some(user) = user else {
        return Err(ApiError::unauthorized("Invalid email or password"));
    };
    let matches = auth::verify_password(password, &user.password_hash).map_err(|e| {
        tracing::error!(error = %e, "password verification failed");
        ApiError::internal()
    })?;
    if !matches {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let issued = state.tokens.issue(user.id).map_err(|e| {
        tracing::error!(error = %e, "token issuing failed");
        ApiError::internal()
    })?;

    Ok(Json(AuthResponse {
        message: "User login was successful".to_string(),
        user: user_view(&state.db, &user)?,
        token: issued.token,
        expires_in: issued.expires_in.to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/users/logout",
    tag = "Users",
    responses((status = 200, body = MessageResponse))
)]
pub async fn logout() -> Json<MessageResponse> {
    // Tokens are stateless; the client drops its copy.
    Json(MessageResponse {
        message: "Logout successful".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    responses(
        (status = 200, body = UserInfoResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    Auth(caller): Auth,
    State(state): State<AppState>,
) -> Result<Json<UserInfoResponse>, ApiError> {
    let user = UserRepository::new(&state.db)
        .find_by_id(caller.id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(UserInfoResponse {
        message: "User fetch was successful".to_string(),
        user: user_view(&state.db, &user)?,
    }))
}

#[utoipa::path(
    get,
    path = "/users/following/{id}",
    params(("id" = i64, Path, description = "User whose following list to fetch")),
    tag = "Users",
    responses(
        (status = 200, body = [FollowedUser]),
        (status = 403, description = "Not the caller's own list")
    )
)]
pub async fn following_list(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<FollowedUser>>, ApiError> {
    auth::require_self(&caller, id)
        .map_err(|_| ApiError::forbidden("Failed to fetch following list"))?;

    let users = UserRepository::new(&state.db);
    let user = users
        .find_by_id(id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let mut following = Vec::with_capacity(user.following.len());
    for followed_id in user.following {
        // Skip dangling edges to deleted accounts.
        if let Some(followed) = users.find_by_id(followed_id)? {
            following.push(FollowedUser {
                id: followed.id,
                email: followed.email,
            });
        }
    }
    Ok(Json(following))
}

#[utoipa::path(
    post,
    path = "/users/following/{id}",
    params(("id" = i64, Path, description = "User to follow")),
    tag = "Users",
    responses(
        (status = 200, body = MessageResponse),
        (status = 400, description = "Already following, or self-follow"),
        (status = 404, description = "Target user not found")
    )
)]
pub async fn follow(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if id == caller.id {
        return Err(ApiError::bad_request("You can't follow yourself."));
    }

    let users = UserRepository::new(&state.db);
    let user = users
        .find_by_id(caller.id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    if users.find_by_id(id)?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    if user.following.contains(&id) {
        return Err(ApiError::bad_request("You already follow this user."));
    }

    users.follow(caller.id, id)?;

    Ok(Json(MessageResponse {
        message: format!("User with id: {id} was successfully followed"),
    }))
}

#[utoipa::path(
    delete,
    path = "/users/following/{id}",
    params(("id" = i64, Path, description = "User to unfollow")),
    tag = "Users",
    responses(
        (status = 200, body = MessageResponse),
        (status = 400, description = "Not following this user")
    )
)]
pub async fn unfollow(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let users = UserRepository::new(&state.db);
    let user = users
        .find_by_id(caller.id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if !user.following.contains(&id) {
        return Err(ApiError::bad_request("You are not following this user."));
    }

    users.unfollow(caller.id, id)?;

    Ok(Json(MessageResponse {
        message: format!("User with id: {id} was successfully unfollowed"),
    }))
}

#[utoipa::path(
    patch,
    path = "/users/profile/{id}",
    params(("id" = i64, Path, description = "Profile id to update")),
    request_body = UpdateProfileRequest,
    tag = "Users",
    responses(
        (status = 200, body = MessageResponse),
        (status = 403, description = "Not the profile owner"),
        (status = 404, description = "Profile not found")
    )
)]
pub async fn patch_profile(
    Auth(caller): Auth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let users = UserRepository::new(&state.db);

    // Existence before ownership: a foreign id that does not exist is 404.
    let profile = users
        .find_profile(id)?
        .ok_or_else(|| ApiError::not_found(format!("Profile with id: {id} not found")))?;

    if profile.user_id != caller.id {
        return Err(ApiError::forbidden("Not authorized to edit this profile"));
    }

    users.update_profile(id, request.profile_name.trim(), request.display_color.trim())?;

    Ok(Json(MessageResponse {
        message: format!("Profile with id: {id} was successfully patched"),
    }))
}
