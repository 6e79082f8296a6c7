// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Index page and guest identity endpoint.

use std::net::SocketAddr;

use axum::{extract::ConnectInfo, http::HeaderMap, Json};

use crate::{
    auth::{client_addr, guest_label},
    models::{ConnectResponse, MessageResponse},
};

#[utoipa::path(
    get,
    path = "/",
    tag = "Connect",
    responses((status = 200, body = MessageResponse))
)]
pub async fn index() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Index page".to_string(),
    })
}

/// Hand an unauthenticated visitor their stable guest identity.
///
/// The label depends only on the client address (first `x-forwarded-for`
/// entry behind a proxy, peer address otherwise), so repeat visitors keep
/// the same name without any stored state.
#[utoipa::path(
    get,
    path = "/connect",
    tag = "Connect",
    responses((status = 200, body = ConnectResponse))
)]
pub async fn connect(
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Json<ConnectResponse> {
    let forwarded_for = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok());
    let addr = client_addr(forwarded_for, &peer);

    Json(ConnectResponse {
        message: "Guest name generated successfully".to_string(),
        guest_name: guest_label(&addr),
    })
}
