// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, fs, net::SocketAddr, path::PathBuf};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use relational_chat_server::{
    api::router,
    auth::TokenService,
    config::{
        DATABASE_FILE, DATA_DIR_ENV, DEFAULT_DATA_DIR, DEFAULT_HOST,
        DEFAULT_JWT_PRIVATE_KEY_PATH, DEFAULT_JWT_PUBLIC_KEY_PATH, DEFAULT_PORT, HOST_ENV,
        JWT_PRIVATE_KEY_PATH_ENV, JWT_PUBLIC_KEY_PATH_ENV, PORT_ENV,
    },
    state::AppState,
    storage::{ChatDatabase, RoomRepository},
};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Signing keys are provisioned out-of-band; refusing to start without
    // them beats serving unverifiable tokens.
    let private_key_path = env::var(JWT_PRIVATE_KEY_PATH_ENV)
        .unwrap_or_else(|_| DEFAULT_JWT_PRIVATE_KEY_PATH.to_string());
    let public_key_path = env::var(JWT_PUBLIC_KEY_PATH_ENV)
        .unwrap_or_else(|_| DEFAULT_JWT_PUBLIC_KEY_PATH.to_string());
    let private_pem = fs::read(&private_key_path)
        .unwrap_or_else(|e| panic!("Failed to read {private_key_path}: {e}"));
    let public_pem = fs::read(&public_key_path)
        .unwrap_or_else(|e| panic!("Failed to read {public_key_path}: {e}"));
    let tokens =
        TokenService::new(&private_pem, &public_pem).expect("Failed to build token service");

    let data_dir = PathBuf::from(env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string()));
    let db = ChatDatabase::open(&data_dir.join(DATABASE_FILE)).expect("Failed to open database");

    let general = RoomRepository::new(&db)
        .ensure_general()
        .expect("Failed to seed the public room");
    tracing::info!(room_id = general.id, "public room ready");

    let state = AppState::new(db, tokens);
    let app = router(state);

    let host = env::var(HOST_ENV).unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port: u16 = env::var(PORT_ENV)
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!("Relational Chat server listening on http://{addr} (docs at /docs)");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("HTTP server failed");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("shutdown signal received");
}
