// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Chat - Minimal Chat Application Backend
//!
//! This crate provides a token-authenticated chat service: account
//! registration and login, a public "general" room open to pseudonymous
//! guests, private multi-member rooms, and follow relationships.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Bearer tokens, guards, guest identity
//! - `storage` - Embedded persistence (redb)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;
