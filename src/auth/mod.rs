// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer token authentication and permission guards for the chat API.
//!
//! ## Auth Flow
//!
//! 1. Client registers or logs in and receives `Bearer <JWT>`
//! 2. Client sends `Authorization: Bearer <JWT>` on later requests
//! 3. Server:
//!    - Verifies the RS256 signature and expiry against the configured
//!      public key
//!    - Resolves `sub` against the user store; unknown subjects are
//!      rejected
//!
//! ## Security
//!
//! - Tokens expire after one day, with no clock leeway
//! - Signing keys are provisioned out-of-band and loaded at startup
//! - Permission checks run after existence checks, so a 403 never
//!   reveals whether a resource exists
//! - Unauthenticated visitors get a pseudonymous guest label derived
//!   from their client address (see [`guest`])

pub mod error;
pub mod extractor;
pub mod guard;
pub mod guest;
pub mod password;
pub mod tokens;

pub use error::AuthError;
pub use extractor::{Auth, OptionalAuth};
pub use guard::{require_message_owner, require_room_member, require_self, Caller};
pub use guest::{client_addr, guest_label, GUEST_PREFIX};
pub use password::{hash_password, verify_password};
pub use tokens::{Claims, IssuedToken, TokenService, TOKEN_VALIDITY_SECS};
