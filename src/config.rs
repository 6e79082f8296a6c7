// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for the redb database file | `/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `JWT_PRIVATE_KEY_PATH` | PEM file with the RSA signing key | `id_rsa_priv.pem` |
//! | `JWT_PUBLIC_KEY_PATH` | PEM file with the RSA verification key | `id_rsa_pub.pem` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//!
//! The RSA key pair is provisioned out-of-band (e.g. `openssl genpkey
//! -algorithm RSA -pkeyopt rsa_keygen_bits:4096`) and loaded exactly once at
//! process start. The running service never mutates or regenerates it.

/// Environment variable name for the data directory path.
///
/// The redb database file (`chat.redb`) lives directly under this directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Default data directory when `DATA_DIR` is unset.
pub const DEFAULT_DATA_DIR: &str = "/data";

/// Environment variable name for the server bind address.
pub const HOST_ENV: &str = "HOST";

/// Default bind address when `HOST` is unset.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Environment variable name for the server bind port.
pub const PORT_ENV: &str = "PORT";

/// Default bind port when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 3000;

/// Environment variable name for the RSA private key PEM path (token signing).
pub const JWT_PRIVATE_KEY_PATH_ENV: &str = "JWT_PRIVATE_KEY_PATH";

/// Default private key path when `JWT_PRIVATE_KEY_PATH` is unset.
pub const DEFAULT_JWT_PRIVATE_KEY_PATH: &str = "id_rsa_priv.pem";

/// Environment variable name for the RSA public key PEM path (token verification).
pub const JWT_PUBLIC_KEY_PATH_ENV: &str = "JWT_PUBLIC_KEY_PATH";

/// Default public key path when `JWT_PUBLIC_KEY_PATH` is unset.
pub const DEFAULT_JWT_PUBLIC_KEY_PATH: &str = "id_rsa_pub.pem";

/// File name of the database inside the data directory.
pub const DATABASE_FILE: &str = "chat.redb";
