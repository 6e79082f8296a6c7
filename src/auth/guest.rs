// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Guest identity derivation.
//!
//! Unauthenticated visitors get a stable pseudonymous label derived from
//! their client address: `guest_` followed by the first eight hex chars
//! of the SHA-256 digest of the address. The same address always yields
//! the same label, and the address itself is never stored or exposed.

use sha2::{Digest, Sha256};

pub const GUEST_PREFIX: &str = "guest_";

/// Derive the guest label for a client address.
pub fn guest_label(addr: &str) -> String {
    let digest = Sha256::digest(addr.as_bytes());
    let mut label = String::with_capacity(GUEST_PREFIX.len() + 8);
    label.push_str(GUEST_PREFIX);
    for byte in &digest[..4] {
        label.push_str(&format!("{byte:02x}"));
    }
    label
}

/// Resolve the client address for guest derivation.
///
/// Behind a proxy the original client is the first entry of the
/// `x-forwarded-for` chain; otherwise the peer address of the socket is
/// used.
pub fn client_addr(forwarded_for: Option<&str>, peer: &std::net::SocketAddr) -> String {
    forwarded_for
        .and_then(|chain| chain.split(',').next())
        .map(|first| first.trim().to_string())
        .filter(|first| !first.is_empty())
        .unwrap_or_else(|| peer.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    #[test]
    fn label_is_deterministic_and_shaped() {
        let first = guest_label("203.0.113.7");
        let second = guest_label("203.0.113.7");
        assert_eq!(first, second);

        assert!(first.starts_with(GUEST_PREFIX));
        let suffix = &first[GUEST_PREFIX.len()..];
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_addresses_get_different_labels() {
        assert_ne!(guest_label("203.0.113.7"), guest_label("203.0.113.8"));
    }

    #[test]
    fn forwarded_chain_wins_over_peer() {
        let peer: SocketAddr = "10.0.0.1:9999".parse().unwrap();
        let addr = client_addr(Some("203.0.113.7, 10.0.0.2"), &peer);
        assert_eq!(addr, "203.0.113.7");
    }

    #[test]
    fn empty_forwarded_header_falls_back_to_peer() {
        let peer: SocketAddr = "10.0.0.1:9999".parse().unwrap();
        assert_eq!(client_addr(Some("  "), &peer), "10.0.0.1");
        assert_eq!(client_addr(None, &peer), "10.0.0.1");
    }
}
