//! The signature engine: a keyed SHA-256 over a token's fields.
//!
//! The server never stores tokens, so the only thing standing between a
//! client and a forged `user_id` is this hash. It covers:
//!
//! - the secret (only the server knows it),
//! - the three token fields (user id, issued-at, remember flag),
//! - the client's User-Agent,
//! - optionally the first segment of the client's IP address.
//!
//! # Framing
//!
//! Every part is fed to the hasher behind an 8-byte big-endian length.
//! Without framing, user `1` issued at `23...` and user `12` issued at
//! `3...` would hash the same bytes. Framing also means a digest can't be
//! length-extended into the digest of a longer User-Agent.

use sha2::{Digest, Sha256};

use crate::{ClientContext, Signature, UserId};

/// Length of a signature in hex characters (SHA-256 → 32 bytes → 64 hex).
pub const SIGNATURE_HEX_LEN: usize = 64;

/// Computes token signatures.
///
/// Holds only the one option that changes what gets signed. The secret is
/// passed per call because validation tries more than one (current, then
/// previous) against the same token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignatureEngine {
    bind_ip_prefix: bool,
}

impl SignatureEngine {
    /// Creates an engine. With `bind_ip_prefix == false` the IP part is
    /// always the empty string, which is the same for every client, so
    /// the binding adds nothing unless it is turned on.
    pub fn new(bind_ip_prefix: bool) -> Self {
        Self { bind_ip_prefix }
    }

    /// Returns `true` if signatures include the client's IP prefix.
    pub fn binds_ip_prefix(&self) -> bool {
        self.bind_ip_prefix
    }

    /// Computes the signature for the given fields, secret and client.
    ///
    /// Pure: the same inputs always give the same 64-character lowercase
    /// hex digest.
    pub fn sign(
        &self,
        user_id: UserId,
        issued_at: u64,
        remember_me: bool,
        secret: &str,
        client: &ClientContext,
    ) -> Signature {
        let ip_prefix = if self.bind_ip_prefix {
            client.ip_prefix()
        } else {
            ""
        };

        let user_id = user_id.get().to_string();
        let issued_at = issued_at.to_string();
        let remember_me = if remember_me { "1" } else { "0" };
        let parts: [&str; 6] = [
            secret,
            &user_id,
            &issued_at,
            remember_me,
            client.user_agent_or_empty(),
            ip_prefix,
        ];

        let mut hasher = Sha256::new();
        for part in parts.iter().map(|p| p.as_bytes()) {
            hasher.update((part.len() as u64).to_be_bytes());
            hasher.update(part);
        }

        Signature::new(hex::encode(hasher.finalize()))
    }
}
