//! The session token: everything a client needs to prove who it is.
//!
//! A token is four fields and nothing else. There is no server-side
//! record behind it, so every field the server needs to make a decision
//! (who, which expiry policy, how old) travels inside the token, and the
//! signature makes sure the client can't change any of them.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The authenticated principal a token speaks for.
///
/// A newtype over `u64` so a user id can't be confused with a timestamp,
/// which is the other integer that travels in every token.
///
/// `#[serde(transparent)]` keeps the JSON form a plain number, which is
/// how ban lists are written in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl UserId {
    /// Returns the raw id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A hex-encoded integrity hash, as produced by
/// [`SignatureEngine`](crate::SignatureEngine) or as presented by a client.
///
/// A presented signature is untrusted input: it may have any length or
/// content. Compare signatures with [`Signature::matches`], never with `==`
/// on the strings, so the comparison time does not leak how many leading
/// characters were right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(String);

impl Signature {
    /// Wraps a hex string.
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Returns the hex text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compares two signatures in time that depends only on their length.
    pub fn matches(&self, other: &Signature) -> bool {
        let a = self.0.as_bytes();
        let b = other.0.as_bytes();
        if a.len() != b.len() {
            return false;
        }
        a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
    }
}

// ---------------------------------------------------------------------------
// SessionToken
// ---------------------------------------------------------------------------

/// A decoded (but not necessarily verified) session token.
///
/// Decoding only proves the token has the right shape. Whether it is
/// authentic, expired or banned is decided by the session layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    /// Who the token speaks for.
    pub user_id: UserId,

    /// Selects the long ("remember me") or short expiry policy.
    pub remember_me: bool,

    /// Unix timestamp (seconds) of issuance or last refresh.
    pub issued_at: u64,

    /// Integrity hash over the other three fields plus client context.
    pub signature: Signature,
}
