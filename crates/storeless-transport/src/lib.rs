//! Transport abstraction layer for Storeless.
//!
//! A session token has to live somewhere between requests. In practice
//! that is a cookie, but the session layer only talks to the
//! [`TokenTransport`] trait: read a named token, write one, delete one.
//!
//! # Feature Flags
//!
//! - `jar` (default): [`CookieJar`], an in-memory transport that reads a
//!   request's `Cookie` header and renders `Set-Cookie` lines.

#[cfg(feature = "jar")]
mod cookie_jar;

#[cfg(feature = "jar")]
pub use cookie_jar::{CookieJar, CookieWrite};
pub use storeless_token::ClientContext;

use std::net::IpAddr;

/// Number of host labels the default cookie domain keeps
/// (`a.b.example.com` → `b.example.com`).
pub const DEFAULT_SCOPE_LABELS: usize = 3;

/// Number of host labels in the narrowed scope that destroy also clears
/// (`a.b.example.com` → `example.com`).
pub const NARROW_SCOPE_LABELS: usize = 2;

/// When a written token stops being sent by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Lives until the browser session ends (no `Expires` attribute).
    Session,
    /// Lives until the given Unix timestamp.
    At(u64),
    /// Already in the past: the client drops the token immediately.
    Expired,
}

/// Which domain a token is written under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainScope {
    /// Let the transport derive the domain from the request host
    /// (see [`DEFAULT_SCOPE_LABELS`]).
    Default,
    /// Write under exactly this domain.
    Explicit(String),
}

/// Everything besides name and value that goes with a token write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub expiry: Expiry,
    pub domain: DomainScope,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
}

impl CookieOptions {
    /// Options with the given expiry, default domain, path `/`, not
    /// secure-only, HTTP-only.
    pub fn new(expiry: Expiry) -> Self {
        Self {
            expiry,
            domain: DomainScope::Default,
            path: "/".to_string(),
            secure: false,
            http_only: true,
        }
    }
}

/// Reads and writes the token on the client side of a request.
///
/// Implementations are per-request objects: `get_token` answers from the
/// incoming request, `set_token` queues an outgoing write. Nothing here
/// can fail from the session layer's point of view; a transport that can
/// fail should log and carry on.
pub trait TokenTransport {
    /// Returns the raw token value sent by the client, if any.
    fn get_token(&self, name: &str) -> Option<String>;

    /// Writes (or overwrites) a token on the client.
    fn set_token(&mut self, name: &str, value: &str, options: &CookieOptions);

    /// Removes a token from the client by overwriting it with an empty,
    /// already-expired value. Deleting a token that doesn't exist is fine.
    fn delete_token(&mut self, name: &str, domain: DomainScope, secure: bool, http_only: bool) {
        let options = CookieOptions {
            domain,
            secure,
            http_only,
            ..CookieOptions::new(Expiry::Expired)
        };
        self.set_token(name, "", &options);
    }
}

/// Returns the outermost `count` dot-delimited labels of `host`.
///
/// ```rust
/// use storeless_transport::outermost_labels;
///
/// assert_eq!(outermost_labels("a.b.example.com", 3), "b.example.com");
/// assert_eq!(outermost_labels("a.b.example.com", 2), "example.com");
/// assert_eq!(outermost_labels("localhost", 3), "localhost");
/// ```
///
/// IP literals are returned unchanged: cutting labels off an address does
/// not give a parent domain.
pub fn outermost_labels(host: &str, count: usize) -> &str {
    if host.starts_with('[') || host.parse::<IpAddr>().is_ok() {
        return host;
    }
    if count == 0 {
        return "";
    }
    match host.rmatch_indices('.').nth(count - 1) {
        Some((dot, _)) => &host[dot + 1..],
        None => host,
    }
}
