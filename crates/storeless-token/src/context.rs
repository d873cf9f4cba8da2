//! Facts about the current request that a signature is bound to.
//!
//! A token copied from one browser to another should stop working, so the
//! signature covers a little of the client's environment: its User-Agent,
//! and optionally the first segment of its IP address. The request host
//! is carried here too because cookie scoping needs it.

/// Read-only view of the request's client.
///
/// Built once per request by whatever HTTP layer sits in front of the
/// session code; every field is optional because none of the headers are
/// guaranteed to be present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientContext {
    user_agent: Option<String>,
    remote_addr: Option<String>,
    host: Option<String>,
}

impl ClientContext {
    /// Creates an empty context (no User-Agent, no address, no host).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the raw `User-Agent` header value.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sets the client's source address, e.g. `"203.0.113.9"`.
    pub fn remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = Some(addr.into());
        self
    }

    /// Sets the request host from the `Host` header. A trailing `:port`
    /// is dropped since cookie domains never carry one.
    pub fn host(mut self, host: impl AsRef<str>) -> Self {
        self.host = Some(strip_port(host.as_ref()).to_ascii_lowercase());
        self
    }

    /// The raw User-Agent, or `""` when the client sent none.
    pub fn user_agent_or_empty(&self) -> &str {
        self.user_agent.as_deref().unwrap_or("")
    }

    /// The first dot-delimited segment of the client address.
    ///
    /// For IPv4 that is the first octet. An IPv6 address has no dots, so
    /// the whole address is returned. `""` when the address is unknown.
    pub fn ip_prefix(&self) -> &str {
        self.remote_addr
            .as_deref()
            .and_then(|addr| addr.split('.').next())
            .unwrap_or("")
    }

    /// The request host without port, if known.
    pub fn request_host(&self) -> Option<&str> {
        self.host.as_deref()
    }
}

fn strip_port(host: &str) -> &str {
    let host = host.trim();
    if host.starts_with('[') {
        // IPv6 literal: "[::1]:8080"
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}
