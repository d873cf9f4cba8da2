//! In-memory cookie transport.
//!
//! [`CookieJar`] is what an HTTP handler hands to the session layer: it is
//! built from the request's `Cookie` header, answers reads from it, and
//! collects every write so the handler can turn them into `Set-Cookie`
//! response headers afterwards.

use std::collections::HashMap;

use chrono::DateTime;

use crate::{
    outermost_labels, CookieOptions, DomainScope, Expiry, TokenTransport, DEFAULT_SCOPE_LABELS,
};

/// Cookie date format from RFC 6265 (`Wed, 21 Oct 2015 07:28:00 GMT`).
const COOKIE_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// One outgoing cookie write, with its domain already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieWrite {
    pub name: String,
    pub value: String,
    pub expiry: Expiry,
    /// `None` when the request host was unknown; the browser then scopes
    /// the cookie to the exact host.
    pub domain: Option<String>,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
}

impl CookieWrite {
    /// Returns `true` if this write removes the cookie.
    pub fn is_deletion(&self) -> bool {
        self.expiry == Expiry::Expired
    }

    /// Renders the write as a `Set-Cookie` header value.
    pub fn to_header(&self) -> String {
        let mut header = format!("{}={}; Path={}", self.name, self.value, self.path);
        if let Some(domain) = &self.domain {
            header.push_str("; Domain=");
            header.push_str(domain);
        }
        match self.expiry {
            Expiry::Session => {}
            Expiry::At(unix) => {
                if let Some(date) = i64::try_from(unix)
                    .ok()
                    .and_then(|secs| DateTime::from_timestamp(secs, 0))
                {
                    header.push_str("; Expires=");
                    header.push_str(&date.format(COOKIE_DATE_FORMAT).to_string());
                }
            }
            Expiry::Expired => {
                header.push_str("; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0");
            }
        }
        if self.secure {
            header.push_str("; Secure");
        }
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        header
    }
}

/// A per-request cookie transport.
///
/// # Example
///
/// ```rust
/// use storeless_transport::{CookieJar, CookieOptions, Expiry, TokenTransport};
///
/// let mut jar = CookieJar::from_header("theme=dark; s=42,0,1000,ab").with_host("www.example.com");
/// assert_eq!(jar.get_token("s").as_deref(), Some("42,0,1000,ab"));
///
/// jar.set_token("s", "43,0,2000,cd", &CookieOptions::new(Expiry::Session));
/// assert_eq!(
///     jar.set_cookie_headers(),
///     vec!["s=43,0,2000,cd; Path=/; Domain=www.example.com; HttpOnly".to_string()]
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    host: Option<String>,
    incoming: HashMap<String, String>,
    writes: Vec<CookieWrite>,
}

impl CookieJar {
    /// Creates a jar with no incoming cookies and no host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `Cookie` request header (`a=1; b=2`). Pairs without `=`
    /// are skipped; when a name repeats, the first value wins, matching
    /// what browsers send first for the most specific path.
    pub fn from_header(header: &str) -> Self {
        let mut incoming = HashMap::new();
        for pair in header.split(';') {
            let Some((name, value)) = pair.trim().split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            incoming
                .entry(name.to_string())
                .or_insert_with(|| value.trim().to_string());
        }
        Self {
            incoming,
            ..Self::default()
        }
    }

    /// Sets the request host used to resolve [`DomainScope::Default`].
    /// A `:port` suffix is ignored.
    pub fn with_host(mut self, host: impl AsRef<str>) -> Self {
        let context = storeless_token::ClientContext::new().host(host);
        self.host = context.request_host().map(str::to_string);
        self
    }

    /// Adds an incoming cookie, as if the client had sent it.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.incoming.insert(name.into(), value.into());
    }

    /// All writes made during this request, in order.
    pub fn writes(&self) -> &[CookieWrite] {
        &self.writes
    }

    /// The most recent write for `name` that set a value (not a deletion).
    pub fn last_issued(&self, name: &str) -> Option<&CookieWrite> {
        self.writes
            .iter()
            .rev()
            .find(|write| write.name == name && !write.is_deletion())
    }

    /// Removes and returns all writes.
    pub fn take_writes(&mut self) -> Vec<CookieWrite> {
        std::mem::take(&mut self.writes)
    }

    /// Renders every write as a `Set-Cookie` header value.
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.writes.iter().map(CookieWrite::to_header).collect()
    }

    fn resolve_domain(&self, scope: &DomainScope) -> Option<String> {
        match scope {
            DomainScope::Explicit(domain) => Some(domain.clone()),
            DomainScope::Default => self
                .host
                .as_deref()
                .map(|host| outermost_labels(host, DEFAULT_SCOPE_LABELS).to_string()),
        }
    }
}

impl TokenTransport for CookieJar {
    fn get_token(&self, name: &str) -> Option<String> {
        self.incoming.get(name).cloned()
    }

    fn set_token(&mut self, name: &str, value: &str, options: &CookieOptions) {
        let write = CookieWrite {
            name: name.to_string(),
            value: value.to_string(),
            expiry: options.expiry,
            domain: self.resolve_domain(&options.domain),
            path: options.path.clone(),
            secure: options.secure,
            http_only: options.http_only,
        };
        tracing::trace!(
            name,
            domain = write.domain.as_deref().unwrap_or(""),
            deletion = write.is_deletion(),
            "cookie write queued"
        );
        self.writes.push(write);
    }
}
