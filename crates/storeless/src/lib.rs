//! # Storeless
//!
//! Signed-cookie login sessions with no server-side session store.
//!
//! A logged-in client carries a token `user_id,remember_me,issued_at,signature`.
//! The signature binds the token to a server secret and to the client's
//! User-Agent (and optionally its IP prefix), so every request can decide
//! who is logged in from the token alone.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use storeless::prelude::*;
//!
//! # fn main() -> Result<(), StorelessError> {
//! let config = SessionConfig::builder()
//!     .current_secret("change-me")
//!     .build()?;
//! let authority = Arc::new(SessionAuthority::new(config));
//!
//! // Login request.
//! let client = ClientContext::new().user_agent("Mozilla/5.0").host("www.example.com");
//! let mut jar = CookieJar::new().with_host("www.example.com");
//! authority.request(&client, &mut jar).create(UserId(42), false)?;
//! let set_cookie = jar.set_cookie_headers();
//! assert_eq!(set_cookie.len(), 1);
//!
//! // Follow-up request presenting the cookie.
//! let token = jar.last_issued("s").map(|w| w.value.clone()).unwrap_or_default();
//! let mut jar = CookieJar::from_header(&format!("s={token}"));
//! let mut session = authority.request(&client, &mut jar);
//! assert!(session.is_alive());
//! assert_eq!(session.user_id(), Some(UserId(42)));
//! # Ok(())
//! # }
//! ```

mod error;
pub mod telemetry;

pub use error::StorelessError;

pub use storeless_session as session;
pub use storeless_token as token;
pub use storeless_transport as transport;

/// Everything a request handler usually needs.
pub mod prelude {
    pub use crate::StorelessError;
    pub use storeless_session::{
        generate_secret, Clock, ConfigError, ManualClock, Rejection, RequestSession,
        SessionAuthority, SessionConfig, SessionError, SessionPhase, SessionState, SystemClock,
        TriState,
    };
    pub use storeless_token::{ClientContext, SessionToken, TokenError, UserId};
    pub use storeless_transport::{
        CookieJar, CookieOptions, CookieWrite, DomainScope, Expiry, TokenTransport,
    };
}
