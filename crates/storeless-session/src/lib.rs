//! Storeless sessions: per-request login state with no server-side store.
//!
//! A logged-in user carries a signed token (normally a cookie). Every
//! request re-derives the session from that token alone:
//!
//! 1. **Configuration**: secrets, lifetimes and the ban list, frozen at
//!    startup ([`SessionConfig`])
//! 2. **Authority**: the shared, read-only machinery built from it
//!    ([`SessionAuthority`])
//! 3. **Request session**: the per-request lifecycle of create, check,
//!    refresh and destroy ([`RequestSession`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Application (above)  ← asks "who is this?" and "log them in/out"
//!     ↕
//! Session Layer (this crate)  ← decides liveness, expiry and refresh
//!     ↕
//! Token + Transport (below)  ← signatures, wire format, cookie writes
//! ```

mod authority;
mod clock;
mod config;
mod error;
mod request;
mod state;

pub use authority::{SecretGeneration, SessionAuthority};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    generate_secret, SessionConfig, SessionConfigBuilder, DEFAULT_ACTIVITY_TIME_BUCKET_SECONDS,
    DEFAULT_EPHEMERAL_EXPIRY_MINUTES, DEFAULT_REMEMBERED_EXPIRY_DAYS, DEFAULT_TOKEN_FIELD_NAME,
    RECOGNIZED_KEYS,
};
pub use error::{ConfigError, SessionError};
pub use request::RequestSession;
pub use state::{Rejection, SessionPhase, SessionState, TriState};
