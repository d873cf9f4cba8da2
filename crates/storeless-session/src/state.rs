//! Per-request session state.
//!
//! A [`SessionState`] lives for exactly one request. It remembers what the
//! token check concluded so that asking "is this session alive?" five
//! times during a request costs one signature check, and so that a
//! `destroy()` earlier in the request is respected later in it.

use storeless_token::UserId;

// ---------------------------------------------------------------------------
// TriState
// ---------------------------------------------------------------------------

/// A memoized yes/no answer that may not have been computed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriState {
    /// Not computed (or not applicable).
    #[default]
    Unknown,
    Yes,
    No,
}

impl TriState {
    pub fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// `Some(true)` / `Some(false)` once known, `None` before.
    pub fn as_option(self) -> Option<bool> {
        match self {
            Self::Unknown => None,
            Self::Yes => Some(true),
            Self::No => Some(false),
        }
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value { Self::Yes } else { Self::No }
    }
}

// ---------------------------------------------------------------------------
// Rejection
// ---------------------------------------------------------------------------

/// Why the last liveness check said "no".
///
/// Diagnostic only: callers see every rejection as "not alive", and only
/// [`Rejection::Expired`] is distinguishable through `is_expired()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The client sent no token.
    Missing,
    /// The token did not decode into four valid fields.
    Malformed,
    /// The token's user id is on the ban list.
    Banned,
    /// Neither the current nor the previous secret produced the signature.
    SignatureMismatch,
    /// The token was authentic but too old.
    Expired,
}

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// Where a request's session sits in its lifecycle.
///
/// ```text
///                      ┌──→ Alive
///   NeverChecked ──────┤
///                      └──→ NotAlive ─┬─ NeverWasAlive     (expired: Unknown)
///                                     ├─ ExpiredOrInvalid  (expired: Yes)
///                                     └─ RejectedOtherwise (expired: No)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NeverChecked,
    Alive,
    NeverWasAlive,
    ExpiredOrInvalid,
    RejectedOtherwise,
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Everything the session layer has learned during this request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub(crate) alive: TriState,
    pub(crate) expired: TriState,
    pub(crate) signed_with_previous_secret: bool,
    pub(crate) user_id: Option<UserId>,
    pub(crate) remember_me: bool,
    pub(crate) issued_at: u64,
    pub(crate) rejection: Option<Rejection>,
}

impl SessionState {
    pub fn alive(&self) -> TriState {
        self.alive
    }

    pub fn expired(&self) -> TriState {
        self.expired
    }

    /// `true` if the token only validated against the previous secret and
    /// will be re-signed on the next `keep_alive()`.
    pub fn signed_with_previous_secret(&self) -> bool {
        self.signed_with_previous_secret
    }

    /// The last validated or created user id.
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn remember_me(&self) -> bool {
        self.remember_me
    }

    /// `issued_at` of the validated or created token (0 if none).
    pub fn issued_at(&self) -> u64 {
        self.issued_at
    }

    pub fn rejection(&self) -> Option<Rejection> {
        self.rejection
    }

    pub fn phase(&self) -> SessionPhase {
        match (self.alive, self.expired) {
            (TriState::Unknown, _) => SessionPhase::NeverChecked,
            (TriState::Yes, _) => SessionPhase::Alive,
            (TriState::No, TriState::Unknown) => SessionPhase::NeverWasAlive,
            (TriState::No, TriState::Yes) => SessionPhase::ExpiredOrInvalid,
            (TriState::No, TriState::No) => SessionPhase::RejectedOtherwise,
        }
    }
}
