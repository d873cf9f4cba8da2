//! Unified error type for the Storeless crates.

use storeless_session::{ConfigError, SessionError};
use storeless_token::TokenError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum StorelessError {
    /// A token could not be decoded.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// The session configuration is invalid or incomplete.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A session operation was refused (banned user, missing secret).
    #[error(transparent)]
    Session(#[from] SessionError),
}
