//! Error types for the session layer.
//!
//! Only misuse surfaces as an error here. A forged, malformed, expired or
//! banned token is an everyday event and is reported as "not alive", never
//! as an `Err`.

use storeless_token::UserId;

/// Problems with the process-wide session configuration.
///
/// These are programming or deployment mistakes: they should stop the
/// process at startup (or fail the one call that exposed them), not be
/// retried.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration key outside the recognized allow-list.
    #[error("config name \"{0}\" is not valid")]
    UnknownKey(String),

    /// A session was about to be issued with no current secret configured.
    #[error("a current secret is required to issue sessions")]
    MissingCurrentSecret,

    /// A recognized key with a value that can't be used.
    #[error("invalid value for \"{key}\": {reason}")]
    InvalidValue { key: &'static str, reason: String },

    /// The configuration document was not a JSON object.
    #[error("configuration must be a JSON object")]
    NotAnObject,

    /// The configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors returned by session operations that issue tokens.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session configuration is unusable for this operation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The user id is on the ban list; no token was issued.
    #[error("user {0} is banned")]
    Banned(UserId),
}
