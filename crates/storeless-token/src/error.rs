//! Error types for the token layer.
//!
//! Each crate in Storeless defines its own error enum. A `TokenError`
//! always means "the text we were handed is not a token we could have
//! issued", never a network or configuration problem.

/// Errors that can occur while decoding a session token.
///
/// Callers treat every variant the same way: the token is discarded and
/// the session is destroyed. The variants exist so that logs can say WHY.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The token did not split into exactly four fields.
    ///
    /// A well-formed token never contains an extra delimiter, so a wrong
    /// field count is a probable tampering attempt rather than a benign
    /// parse failure.
    #[error("malformed token: expected 4 fields, found {fields}")]
    Malformed { fields: usize },

    /// The field count was right but one of the fields could not be
    /// parsed (a non-numeric user id, a remember flag other than 0/1, ...).
    #[error("invalid token field `{field}`")]
    InvalidField { field: &'static str },
}
