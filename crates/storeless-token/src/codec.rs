//! Codec trait and the comma-delimited token format.
//!
//! A "codec" (coder/decoder) converts between a [`SessionToken`] and the
//! text that ends up in the cookie. The session layer only needs
//! something that implements [`TokenCodec`]; [`CommaCodec`] is the format
//! every Storeless deployment speaks today:
//!
//! ```text
//! <user_id>,<remember_me:0|1>,<issued_at>,<signature>
//! 42,1,1000,9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08
//! ```
//!
//! No escaping is performed. The numeric fields and the hex signature can
//! never contain the delimiter, so the field count alone tells a real
//! token from a tampered one.

use crate::{Signature, SessionToken, TokenError, UserId};

/// Separator between token fields.
pub const FIELD_DELIMITER: char = ',';

/// Number of fields in a well-formed token.
pub const FIELD_COUNT: usize = 4;

/// Turns tokens into cookie text and back.
///
/// `Send + Sync + 'static` so a codec can live inside the process-wide
/// session authority and be used from any request thread.
pub trait TokenCodec: Send + Sync + 'static {
    /// Serializes a token.
    fn encode(&self, token: &SessionToken) -> String;

    /// Parses cookie text into a token.
    ///
    /// # Errors
    /// - [`TokenError::Malformed`] if the text does not have exactly four
    ///   fields.
    /// - [`TokenError::InvalidField`] if a field can't be parsed.
    fn decode(&self, text: &str) -> Result<SessionToken, TokenError>;
}

// ---------------------------------------------------------------------------
// CommaCodec
// ---------------------------------------------------------------------------

/// The four-field, comma-delimited token format.
///
/// ## Example
///
/// ```rust
/// use storeless_token::{CommaCodec, TokenCodec, SessionToken, Signature, UserId};
///
/// let token = SessionToken {
///     user_id: UserId(42),
///     remember_me: true,
///     issued_at: 1000,
///     signature: Signature::new("ab12"),
/// };
///
/// let text = CommaCodec.encode(&token);
/// assert_eq!(text, "42,1,1000,ab12");
/// assert_eq!(CommaCodec.decode(&text).unwrap(), token);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CommaCodec;

impl TokenCodec for CommaCodec {
    fn encode(&self, token: &SessionToken) -> String {
        format!(
            "{}{d}{}{d}{}{d}{}",
            token.user_id,
            if token.remember_me { '1' } else { '0' },
            token.issued_at,
            token.signature.as_str(),
            d = FIELD_DELIMITER,
        )
    }

    fn decode(&self, text: &str) -> Result<SessionToken, TokenError> {
        let fields: Vec<&str> = text.split(FIELD_DELIMITER).collect();
        // Checked before any parsing: a wrong count is the tampering signal.
        let [user_id, remember_me, issued_at, signature] = fields.as_slice() else {
            return Err(TokenError::Malformed {
                fields: fields.len(),
            });
        };

        let remember_me = match *remember_me {
            "1" => true,
            "0" => false,
            _ => {
                return Err(TokenError::InvalidField {
                    field: "remember_me",
                })
            }
        };

        Ok(SessionToken {
            user_id: UserId(parse_unsigned(user_id, "user_id")?),
            remember_me,
            issued_at: parse_unsigned(issued_at, "issued_at")?,
            signature: Signature::new(*signature),
        })
    }
}

/// Parses a plain run of ASCII digits. `str::parse::<u64>` alone would
/// also take `+42`, which is not something we ever emit.
fn parse_unsigned(field: &str, name: &'static str) -> Result<u64, TokenError> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TokenError::InvalidField { field: name });
    }
    field
        .parse()
        .map_err(|_| TokenError::InvalidField { field: name })
}
