//! Session token wire format for Storeless.
//!
//! This crate defines what a client carries around between requests:
//!
//! - **Types** ([`SessionToken`], [`UserId`], [`Signature`]): the four
//!   fields that make up a token.
//! - **Codec** ([`TokenCodec`] trait, [`CommaCodec`]): how a token is
//!   turned into the cookie value and back.
//! - **Signature engine** ([`SignatureEngine`]): the keyed hash that
//!   makes a token tamper-evident.
//! - **Client context** ([`ClientContext`]): the request facts a
//!   signature is bound to.
//! - **Errors** ([`TokenError`]): what can go wrong while decoding.
//!
//! # Architecture
//!
//! The token layer has no idea about cookies, expiry policies or ban lists.
//! It only knows how to build, serialize, parse and sign a token.
//!
//! ```text
//! Transport (cookie text) → Token (SessionToken) → Session (alive / expired)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod context;
mod error;
mod signature;
mod token;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::{CommaCodec, TokenCodec, FIELD_COUNT, FIELD_DELIMITER};
pub use context::ClientContext;
pub use error::TokenError;
pub use signature::{SignatureEngine, SIGNATURE_HEX_LEN};
pub use token::{Signature, SessionToken, UserId};
