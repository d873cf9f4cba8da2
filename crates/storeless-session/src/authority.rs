//! The process-wide half of the session layer.
//!
//! [`SessionAuthority`] bundles what every request needs and nobody may
//! change: the frozen [`SessionConfig`], the signature engine, the codec
//! and the clock. Build it once at startup, wrap it in an `Arc`, and call
//! [`SessionAuthority::request`] per request.
//!
//! ```text
//! startup:   SessionConfig ──→ SessionAuthority ──→ Arc (shared, read-only)
//! request:   Arc<SessionAuthority> + ClientContext + transport ──→ RequestSession
//! ```

use std::sync::Arc;

use storeless_token::{
    ClientContext, CommaCodec, SessionToken, Signature, SignatureEngine, TokenCodec, UserId,
};
use storeless_transport::TokenTransport;

use crate::{Clock, ConfigError, RequestSession, SessionConfig, SystemClock};

/// Which configured secret a token's signature was made with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretGeneration {
    Current,
    Previous,
}

/// Shared, immutable session machinery.
///
/// `C` is the token codec; almost everyone uses the default
/// [`CommaCodec`].
pub struct SessionAuthority<C: TokenCodec = CommaCodec> {
    config: SessionConfig,
    signer: SignatureEngine,
    codec: C,
    clock: Arc<dyn Clock>,
}

impl SessionAuthority {
    /// Creates an authority with the comma codec and the system clock.
    pub fn new(config: SessionConfig) -> Self {
        let signer = SignatureEngine::new(config.bind_to_client_ip_prefix());
        Self {
            config,
            signer,
            codec: CommaCodec,
            clock: Arc::new(SystemClock),
        }
    }
}

impl<C: TokenCodec> SessionAuthority<C> {
    /// Replaces the clock (tests, simulations).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the token codec.
    pub fn with_codec<D: TokenCodec>(self, codec: D) -> SessionAuthority<D> {
        SessionAuthority {
            config: self.config,
            signer: self.signer,
            codec,
            clock: self.clock,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Current Unix time according to this authority's clock.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Starts the session view of one request.
    pub fn request<'r, T: TokenTransport>(
        &'r self,
        client: &'r ClientContext,
        transport: &'r mut T,
    ) -> RequestSession<'r, T, C> {
        RequestSession::new(self, client, transport)
    }

    /// Builds a token for `user_id` issued at `issued_at`, signed with the
    /// current secret.
    ///
    /// # Errors
    /// [`ConfigError::MissingCurrentSecret`] if no current secret is set.
    pub fn issue(
        &self,
        user_id: UserId,
        remember_me: bool,
        issued_at: u64,
        client: &ClientContext,
    ) -> Result<SessionToken, ConfigError> {
        let secret = self
            .config
            .current_secret()
            .ok_or(ConfigError::MissingCurrentSecret)?;
        let signature = self
            .signer
            .sign(user_id, issued_at, remember_me, secret, client);
        Ok(SessionToken {
            user_id,
            remember_me,
            issued_at,
            signature,
        })
    }

    /// Checks a decoded token's signature against the current secret,
    /// then the previous one. `None` means neither matched.
    pub fn verify(&self, token: &SessionToken, client: &ClientContext) -> Option<SecretGeneration> {
        let signed_with = |secret: &str| {
            let expected: Signature = self.signer.sign(
                token.user_id,
                token.issued_at,
                token.remember_me,
                secret,
                client,
            );
            expected.matches(&token.signature)
        };

        match self.config.current_secret() {
            Some(secret) if signed_with(secret) => return Some(SecretGeneration::Current),
            Some(_) => {}
            None => tracing::warn!("no current secret configured; checking previous secret only"),
        }

        self.config
            .previous_secret()
            .filter(|secret| signed_with(*secret))
            .map(|_| SecretGeneration::Previous)
    }
}
