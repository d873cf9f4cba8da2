//! One request's view of a storeless session.
//!
//! This is the central piece of the session layer. A [`RequestSession`]
//! borrows the shared [`SessionAuthority`], the request's
//! [`ClientContext`] and its token transport, and answers the questions a
//! handler asks:
//!
//! - `create()`: log a user in (issue a token)
//! - `is_alive()`: is the presented token authentic and fresh?
//! - `is_expired()`: was it authentic but too old?
//! - `keep_alive()`: refresh the token if its time bucket has passed
//! - `destroy()`: log out (remove the token from the client)
//!
//! # No server-side state
//!
//! Nothing here outlives the request. The only memory is the
//! [`SessionState`] memo, so asking `is_alive()` repeatedly costs one
//! signature check and a `destroy()` is respected for the rest of the
//! request.

use storeless_token::{ClientContext, CommaCodec, SessionToken, TokenCodec, UserId};
use storeless_transport::{
    outermost_labels, CookieOptions, DomainScope, Expiry, TokenTransport, NARROW_SCOPE_LABELS,
};

use crate::{
    Rejection, SecretGeneration, SessionAuthority, SessionError, SessionState, TriState,
};

/// Tokens are always readable by the server only and are not restricted
/// to HTTPS.
const TOKEN_SECURE: bool = false;
const TOKEN_HTTP_ONLY: bool = true;

/// Session lifecycle for a single request.
///
/// ## Lifecycle
///
/// ```text
///   create() ─────────────────────────────┐
///                                         ▼
///   is_alive() ──→ decode ──→ ban ──→ signature ──→ expiry ──→ [Alive] ──→ keep_alive()
///                    │         │          │            │
///                    ▼         ▼          ▼            ▼
///                 destroy   [NotAlive]  destroy      destroy + expired
/// ```
pub struct RequestSession<'r, T: TokenTransport, C: TokenCodec = CommaCodec> {
    authority: &'r SessionAuthority<C>,
    client: &'r ClientContext,
    transport: &'r mut T,
    state: SessionState,
}

impl<'r, T: TokenTransport, C: TokenCodec> RequestSession<'r, T, C> {
    /// Starts with a fresh, never-checked state.
    pub fn new(
        authority: &'r SessionAuthority<C>,
        client: &'r ClientContext,
        transport: &'r mut T,
    ) -> Self {
        Self::resume(authority, client, transport, SessionState::default())
    }

    /// Continues with a state produced earlier in the same request (for
    /// example by a middleware that already ran `is_alive()`).
    pub fn resume(
        authority: &'r SessionAuthority<C>,
        client: &'r ClientContext,
        transport: &'r mut T,
        state: SessionState,
    ) -> Self {
        Self {
            authority,
            client,
            transport,
            state,
        }
    }

    // =====================================================================
    // create()
    // =====================================================================

    /// Logs `user_id` in by issuing a fresh token.
    ///
    /// Writes exactly one token through the transport. A remembered
    /// session gets a persistent cookie that outlives the browser; an
    /// ephemeral one gets a browser-session cookie.
    ///
    /// # Errors
    /// - [`SessionError::Config`] if no current secret is configured.
    /// - [`SessionError::Banned`] if the user is on the ban list. No token
    ///   is written and the session stays not alive.
    pub fn create(
        &mut self,
        user_id: UserId,
        remember_me: bool,
    ) -> Result<SessionToken, SessionError> {
        let authority = self.authority;
        let config = authority.config();
        if config.current_secret().is_none() {
            return Err(crate::ConfigError::MissingCurrentSecret.into());
        }
        if config.is_banned(user_id) {
            tracing::info!(%user_id, "refusing to create session for banned user");
            return Err(SessionError::Banned(user_id));
        }

        let now = authority.now();
        let token = authority.issue(user_id, remember_me, now, self.client)?;

        let expiry = if remember_me {
            Expiry::At(now.saturating_add(config.remembered_cookie_secs()))
        } else {
            Expiry::Session
        };
        let options = CookieOptions {
            secure: TOKEN_SECURE,
            http_only: TOKEN_HTTP_ONLY,
            ..CookieOptions::new(expiry)
        };
        let value = authority.codec().encode(&token);
        self.transport
            .set_token(config.token_field_name(), &value, &options);

        self.state = SessionState {
            alive: TriState::Yes,
            expired: TriState::No,
            signed_with_previous_secret: false,
            user_id: Some(user_id),
            remember_me,
            issued_at: now,
            rejection: None,
        };

        tracing::info!(%user_id, remember_me, "session created");
        Ok(token)
    }

    // =====================================================================
    // is_alive()
    // =====================================================================

    /// Returns `true` if the client presented an authentic, unexpired
    /// token for a user who is not banned.
    ///
    /// Computed once per request; later calls return the memo. A
    /// malformed, forged or expired token is removed from the client as a
    /// side effect. A banned user's token is rejected but left in place.
    pub fn is_alive(&mut self) -> bool {
        match self.state.alive {
            TriState::Yes => return true,
            TriState::No => return false,
            TriState::Unknown => {}
        }

        let authority = self.authority;
        let config = authority.config();
        let Some(raw) = self.transport.get_token(config.token_field_name()) else {
            self.reject(Rejection::Missing);
            return false;
        };

        let token = match authority.codec().decode(&raw) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "discarding malformed session token");
                self.destroy();
                self.reject(Rejection::Malformed);
                return false;
            }
        };

        // Checked before the signature and without removing the token.
        if config.is_banned(token.user_id) {
            tracing::info!(user_id = %token.user_id, "rejecting token of banned user");
            self.reject(Rejection::Banned);
            return false;
        }

        match authority.verify(&token, self.client) {
            Some(SecretGeneration::Current) => {}
            Some(SecretGeneration::Previous) => {
                tracing::debug!(
                    user_id = %token.user_id,
                    "token signed with previous secret; will re-sign on refresh"
                );
                self.state.signed_with_previous_secret = true;
            }
            None => {
                tracing::warn!(
                    user_id = %token.user_id,
                    "session token signature mismatch (possible tampering)"
                );
                self.destroy();
                self.reject(Rejection::SignatureMismatch);
                return false;
            }
        }

        self.state.issued_at = token.issued_at;

        let max_age = config.max_age_secs(token.remember_me);
        if token.issued_at.saturating_add(max_age) < authority.now() {
            tracing::debug!(user_id = %token.user_id, "session expired");
            self.destroy();
            self.reject(Rejection::Expired);
            self.state.expired = TriState::Yes;
            return false;
        }

        self.state.expired = TriState::No;
        self.state.alive = TriState::Yes;
        self.state.user_id = Some(token.user_id);
        self.state.remember_me = token.remember_me;
        self.state.rejection = None;
        tracing::debug!(user_id = %token.user_id, "session token accepted");
        true
    }

    // =====================================================================
    // is_expired()
    // =====================================================================

    /// Distinguishes "your session expired" from "you never logged in".
    ///
    /// - `Unknown`: no authentic token was ever seen (no token, banned).
    /// - `Yes`: an authentic token was presented but it was too old.
    /// - `No`: alive, or rejected for another reason (malformed, forged,
    ///   destroyed).
    ///
    /// Runs `is_alive()` first if nothing has been decided yet.
    pub fn is_expired(&mut self) -> TriState {
        if !self.state.expired.is_known() {
            self.is_alive();
        }
        self.state.expired
    }

    // =====================================================================
    // keep_alive()
    // =====================================================================

    /// Re-issues the token when its refresh bucket has passed, or when it
    /// was signed with the previous secret. Returns whether a new token
    /// was written.
    ///
    /// Buckets are `activity_time_bucket_seconds` wide and shifted per
    /// user by `user_id % width`, so users don't all refresh on the same
    /// wall-clock boundary. Does nothing unless the session is alive.
    ///
    /// # Errors
    /// Same as [`create()`](Self::create), which it calls to re-issue.
    pub fn keep_alive(&mut self) -> Result<bool, SessionError> {
        if self.state.alive != TriState::Yes {
            return Ok(false);
        }
        let Some(user_id) = self.state.user_id else {
            return Ok(false);
        };

        let width = self.authority.config().activity_time_bucket_seconds();
        let phase = user_id.get() % width;
        let current_bucket = bucket_start(self.authority.now(), phase, width);
        let issued_bucket = bucket_start(self.state.issued_at, phase, width);

        if current_bucket == issued_bucket && !self.state.signed_with_previous_secret {
            return Ok(false);
        }

        if self.state.signed_with_previous_secret {
            tracing::debug!(%user_id, "re-signing session with current secret");
        } else {
            tracing::debug!(%user_id, "refreshing session token");
        }
        let remember_me = self.state.remember_me;
        self.create(user_id, remember_me)?;
        Ok(true)
    }

    // =====================================================================
    // destroy()
    // =====================================================================

    /// Logs out: marks the session dead for the rest of the request and
    /// removes the token from the client.
    ///
    /// The token is deleted under the default domain scope and under the
    /// host's last two labels, so a token written by another subdomain or
    /// environment can't shadow the next login. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        self.state.alive = TriState::No;
        self.state.expired = TriState::No;

        let name = self.authority.config().token_field_name();
        self.transport
            .delete_token(name, DomainScope::Default, TOKEN_SECURE, TOKEN_HTTP_ONLY);
        match self.client.request_host() {
            Some(host) => self.transport.delete_token(
                name,
                DomainScope::Explicit(outermost_labels(host, NARROW_SCOPE_LABELS).to_string()),
                TOKEN_SECURE,
                TOKEN_HTTP_ONLY,
            ),
            None => tracing::debug!("request host unknown; skipping narrowed token deletion"),
        }

        tracing::info!(user_id = ?self.state.user_id.map(UserId::get), "session destroyed");
    }

    // =====================================================================
    // Accessors
    // =====================================================================

    /// The last validated or created user id, `None` if there was none.
    pub fn user_id(&self) -> Option<UserId> {
        self.state.user_id
    }

    /// The remember flag of the last validated or created token.
    pub fn remember_me(&self) -> bool {
        self.state.remember_me
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Ends the borrow of the transport and hands back the state.
    pub fn into_state(self) -> SessionState {
        self.state
    }

    fn reject(&mut self, reason: Rejection) {
        self.state.alive = TriState::No;
        self.state.rejection = Some(reason);
    }
}

/// Start of the `width`-second bucket containing `t`, shifted by `phase`.
fn bucket_start(t: u64, phase: u64, width: u64) -> u64 {
    let shifted = t.saturating_add(phase);
    shifted - shifted % width
}

#[cfg(test)]
mod tests {
    //! Unit tests for `RequestSession`.
    //!
    //! Naming follows `test_{function}_{scenario}_{expected}`. Time is a
    //! `ManualClock`, so expiry and bucket boundaries are exact.

    use std::sync::Arc;

    use storeless_transport::CookieJar;

    use super::*;
    use crate::{ManualClock, SessionConfig, SessionConfigBuilder};

    const T0: u64 = 1_700_000_000;

    // -- Helpers ----------------------------------------------------------

    fn browser() -> ClientContext {
        ClientContext::new()
            .user_agent("Mozilla/5.0 (Test)")
            .remote_addr("203.0.113.7")
            .host("app.eu.example.com")
    }

    fn authority_with(builder: SessionConfigBuilder, clock: &Arc<ManualClock>) -> SessionAuthority {
        SessionAuthority::new(builder.build().unwrap()).with_clock(clock.clone())
    }

    fn authority(clock: &Arc<ManualClock>) -> SessionAuthority {
        authority_with(SessionConfig::builder().current_secret("s1"), clock)
    }

    /// Issues a token through `create()` and returns the cookie value.
    fn login(auth: &SessionAuthority, user_id: u64, remember_me: bool) -> String {
        let client = browser();
        let mut jar = CookieJar::new().with_host("app.eu.example.com");
        auth.request(&client, &mut jar)
            .create(UserId(user_id), remember_me)
            .unwrap();
        jar.last_issued("s").unwrap().value.clone()
    }

    fn jar_with(token: &str) -> CookieJar {
        let mut jar = CookieJar::new().with_host("app.eu.example.com");
        jar.insert("s", token);
        jar
    }

    fn deletions(jar: &CookieJar) -> Vec<Option<String>> {
        jar.writes()
            .iter()
            .filter(|w| w.is_deletion())
            .map(|w| w.domain.clone())
            .collect()
    }

    // =====================================================================
    // create()
    // =====================================================================

    #[test]
    fn test_create_writes_one_token_and_marks_alive() {
        let clock = Arc::new(ManualClock::new(T0));
        let auth = authority(&clock);
        let client = browser();
        let mut jar = CookieJar::new().with_host("app.eu.example.com");

        let mut session = auth.request(&client, &mut jar);
        let token = session.create(UserId(42), false).unwrap();

        assert!(session.is_alive());
        assert_eq!(session.user_id(), Some(UserId(42)));
        assert_eq!(session.is_expired(), TriState::No);
        assert_eq!(token.issued_at, T0);

        assert_eq!(jar.writes().len(), 1);
        let write = &jar.writes()[0];
        assert_eq!(write.name, "s");
        assert_eq!(write.expiry, Expiry::Session);
        assert_eq!(write.domain.as_deref(), Some("eu.example.com"));
        assert!(write.http_only);
        assert!(!write.secure);
        assert!(write.value.starts_with(&format!("42,0,{T0},")));
    }

    #[test]
    fn test_create_remembered_sets_persistent_expiry() {
        let clock = Arc::new(ManualClock::new(T0));
        let auth = authority(&clock);
        let client = browser();
        let mut jar = CookieJar::new();

        auth.request(&client, &mut jar).create(UserId(1), true).unwrap();

        assert_eq!(jar.writes()[0].expiry, Expiry::At(T0 + 7 * 86_400));
    }

    #[test]
    fn test_create_without_secret_returns_config_error() {
        let clock = Arc::new(ManualClock::new(T0));
        let auth = authority_with(SessionConfig::builder(), &clock);
        let client = browser();
        let mut jar = CookieJar::new();

        let result = auth.request(&client, &mut jar).create(UserId(1), false);

        assert!(matches!(
            result,
            Err(SessionError::Config(crate::ConfigError::MissingCurrentSecret))
        ));
        assert!(jar.writes().is_empty());
    }

    #[test]
    fn test_create_banned_user_returns_error_without_write() {
        let clock = Arc::new(ManualClock::new(T0));
        let auth = authority_with(
            SessionConfig::builder().current_secret("s1").ban(UserId(9)),
            &clock,
        );
        let client = browser();
        let mut jar = CookieJar::new();

        let mut session = auth.request(&client, &mut jar);
        let result = session.create(UserId(9), false);

        assert!(matches!(result, Err(SessionError::Banned(UserId(9)))));
        assert_eq!(session.user_id(), None);
        assert_ne!(session.state().alive(), TriState::Yes);
        drop(session);
        assert!(jar.writes().is_empty());
    }

    // =====================================================================
    // is_alive()
    // =====================================================================

    #[test]
    fn test_is_alive_no_token_is_false_without_writes() {
        let clock = Arc::new(ManualClock::new(T0));
        let auth = authority(&clock);
        let client = browser();
        let mut jar = CookieJar::new();

        let mut session = auth.request(&client, &mut jar);

        assert!(!session.is_alive());
        assert_eq!(session.state().rejection(), Some(Rejection::Missing));
        assert_eq!(session.is_expired(), TriState::Unknown);
        drop(session);
        assert!(jar.writes().is_empty());
    }

    #[test]
    fn test_is_alive_valid_token_records_fields() {
        let clock = Arc::new(ManualClock::new(T0));
        let auth = authority(&clock);
        let token = login(&auth, 42, true);
        clock.advance(30);

        let client = browser();
        let mut jar = jar_with(&token);
        let mut session = auth.request(&client, &mut jar);

        assert!(session.is_alive());
        assert_eq!(session.user_id(), Some(UserId(42)));
        assert!(session.remember_me());
        assert_eq!(session.state().issued_at(), T0);
        assert!(!session.state().signed_with_previous_secret());
        drop(session);
        assert!(jar.writes().is_empty());
    }

    #[test]
    fn test_is_alive_is_memoized() {
        let clock = Arc::new(ManualClock::new(T0));
        let auth = authority(&clock);
        let token = login(&auth, 42, false);

        let client = browser();
        let mut jar = jar_with(&token);
        let mut session = auth.request(&client, &mut jar);
        assert!(session.is_alive());

        // Far past expiry: a fresh check would fail, the memo does not.
        clock.advance(365 * 86_400);
        assert!(session.is_alive());
    }

    #[test]
    fn test_is_alive_malformed_token_destroys() {
        let clock = Arc::new(ManualClock::new(T0));
        let auth = authority(&clock);
        let client = browser();
        let mut jar = jar_with("42,1,1000");

        let mut session = auth.request(&client, &mut jar);

        assert!(!session.is_alive());
        assert_eq!(session.state().rejection(), Some(Rejection::Malformed));
        assert_eq!(session.is_expired(), TriState::No);
        drop(session);
        assert_eq!(
            deletions(&jar),
            vec![Some("eu.example.com".into()), Some("example.com".into())]
        );
    }

    #[test]
    fn test_is_alive_tampered_user_id_destroys() {
        let clock = Arc::new(ManualClock::new(T0));
        let auth = authority(&clock);
        let token = login(&auth, 42, false);
        let forged = token.replacen("42,", "1,", 1);

        let client = browser();
        let mut jar = jar_with(&forged);
        let mut session = auth.request(&client, &mut jar);

        assert!(!session.is_alive());
        assert_eq!(session.state().rejection(), Some(Rejection::SignatureMismatch));
        assert_eq!(session.user_id(), None);
        drop(session);
        assert_eq!(deletions(&jar).len(), 2);
    }

    #[test]
    fn test_is_alive_other_browser_is_rejected() {
        let clock = Arc::new(ManualClock::new(T0));
        let auth = authority(&clock);
        let token = login(&auth, 42, false);

        let thief = ClientContext::new().user_agent("curl/8.5").host("app.eu.example.com");
        let mut jar = jar_with(&token);
        let mut session = auth.request(&thief, &mut jar);

        assert!(!session.is_alive());
        assert_eq!(session.state().rejection(), Some(Rejection::SignatureMismatch));
    }

    #[test]
    fn test_is_alive_banned_user_rejected_without_destroy() {
        let clock = Arc::new(ManualClock::new(T0));
        let token = login(&authority(&clock), 9, false);

        let auth = authority_with(
            SessionConfig::builder().current_secret("s1").ban(UserId(9)),
            &clock,
        );
        let client = browser();
        let mut jar = jar_with(&token);
        let mut session = auth.request(&client, &mut jar);

        assert!(!session.is_alive());
        assert_eq!(session.state().rejection(), Some(Rejection::Banned));
        assert_eq!(session.is_expired(), TriState::Unknown);
        drop(session);
        assert!(jar.writes().is_empty());
    }

    // =====================================================================
    // expiry
    // =====================================================================

    #[test]
    fn test_is_alive_ephemeral_one_second_inside_window_is_alive() {
        let clock = Arc::new(ManualClock::new(T0));
        let auth = authority(&clock);
        let token = login(&auth, 5, false);
        clock.advance(25 * 60 - 1);

        let client = browser();
        let mut jar = jar_with(&token);
        let mut session = auth.request(&client, &mut jar);

        assert!(session.is_alive());
    }

    #[test]
    fn test_is_alive_ephemeral_exactly_at_limit_is_alive() {
        let clock = Arc::new(ManualClock::new(T0));
        let auth = authority(&clock);
        let token = login(&auth, 5, false);
        clock.advance(25 * 60);

        let client = browser();
        let mut jar = jar_with(&token);

        assert!(auth.request(&client, &mut jar).is_alive());
    }

    #[test]
    fn test_is_alive_ephemeral_one_second_past_window_is_expired() {
        let clock = Arc::new(ManualClock::new(T0));
        let auth = authority(&clock);
        let token = login(&auth, 5, false);
        clock.advance(25 * 60 + 1);

        let client = browser();
        let mut jar = jar_with(&token);
        let mut session = auth.request(&client, &mut jar);

        assert!(!session.is_alive());
        assert_eq!(session.is_expired(), TriState::Yes);
        assert_eq!(session.state().rejection(), Some(Rejection::Expired));
        drop(session);
        assert_eq!(deletions(&jar).len(), 2);
    }

    #[test]
    fn test_is_expired_runs_check_when_unknown() {
        let clock = Arc::new(ManualClock::new(T0));
        let auth = authority(&clock);
        let token = login(&auth, 5, true);
        clock.advance(8 * 86_400);

        let client = browser();
        let mut jar = jar_with(&token);
        let mut session = auth.request(&client, &mut jar);

        assert_eq!(session.is_expired(), TriState::Yes);
        assert_eq!(session.state().alive(), TriState::No);
    }

    // =====================================================================
    // keep_alive()
    // =====================================================================

    #[test]
    fn test_keep_alive_not_alive_is_noop() {
        let clock = Arc::new(ManualClock::new(T0));
        let auth = authority(&clock);
        let client = browser();
        let mut jar = CookieJar::new();

        let mut session = auth.request(&client, &mut jar);
        session.is_alive();

        assert!(!session.keep_alive().unwrap());
        drop(session);
        assert!(jar.writes().is_empty());
    }

    #[test]
    fn test_keep_alive_same_bucket_does_not_refresh() {
        // User 0 has no phase shift; start on a bucket boundary.
        let start = T0 - T0 % 180;
        let clock = Arc::new(ManualClock::new(start));
        let auth = authority(&clock);
        let token = login(&auth, 0, false);
        clock.advance(179);

        let client = browser();
        let mut jar = jar_with(&token);
        let mut session = auth.request(&client, &mut jar);
        assert!(session.is_alive());

        assert!(!session.keep_alive().unwrap());
        drop(session);
        assert!(jar.writes().is_empty());
    }

    #[test]
    fn test_keep_alive_next_bucket_refreshes() {
        let start = T0 - T0 % 180;
        let clock = Arc::new(ManualClock::new(start));
        let auth = authority(&clock);
        let token = login(&auth, 0, false);
        clock.advance(180);

        let client = browser();
        let mut jar = jar_with(&token);
        let mut session = auth.request(&client, &mut jar);
        assert!(session.is_alive());

        assert!(session.keep_alive().unwrap());
        assert_eq!(session.state().issued_at(), start + 180);
        drop(session);
        let refreshed = jar.last_issued("s").unwrap();
        assert!(refreshed.value.starts_with(&format!("0,0,{},", start + 180)));
    }

    #[test]
    fn test_keep_alive_phase_shift_moves_boundary_per_user() {
        // User 100 with a 180 s bucket is shifted by 100 s: its boundary
        // sits 80 s after the unshifted one.
        let start = T0 - T0 % 180;
        let clock = Arc::new(ManualClock::new(start));
        let auth = authority(&clock);
        let token = login(&auth, 100, false);

        let client = browser();

        clock.set(start + 79);
        let mut jar = jar_with(&token);
        assert!({
            let mut session = auth.request(&client, &mut jar);
            session.is_alive();
            !session.keep_alive().unwrap()
        });

        clock.set(start + 80);
        let mut jar = jar_with(&token);
        let mut session = auth.request(&client, &mut jar);
        session.is_alive();
        assert!(session.keep_alive().unwrap());
    }

    #[test]
    fn test_keep_alive_right_after_create_does_not_refresh() {
        let clock = Arc::new(ManualClock::new(T0));
        let auth = authority(&clock);
        let client = browser();
        let mut jar = CookieJar::new();

        let mut session = auth.request(&client, &mut jar);
        session.create(UserId(77), false).unwrap();

        assert!(!session.keep_alive().unwrap());
        drop(session);
        assert_eq!(jar.writes().len(), 1);
    }

    #[test]
    fn test_keep_alive_previous_secret_forces_resign() {
        let start = T0 - T0 % 180;
        let clock = Arc::new(ManualClock::new(start));
        let token = login(&authority(&clock), 0, true);

        let rotated = authority_with(
            SessionConfig::builder()
                .current_secret("s2")
                .previous_secret("s1"),
            &clock,
        );
        let client = browser();
        let mut jar = jar_with(&token);
        let mut session = rotated.request(&client, &mut jar);

        assert!(session.is_alive());
        assert!(session.state().signed_with_previous_secret());
        assert!(session.keep_alive().unwrap());
        assert!(!session.state().signed_with_previous_secret());
        drop(session);

        // The re-issued token validates against the current secret alone.
        let reissued = jar.last_issued("s").unwrap().value.clone();
        let current_only = authority_with(SessionConfig::builder().current_secret("s2"), &clock);
        let mut jar = jar_with(&reissued);
        assert!(current_only.request(&client, &mut jar).is_alive());
    }

    // =====================================================================
    // destroy()
    // =====================================================================

    #[test]
    fn test_destroy_deletes_both_scopes_and_kills_session() {
        let clock = Arc::new(ManualClock::new(T0));
        let auth = authority(&clock);
        let token = login(&auth, 42, false);

        let client = browser();
        let mut jar = jar_with(&token);
        let mut session = auth.request(&client, &mut jar);
        assert!(session.is_alive());

        session.destroy();

        assert!(!session.is_alive());
        assert_eq!(session.is_expired(), TriState::No);
        drop(session);
        assert_eq!(
            deletions(&jar),
            vec![Some("eu.example.com".into()), Some("example.com".into())]
        );
    }

    #[test]
    fn test_destroy_twice_is_idempotent() {
        let clock = Arc::new(ManualClock::new(T0));
        let auth = authority(&clock);
        let client = browser();
        let mut jar = CookieJar::new().with_host("app.eu.example.com");

        let mut session = auth.request(&client, &mut jar);
        session.destroy();
        let after_first = session.state().clone();
        session.destroy();

        assert_eq!(session.state(), &after_first);
        assert!(!session.is_alive());
        drop(session);
        assert_eq!(deletions(&jar).len(), 4);
    }

    #[test]
    fn test_destroy_without_host_deletes_default_scope_only() {
        let clock = Arc::new(ManualClock::new(T0));
        let auth = authority(&clock);
        let client = ClientContext::new();
        let mut jar = CookieJar::new();

        auth.request(&client, &mut jar).destroy();

        assert_eq!(deletions(&jar), vec![None]);
    }

    // =====================================================================
    // resume() / into_state()
    // =====================================================================

    #[test]
    fn test_resume_keeps_memoized_answer() {
        let clock = Arc::new(ManualClock::new(T0));
        let auth = authority(&clock);
        let token = login(&auth, 42, false);

        let client = browser();
        let mut jar = jar_with(&token);
        let state = {
            let mut session = auth.request(&client, &mut jar);
            session.is_alive();
            session.into_state()
        };

        let mut empty = CookieJar::new();
        let mut session = RequestSession::resume(&auth, &client, &mut empty, state);
        assert!(session.is_alive());
        assert_eq!(session.user_id(), Some(UserId(42)));
    }
}
