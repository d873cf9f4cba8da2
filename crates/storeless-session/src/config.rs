//! Process-wide session configuration.
//!
//! Built once at startup, validated, then frozen: a [`SessionConfig`] has
//! no setters. It is shared with every request through the
//! [`SessionAuthority`](crate::SessionAuthority), so requests only ever
//! read it and no locking is needed.
//!
//! Two ways in:
//!
//! - [`SessionConfig::builder`] for code.
//! - [`SessionConfig::from_json_str`] / [`SessionConfig::from_json_value`]
//!   for a configuration file. Keys are checked against
//!   [`RECOGNIZED_KEYS`]; a typo is a hard error, not a silently ignored
//!   setting.

use std::collections::HashSet;

use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use storeless_token::UserId;

use crate::ConfigError;

/// Every key a configuration document may contain.
pub const RECOGNIZED_KEYS: [&str; 8] = [
    "current_secret",
    "previous_secret",
    "token_field_name",
    "activity_time_bucket_seconds",
    "remembered_expiry_days",
    "ephemeral_expiry_minutes",
    "bind_to_client_ip_prefix",
    "banned_user_ids",
];

/// Default cookie name.
pub const DEFAULT_TOKEN_FIELD_NAME: &str = "s";
/// Default refresh granularity: 3 minutes.
pub const DEFAULT_ACTIVITY_TIME_BUCKET_SECONDS: u64 = 180;
/// Default lifetime of a "remember me" session: 1 week.
pub const DEFAULT_REMEMBERED_EXPIRY_DAYS: u64 = 7;
/// Default idle lifetime of an ephemeral session: 25 minutes.
pub const DEFAULT_EPHEMERAL_EXPIRY_MINUTES: u64 = 25;

const SECONDS_PER_DAY: u64 = 86_400;
const SECONDS_PER_MINUTE: u64 = 60;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Secrets, timeouts and options for storeless sessions.
///
/// Secrets are held as [`SecretString`], so `{:?}` on a config never
/// prints them.
#[derive(Debug)]
pub struct SessionConfig {
    current_secret: Option<SecretString>,
    previous_secret: Option<SecretString>,
    token_field_name: String,
    activity_time_bucket_seconds: u64,
    remembered_expiry_days: u64,
    ephemeral_expiry_minutes: u64,
    bind_to_client_ip_prefix: bool,
    banned_user_ids: HashSet<UserId>,
}

impl SessionConfig {
    /// Starts a builder with the default values.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Parses a JSON object of configuration keys.
    ///
    /// # Errors
    /// - [`ConfigError::Parse`] if the text is not JSON.
    /// - Anything [`SessionConfig::from_json_value`] returns.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        Self::from_json_value(value)
    }

    /// Builds a config from a JSON object. Keys not present keep their
    /// defaults.
    ///
    /// # Errors
    /// - [`ConfigError::NotAnObject`] if `value` is not an object.
    /// - [`ConfigError::UnknownKey`] for the first key outside
    ///   [`RECOGNIZED_KEYS`].
    /// - [`ConfigError::Parse`] if a value has the wrong type.
    /// - [`ConfigError::InvalidValue`] if a value fails validation.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let object = value.as_object().ok_or(ConfigError::NotAnObject)?;
        if let Some(unknown) = object
            .keys()
            .find(|key| !RECOGNIZED_KEYS.contains(&key.as_str()))
        {
            return Err(ConfigError::UnknownKey(unknown.clone()));
        }

        let raw: RawConfig = serde_json::from_value(value)?;
        raw.into_builder().build()
    }

    /// The secret new tokens are signed with, if configured.
    pub fn current_secret(&self) -> Option<&str> {
        self.current_secret.as_ref().map(|s| s.expose_secret())
    }

    /// The secret from before the last rotation, if configured.
    pub fn previous_secret(&self) -> Option<&str> {
        self.previous_secret.as_ref().map(|s| s.expose_secret())
    }

    /// Name of the cookie that carries the token.
    pub fn token_field_name(&self) -> &str {
        &self.token_field_name
    }

    /// Width of the refresh bucket in seconds (always > 0).
    pub fn activity_time_bucket_seconds(&self) -> u64 {
        self.activity_time_bucket_seconds
    }

    pub fn remembered_expiry_days(&self) -> u64 {
        self.remembered_expiry_days
    }

    pub fn ephemeral_expiry_minutes(&self) -> u64 {
        self.ephemeral_expiry_minutes
    }

    /// Whether the first segment of the client IP is signed.
    pub fn bind_to_client_ip_prefix(&self) -> bool {
        self.bind_to_client_ip_prefix
    }

    /// Returns `true` if tokens for `user_id` must be rejected.
    pub fn is_banned(&self, user_id: UserId) -> bool {
        self.banned_user_ids.contains(&user_id)
    }

    pub fn banned_user_ids(&self) -> &HashSet<UserId> {
        &self.banned_user_ids
    }

    /// How long (seconds) a token lives after its `issued_at`.
    pub fn max_age_secs(&self, remember_me: bool) -> u64 {
        if remember_me {
            self.remembered_expiry_days.saturating_mul(SECONDS_PER_DAY)
        } else {
            self.ephemeral_expiry_minutes
                .saturating_mul(SECONDS_PER_MINUTE)
        }
    }

    /// Cookie lifetime (seconds) for a remembered session.
    pub fn remembered_cookie_secs(&self) -> u64 {
        self.max_age_secs(true)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`SessionConfig`].
///
/// ```rust
/// use storeless_session::SessionConfig;
/// use storeless_token::UserId;
///
/// let config = SessionConfig::builder()
///     .current_secret("s2")
///     .previous_secret("s1")
///     .ban(UserId(13))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.current_secret(), Some("s2"));
/// assert!(config.is_banned(UserId(13)));
/// ```
#[derive(Debug)]
pub struct SessionConfigBuilder {
    current_secret: Option<SecretString>,
    previous_secret: Option<SecretString>,
    token_field_name: String,
    activity_time_bucket_seconds: u64,
    remembered_expiry_days: u64,
    ephemeral_expiry_minutes: u64,
    bind_to_client_ip_prefix: bool,
    banned_user_ids: HashSet<UserId>,
}

impl Default for SessionConfigBuilder {
    fn default() -> Self {
        Self {
            current_secret: None,
            previous_secret: None,
            token_field_name: DEFAULT_TOKEN_FIELD_NAME.to_string(),
            activity_time_bucket_seconds: DEFAULT_ACTIVITY_TIME_BUCKET_SECONDS,
            remembered_expiry_days: DEFAULT_REMEMBERED_EXPIRY_DAYS,
            ephemeral_expiry_minutes: DEFAULT_EPHEMERAL_EXPIRY_MINUTES,
            bind_to_client_ip_prefix: false,
            banned_user_ids: HashSet::new(),
        }
    }
}

impl SessionConfigBuilder {
    pub fn current_secret(mut self, secret: impl Into<String>) -> Self {
        self.current_secret = Some(SecretString::from(secret.into()));
        self
    }

    pub fn previous_secret(mut self, secret: impl Into<String>) -> Self {
        self.previous_secret = Some(SecretString::from(secret.into()));
        self
    }

    pub fn token_field_name(mut self, name: impl Into<String>) -> Self {
        self.token_field_name = name.into();
        self
    }

    pub fn activity_time_bucket_seconds(mut self, seconds: u64) -> Self {
        self.activity_time_bucket_seconds = seconds;
        self
    }

    pub fn remembered_expiry_days(mut self, days: u64) -> Self {
        self.remembered_expiry_days = days;
        self
    }

    pub fn ephemeral_expiry_minutes(mut self, minutes: u64) -> Self {
        self.ephemeral_expiry_minutes = minutes;
        self
    }

    pub fn bind_to_client_ip_prefix(mut self, enabled: bool) -> Self {
        self.bind_to_client_ip_prefix = enabled;
        self
    }

    /// Adds one user id to the ban list.
    pub fn ban(mut self, user_id: UserId) -> Self {
        self.banned_user_ids.insert(user_id);
        self
    }

    /// Replaces the ban list.
    pub fn banned_user_ids(mut self, ids: impl IntoIterator<Item = UserId>) -> Self {
        self.banned_user_ids = ids.into_iter().collect();
        self
    }

    /// Validates and freezes the configuration.
    ///
    /// A missing current secret is allowed here (tokens can still be
    /// checked against a previous secret during a rotation window); it is
    /// reported when a token is issued.
    ///
    /// # Errors
    /// [`ConfigError::InvalidValue`] for an empty secret, a zero bucket
    /// width or expiry, or a cookie name that can't appear in a header.
    pub fn build(self) -> Result<SessionConfig, ConfigError> {
        for (key, secret) in [
            ("current_secret", &self.current_secret),
            ("previous_secret", &self.previous_secret),
        ] {
            if secret
                .as_ref()
                .is_some_and(|s| s.expose_secret().is_empty())
            {
                return Err(invalid(key, "must not be empty"));
            }
        }
        if self.activity_time_bucket_seconds == 0 {
            return Err(invalid("activity_time_bucket_seconds", "must be greater than 0"));
        }
        if self.remembered_expiry_days == 0 {
            return Err(invalid("remembered_expiry_days", "must be greater than 0"));
        }
        if self.ephemeral_expiry_minutes == 0 {
            return Err(invalid("ephemeral_expiry_minutes", "must be greater than 0"));
        }
        validate_token_field_name(&self.token_field_name)?;

        Ok(SessionConfig {
            current_secret: self.current_secret,
            previous_secret: self.previous_secret,
            token_field_name: self.token_field_name,
            activity_time_bucket_seconds: self.activity_time_bucket_seconds,
            remembered_expiry_days: self.remembered_expiry_days,
            ephemeral_expiry_minutes: self.ephemeral_expiry_minutes,
            bind_to_client_ip_prefix: self.bind_to_client_ip_prefix,
            banned_user_ids: self.banned_user_ids,
        })
    }
}

fn invalid(key: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        reason: reason.to_string(),
    }
}

fn validate_token_field_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(invalid("token_field_name", "must not be empty"));
    }
    if name
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '=' | ';' | ','))
    {
        return Err(invalid(
            "token_field_name",
            "must not contain whitespace, control characters, '=', ';' or ','",
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON shape
// ---------------------------------------------------------------------------

/// Mirror of [`RECOGNIZED_KEYS`] for serde. `deny_unknown_fields` backs up
/// the explicit allow-list check in `from_json_value`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    current_secret: Option<String>,
    previous_secret: Option<String>,
    token_field_name: Option<String>,
    activity_time_bucket_seconds: Option<u64>,
    remembered_expiry_days: Option<u64>,
    ephemeral_expiry_minutes: Option<u64>,
    bind_to_client_ip_prefix: Option<bool>,
    #[serde(default)]
    banned_user_ids: Vec<UserId>,
}

impl RawConfig {
    fn into_builder(self) -> SessionConfigBuilder {
        let mut builder = SessionConfig::builder().banned_user_ids(self.banned_user_ids);
        if let Some(secret) = self.current_secret {
            builder = builder.current_secret(secret);
        }
        if let Some(secret) = self.previous_secret {
            builder = builder.previous_secret(secret);
        }
        if let Some(name) = self.token_field_name {
            builder = builder.token_field_name(name);
        }
        if let Some(seconds) = self.activity_time_bucket_seconds {
            builder = builder.activity_time_bucket_seconds(seconds);
        }
        if let Some(days) = self.remembered_expiry_days {
            builder = builder.remembered_expiry_days(days);
        }
        if let Some(minutes) = self.ephemeral_expiry_minutes {
            builder = builder.ephemeral_expiry_minutes(minutes);
        }
        if let Some(enabled) = self.bind_to_client_ip_prefix {
            builder = builder.bind_to_client_ip_prefix(enabled);
        }
        builder
    }
}

// ---------------------------------------------------------------------------
// Secret provisioning
// ---------------------------------------------------------------------------

/// Generates a fresh signing secret: 32 random bytes as 64 hex characters.
///
/// Rotation is: move the old `current_secret` to `previous_secret`, put
/// the output of this function in `current_secret`, restart. Tokens signed
/// with the old secret keep working and are re-signed on their next
/// refresh.
pub fn generate_secret() -> SecretString {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    SecretString::from(hex)
}
