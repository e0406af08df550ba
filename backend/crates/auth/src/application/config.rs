//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::str::FromStr;
use std::time::Duration;

use platform::cookie::CookieConfig;
pub use platform::cookie::SameSite;
pub use platform::password::HashingParams;
use thiserror::Error;

use crate::domain::value_object::user_name::UsernameCase;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session lifetime. `None` keeps sessions until logout.
    pub session_ttl: Option<Duration>,
    /// User name case policy, fixed for the lifetime of the database
    pub username_case: UsernameCase,
    /// Argon2id costs for new hashes
    pub password_hashing: HashingParams,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Session cookie name
    pub session_cookie_name: String,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl: Some(Duration::from_secs(12 * 3600)), // 12 hours
            username_case: UsernameCase::CaseSensitive,
            password_hashing: HashingParams::default(),
            password_pepper: None,
            session_cookie_name: "sid".to_string(),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
        }
    }
}

impl AuthConfig {
    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Default::default()
        }
    }

    /// Cheapest hashing costs argon2 accepts. Never use outside tests.
    pub fn for_tests() -> Self {
        Self {
            password_hashing: HashingParams::minimal(),
            cookie_secure: false,
            ..Default::default()
        }
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    /// Cookie attributes for the session cookie. Max-Age follows the TTL.
    pub fn cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: self.session_ttl.map(|ttl| ttl.as_secs()),
        }
    }
}

/// Environment variable that failed to parse
#[derive(Debug, Error)]
#[error("Invalid value for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub reason: String,
}

fn parse_var<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError {
        key,
        reason: e.to_string(),
    })
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError {
            key,
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

impl AuthConfig {
    /// Load from the process environment. Unset variables keep the
    /// defaults (development defaults in debug builds).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup
    ///
    /// | Variable | Meaning |
    /// |---|---|
    /// | `SESSION_TTL_SECS` | Session lifetime; `0` keeps sessions until logout |
    /// | `ARGON2_MEMORY_KIB` / `ARGON2_ITERATIONS` / `ARGON2_PARALLELISM` | Hashing costs |
    /// | `PASSWORD_PEPPER` | Standard base64 secret |
    /// | `COOKIE_SECURE` | Secure cookie attribute |
    /// | `USERNAME_CASE_INSENSITIVE` | Fold user names to lowercase |
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = if cfg!(debug_assertions) {
            Self::development()
        } else {
            Self::default()
        };

        if let Some(raw) = lookup("SESSION_TTL_SECS") {
            let secs: u64 = parse_var("SESSION_TTL_SECS", &raw)?;
            config.session_ttl = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(raw) = lookup("ARGON2_MEMORY_KIB") {
            config.password_hashing.memory_kib = parse_var("ARGON2_MEMORY_KIB", &raw)?;
        }
        if let Some(raw) = lookup("ARGON2_ITERATIONS") {
            config.password_hashing.iterations = parse_var("ARGON2_ITERATIONS", &raw)?;
        }
        if let Some(raw) = lookup("ARGON2_PARALLELISM") {
            config.password_hashing.parallelism = parse_var("ARGON2_PARALLELISM", &raw)?;
        }
        if let Some(raw) = lookup("PASSWORD_PEPPER") {
            let pepper = platform::crypto::from_base64(raw.trim()).map_err(|e| ConfigError {
                key: "PASSWORD_PEPPER",
                reason: e.to_string(),
            })?;
            config.password_pepper = (!pepper.is_empty()).then_some(pepper);
        }
        if let Some(raw) = lookup("COOKIE_SECURE") {
            config.cookie_secure = parse_flag("COOKIE_SECURE", &raw)?;
        }
        if let Some(raw) = lookup("USERNAME_CASE_INSENSITIVE") {
            config.username_case = if parse_flag("USERNAME_CASE_INSENSITIVE", &raw)? {
                UsernameCase::CaseInsensitive
            } else {
                UsernameCase::CaseSensitive
            };
        }

        Ok(config)
    }
}
