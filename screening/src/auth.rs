use serde::Deserialize;
use std::fmt;

/// Username/password pair typed on the login page.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Decides whether a login attempt may proceed.
pub trait Authenticator: Send + Sync {
    fn validate(&self, credentials: &Credentials) -> bool;
}

/// Exact match against one configured pair.
///
/// Demo-only: there is no hashing, lockout or user store behind it.
#[derive(Clone)]
pub struct StaticCredentials {
    expected: Credentials,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            expected: Credentials::new(username, password),
        }
    }
}

impl Authenticator for StaticCredentials {
    fn validate(&self, credentials: &Credentials) -> bool {
        credentials == &self.expected
    }
}
