//! Session configuration bundle handed to the query engine.

use std::fmt;

/// Default endpoint port when a host override is given.
pub const DEFAULT_PORT: u16 = 80;

/// Everything the engine needs to open one connected session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// AWS region name. When `None` the engine resolves its own default.
    pub region: Option<String>,
    /// Named credentials profile.
    pub profile: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub session_token: Option<String>,
    /// Host override, e.g. a local DynamoDB instance.
    pub host: Option<String>,
    pub port: u16,
    /// Use https for the host override.
    pub is_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            region: None,
            profile: None,
            access_key: None,
            secret_key: None,
            session_token: None,
            host: None,
            port: DEFAULT_PORT,
            is_secure: true,
        }
    }
}

impl SessionConfig {
    pub fn for_region(region: impl Into<String>) -> Self {
        Self {
            region: Some(region.into()),
            ..Self::default()
        }
    }

    /// Endpoint override URL, only present when a host is set.
    pub fn endpoint_url(&self) -> Option<String> {
        let host = self.host.as_deref()?;
        let scheme = if self.is_secure { "https" } else { "http" };
        Some(format!("{scheme}://{host}:{}", self.port))
    }

    /// Static credentials, only present when an access key is set.
    pub fn credentials(&self) -> Option<Credentials> {
        let access_key = self.access_key.clone()?;
        Some(Credentials {
            access_key,
            secret_key: self.secret_key.clone(),
            session_token: self.session_token.clone(),
        })
    }
}

/// Static access key credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: Option<String>,
    pub session_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "***"))
            .field("session_token", &self.session_token.as_ref().map(|_| "***"))
            .finish()
    }
}
