//! Session context passed explicitly into every sync operation.

use std::fmt;

/// Source of the authenticated user, e.g. an auth SDK or a config value.
pub trait SessionProvider: Send + Sync {
    fn current_user_id(&self) -> Option<String>;
}

/// A provider that always reports the same user (or nobody).
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    user_id: Option<String>,
}

impl StaticSession {
    pub fn new(user_id: Option<String>) -> Self {
        Self { user_id }
    }
}

impl SessionProvider for StaticSession {
    fn current_user_id(&self) -> Option<String> {
        self.user_id.clone()
    }
}

/// Identity under which remote rows are written and read.
///
/// Only a [`Session`] hands these out, so gateway calls can never be scoped to
/// an id a caller typed in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteIdentity(String);

impl RemoteIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of who is signed in for the duration of one call.
#[derive(Debug, Clone, Default)]
pub struct Session {
    identity: Option<RemoteIdentity>,
}

impl Session {
    /// No one signed in: remote operations are skipped.
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    pub fn authenticated(user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        if user_id.trim().is_empty() {
            return Self::anonymous();
        }
        Self {
            identity: Some(RemoteIdentity(user_id)),
        }
    }

    pub fn from_provider(provider: &dyn SessionProvider) -> Self {
        match provider.current_user_id() {
            Some(user_id) => Self::authenticated(user_id),
            None => Self::anonymous(),
        }
    }

    pub fn identity(&self) -> Option<&RemoteIdentity> {
        self.identity.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.identity.as_ref().map(RemoteIdentity::as_str)
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}
