use serde::{Deserialize, Serialize};

/// User information persisted in the authenticated session.
///
/// The identity only carries what the external auth provider vouches for.
/// Company, role and permissions are resolved separately from memberships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    subject: String,
    email: Option<String>,
}

impl UserIdentity {
    /// Creates a user identity from authentication data.
    #[must_use]
    pub fn new(subject: impl Into<String>, email: Option<String>) -> Self {
        Self {
            subject: subject.into(),
            email,
        }
    }

    /// Returns the stable subject claim from the identity provider.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the email, if the provider returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

/// Session state observed by the permission resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// The session check has not completed yet.
    Loading,
    /// The session check completed without an identity.
    Anonymous,
    /// The session carries an authenticated identity.
    Authenticated(UserIdentity),
}

impl SessionState {
    /// Wraps an optional identity read from a completed session check.
    #[must_use]
    pub fn from_identity(identity: Option<UserIdentity>) -> Self {
        identity.map_or(Self::Anonymous, Self::Authenticated)
    }

    /// Returns the identity when the session is authenticated.
    #[must_use]
    pub fn identity(&self) -> Option<&UserIdentity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            Self::Loading | Self::Anonymous => None,
        }
    }

    /// Returns whether the session check is still pending.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}
