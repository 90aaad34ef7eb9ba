use serde::{Deserialize, Serialize};

/// The identity record returned by the external auth collaborator.
///
/// How the credential exchange works is outside this crate; this is only the
/// shape of the record handed back once it succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,

    #[serde(default)]
    pub avatar_url: Option<String>,

    #[serde(default)]
    pub email_verified: bool,
}

/// Authentication context, passed explicitly into anything that gates on it.
///
/// Constructed once at the boundary from the auth collaborator's response and
/// handed down; nothing downstream reaches into ambient session state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
    #[serde(default)]
    pub identity: Option<Identity>,

    /// Whether the authenticated user already has a profile.
    #[serde(default)]
    pub has_profile: bool,

    /// Handle of that profile, when one exists.
    #[serde(default)]
    pub profile_username: Option<String>,
}

impl AuthState {
    /// The unauthenticated state.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_profile(mut self, username: impl Into<String>) -> Self {
        self.has_profile = true;
        self.profile_username = Some(username.into());
        self
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}
