//! The in-session credential.

use serde::Serialize;

use crate::config::OAuthTokenKind;
use crate::tokens::{AccessToken, Secret};
use crate::types::{Identity, ProviderName, RealmName, Role};

/// The closed set of credential shapes.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialKind {
    /// Standard credential for an identity verified by a login form.
    UsernamePassword {
        #[serde(skip)]
        secret: Option<Secret>,
    },

    /// Credential for an identity the caller vouches for.
    PreAuthenticated {
        #[serde(skip)]
        secret: Option<Secret>,
    },

    /// Credential backed by an OAuth provider's access token.
    OAuth {
        #[serde(skip)]
        access_token: AccessToken,
        resource_owner: ProviderName,
        token_kind: OAuthTokenKind,
        always_authenticated: bool,
    },
}

/// "This request is authenticated as X" for one realm.
///
/// Created fresh for every login. The identity and its role set are
/// snapshotted at creation, so later changes to the identity never reach
/// an issued credential.
#[derive(Debug, Clone, Serialize)]
pub struct Credential {
    identity: Identity,
    realm: RealmName,
    roles: Vec<Role>,
    authenticated: bool,
    kind: CredentialKind,
}

impl Credential {
    pub(crate) fn new(
        identity: &Identity,
        realm: RealmName,
        authenticated: bool,
        kind: CredentialKind,
    ) -> Self {
        Self {
            identity: identity.clone(),
            realm,
            roles: identity.roles().to_vec(),
            authenticated,
            kind,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Returns the realm this credential was issued for.
    pub fn realm(&self) -> &RealmName {
        &self.realm
    }

    /// Returns the role snapshot taken at creation.
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn kind(&self) -> &CredentialKind {
        &self.kind
    }

    /// Returns whether the credential counts as authenticated.
    ///
    /// OAuth credentials with the always-authenticated override report
    /// true regardless of the flag set at creation.
    pub fn is_authenticated(&self) -> bool {
        match self.kind {
            CredentialKind::OAuth {
                always_authenticated: true,
                ..
            } => true,
            _ => self.authenticated,
        }
    }

    /// Returns the OAuth provider name for OAuth credentials.
    pub fn resource_owner(&self) -> Option<&ProviderName> {
        match &self.kind {
            CredentialKind::OAuth { resource_owner, .. } => Some(resource_owner),
            _ => None,
        }
    }

    /// Returns the OAuth access token for OAuth credentials.
    pub fn access_token(&self) -> Option<&AccessToken> {
        match &self.kind {
            CredentialKind::OAuth { access_token, .. } => Some(access_token),
            _ => None,
        }
    }

    /// Returns the secret carried by password-style credentials.
    pub fn secret(&self) -> Option<&Secret> {
        match &self.kind {
            CredentialKind::UsernamePassword { secret }
            | CredentialKind::PreAuthenticated { secret } => secret.as_ref(),
            CredentialKind::OAuth { .. } => None,
        }
    }
}
