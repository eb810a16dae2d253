//! Credential construction.

use crate::config::{OAuthConfig, OAuthTokenKind};
use crate::credential::{Credential, CredentialKind};
use crate::tokens::AccessToken;
use crate::types::{Identity, ProviderName, RealmName};

/// Builds credentials for a single realm.
#[derive(Debug, Clone)]
pub struct CredentialFactory {
    realm: RealmName,
}

impl CredentialFactory {
    pub fn new(realm: RealmName) -> Self {
        Self { realm }
    }

    pub fn realm(&self) -> &RealmName {
        &self.realm
    }

    /// Build the credential for a direct login.
    ///
    /// Pre-authenticated credentials are marked authenticated at creation
    /// and carry the identity's secret; standard ones are not.
    pub fn create(&self, identity: &Identity, pre_authenticated: bool) -> Credential {
        if pre_authenticated {
            self.pre_authenticated(identity)
        } else {
            self.username_password(identity)
        }
    }

    /// Standard credential: identity, realm and role snapshot, no secret.
    pub fn username_password(&self, identity: &Identity) -> Credential {
        Credential::new(
            identity,
            self.realm.clone(),
            false,
            CredentialKind::UsernamePassword { secret: None },
        )
    }

    pub fn pre_authenticated(&self, identity: &Identity) -> Credential {
        Credential::new(
            identity,
            self.realm.clone(),
            true,
            CredentialKind::PreAuthenticated {
                secret: identity.password().cloned(),
            },
        )
    }

    /// OAuth credential for an identity resolved from `resource_owner`.
    ///
    /// It counts as authenticated when the identity has at least one role.
    /// Only [`OAuthTokenKind::RealmBound`] credentials take the
    /// always-authenticated override from `oauth`.
    pub fn oauth(
        &self,
        access_token: AccessToken,
        identity: &Identity,
        resource_owner: ProviderName,
        oauth: &OAuthConfig,
    ) -> Credential {
        let always_authenticated =
            oauth.token_kind == OAuthTokenKind::RealmBound && oauth.always_authenticated;

        Credential::new(
            identity,
            self.realm.clone(),
            !identity.roles().is_empty(),
            CredentialKind::OAuth {
                access_token,
                resource_owner,
                token_kind: oauth.token_kind,
                always_authenticated,
            },
        )
    }
}
