//! Composition root: one login manager per configured realm.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::debug;

use crate::Result;
use crate::config::LoginConfig;
use crate::error::{ConfigurationError, NotFoundError};
use crate::manager::{LoginManager, LoginServices, OAuthServices};
use crate::traits::{OAuthUserResolver, RememberMe, ResourceOwnerMap};
use crate::types::RealmName;

/// Everything the registry can wire into a manager.
///
/// Remember-me services and resource-owner maps are registered per realm;
/// OAuth user resolvers are registered under the name managers refer to
/// in `oauth.user_provider`.
#[derive(Clone)]
pub struct Collaborators {
    services: LoginServices,
    persistent_remember_me: HashMap<RealmName, RememberMe>,
    simple_hash_remember_me: HashMap<RealmName, RememberMe>,
    resource_owner_maps: HashMap<RealmName, Arc<dyn ResourceOwnerMap>>,
    user_resolvers: HashMap<String, Arc<dyn OAuthUserResolver>>,
}

impl Collaborators {
    pub fn new(services: LoginServices) -> Self {
        Self {
            services,
            persistent_remember_me: HashMap::new(),
            simple_hash_remember_me: HashMap::new(),
            resource_owner_maps: HashMap::new(),
            user_resolvers: HashMap::new(),
        }
    }

    /// Register the persistent-token remember-me service of a realm.
    pub fn with_persistent_remember_me(mut self, realm: RealmName, service: RememberMe) -> Self {
        self.persistent_remember_me.insert(realm, service);
        self
    }

    /// Register the simple-hash (signed cookie) remember-me service of a realm.
    pub fn with_simple_hash_remember_me(mut self, realm: RealmName, service: RememberMe) -> Self {
        self.simple_hash_remember_me.insert(realm, service);
        self
    }

    pub fn with_resource_owner_map(
        mut self,
        realm: RealmName,
        map: Arc<dyn ResourceOwnerMap>,
    ) -> Self {
        self.resource_owner_maps.insert(realm, map);
        self
    }

    pub fn with_user_resolver(
        mut self,
        name: impl Into<String>,
        resolver: Arc<dyn OAuthUserResolver>,
    ) -> Self {
        self.user_resolvers.insert(name.into(), resolver);
        self
    }

    /// The realm's remember-me service, persistent first.
    fn remember_me_for(&self, realm: &RealmName) -> Option<RememberMe> {
        self.persistent_remember_me
            .get(realm)
            .or_else(|| self.simple_hash_remember_me.get(realm))
            .cloned()
    }
}

/// Named login managers built from a [`LoginConfig`].
#[derive(Debug)]
pub struct ManagerRegistry {
    managers: BTreeMap<String, LoginManager>,
}

impl ManagerRegistry {
    /// Build every manager named in `config`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a manager enables OAuth but its
    /// realm has no resource-owner map or its user provider is unknown.
    pub fn build(config: &LoginConfig, collaborators: &Collaborators) -> Result<Self> {
        config.validate()?;

        let mut managers = BTreeMap::new();
        for (name, manager_config) in &config.managers {
            let realm = manager_config.realm();
            let firewall = realm.name().clone();

            let remember_me = if realm.remember_me() {
                let service = collaborators.remember_me_for(&firewall);
                if service.is_none() {
                    debug!(manager = %name, %firewall, "No remember-me service registered");
                }
                service
            } else {
                None
            };

            let oauth = if realm.oauth().enabled {
                Some(Self::oauth_services(
                    &firewall,
                    manager_config.oauth.user_provider.as_deref(),
                    collaborators,
                )?)
            } else {
                None
            };

            let manager =
                LoginManager::new(realm, collaborators.services.clone(), remember_me, oauth)?;
            debug!(manager = %name, %firewall, "Login manager registered");
            managers.insert(name.clone(), manager);
        }

        Ok(Self { managers })
    }

    fn oauth_services(
        firewall: &RealmName,
        user_provider: Option<&str>,
        collaborators: &Collaborators,
    ) -> Result<OAuthServices> {
        let resource_owners = collaborators
            .resource_owner_maps
            .get(firewall)
            .cloned()
            .ok_or_else(|| ConfigurationError::MissingOAuthService {
                realm: firewall.to_string(),
                missing: "resource owner map".to_string(),
            })?;

        let user_provider = user_provider.ok_or_else(|| ConfigurationError::MissingUserProvider {
            realm: firewall.to_string(),
        })?;

        let users = collaborators
            .user_resolvers
            .get(user_provider)
            .cloned()
            .ok_or_else(|| ConfigurationError::MissingOAuthService {
                realm: firewall.to_string(),
                missing: format!("user provider \"{}\"", user_provider),
            })?;

        Ok(OAuthServices {
            resource_owners,
            users,
        })
    }

    /// Look up a manager by name.
    pub fn get(&self, name: &str) -> Result<&LoginManager> {
        self.managers.get(name).ok_or_else(|| {
            NotFoundError::Manager {
                name: name.to_string(),
            }
            .into()
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.managers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.managers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }
}
