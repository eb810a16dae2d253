//! The login orchestrator.
//!
//! A [`LoginManager`] runs the login sequence for one realm:
//!
//! 1. build a credential for the identity,
//! 2. check the account is eligible (ineligible accounts end the call
//!    quietly, with no session change),
//! 3. install the credential into token storage,
//! 4. apply the session fixation strategy,
//! 5. issue a remember-me artifact when asked to,
//! 6. publish an interactive-login event.
//!
//! Steps 4 to 6 need a live request and are skipped without one. OAuth
//! logins first resolve the provider's access token into a local identity
//! and then enter the same sequence.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::Result;
use crate::config::RealmConfig;
use crate::credential::Credential;
use crate::error::{AuthError, ConfigurationError};
use crate::event::{INTERACTIVE_LOGIN, InteractiveLogin};
use crate::factory::CredentialFactory;
use crate::gate::{AccountGate, Eligibility};
use crate::request::{OutgoingResponse, RequestContext};
use crate::tokens::AccessToken;
use crate::traits::{
    EventPublisher, OAuthUserResolver, RememberMe, ResourceOwnerMap, SessionStrategy,
    TokenStorage, UserChecker,
};
use crate::types::{Identity, RealmName};

/// Collaborators every login manager needs.
#[derive(Clone)]
pub struct LoginServices {
    pub storage: Arc<dyn TokenStorage>,
    pub user_checker: Arc<dyn UserChecker>,
    pub session_strategy: Arc<dyn SessionStrategy>,
    pub events: Arc<dyn EventPublisher>,
}

/// Collaborators for OAuth logins.
#[derive(Clone)]
pub struct OAuthServices {
    pub resource_owners: Arc<dyn ResourceOwnerMap>,
    pub users: Arc<dyn OAuthUserResolver>,
}

/// Establishes authenticated sessions for one realm.
///
/// Collaborators are awaited one at a time, in the order of the login
/// sequence, and the manager never spawns tasks. Each step sees the effects
/// of the previous one.
pub struct LoginManager {
    realm: RealmConfig,
    factory: CredentialFactory,
    gate: AccountGate,
    storage: Arc<dyn TokenStorage>,
    session_strategy: Arc<dyn SessionStrategy>,
    events: Arc<dyn EventPublisher>,
    remember_me: Option<RememberMe>,
    oauth: Option<OAuthServices>,
}

impl LoginManager {
    /// Create a manager for `realm`.
    ///
    /// The remember-me service is kept only when the realm enables
    /// remember-me, and the OAuth services only when it enables OAuth.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the realm enables OAuth but no
    /// OAuth services are given.
    pub fn new(
        realm: RealmConfig,
        services: LoginServices,
        remember_me: Option<RememberMe>,
        oauth: Option<OAuthServices>,
    ) -> Result<Self> {
        let oauth = if realm.oauth().enabled {
            let services = oauth.ok_or_else(|| ConfigurationError::MissingOAuthService {
                realm: realm.name().to_string(),
                missing: "resource owner map and user resolver".to_string(),
            })?;
            Some(services)
        } else {
            None
        };

        let remember_me = remember_me.filter(|_| realm.remember_me());

        Ok(Self {
            factory: CredentialFactory::new(realm.name().clone()),
            gate: AccountGate::new(services.user_checker),
            storage: services.storage,
            session_strategy: services.session_strategy,
            events: services.events,
            remember_me,
            oauth,
            realm,
        })
    }

    pub fn realm(&self) -> &RealmConfig {
        &self.realm
    }

    pub fn firewall_name(&self) -> &RealmName {
        self.realm.name()
    }

    pub fn remember_me_service(&self) -> Option<&RememberMe> {
        self.remember_me.as_ref()
    }

    /// Log `identity` in.
    ///
    /// Returns `Ok(())` without touching the session when the account is
    /// locked, disabled or expired. Callers that need to tell the two
    /// outcomes apart inspect token storage afterwards.
    #[instrument(skip(self, request, identity), fields(realm = %self.realm.name(), user = %identity.username()))]
    pub async fn log_in_user(
        &self,
        request: Option<&mut RequestContext>,
        identity: &Identity,
        pre_authenticated: bool,
    ) -> Result<()> {
        let credential = self.factory.create(identity, pre_authenticated);
        self.complete_login(request, credential, None).await
    }

    /// Log `identity` in and issue a remember-me artifact onto `response`.
    #[instrument(skip(self, request, identity, response), fields(realm = %self.realm.name(), user = %identity.username()))]
    pub async fn remember_user(
        &self,
        request: Option<&mut RequestContext>,
        identity: &Identity,
        response: &mut OutgoingResponse,
        pre_authenticated: bool,
    ) -> Result<()> {
        let credential = self.factory.create(identity, pre_authenticated);
        self.complete_login(request, credential, Some(response)).await
    }

    /// Log in the local user behind an OAuth access token.
    ///
    /// # Errors
    ///
    /// - configuration error if the realm does not enable OAuth
    /// - not found if `provider` is unknown or the provider identity has no
    ///   local user
    /// - authentication error if `state` does not match
    /// - provider errors unchanged
    #[instrument(skip(self, request, access_token, state), fields(realm = %self.realm.name()))]
    pub async fn log_in_oauth(
        &self,
        request: Option<&mut RequestContext>,
        access_token: AccessToken,
        state: &str,
        provider: &str,
    ) -> Result<()> {
        let credential = self.oauth_credential(access_token, state, provider).await?;
        self.complete_login(request, credential, None).await
    }

    /// OAuth login that also issues a remember-me artifact onto `response`.
    #[instrument(skip(self, request, access_token, state, response), fields(realm = %self.realm.name()))]
    pub async fn remember_oauth(
        &self,
        request: Option<&mut RequestContext>,
        access_token: AccessToken,
        state: &str,
        provider: &str,
        response: &mut OutgoingResponse,
    ) -> Result<()> {
        let credential = self.oauth_credential(access_token, state, provider).await?;
        self.complete_login(request, credential, Some(response)).await
    }

    /// Run the shared login sequence for an already-built credential.
    #[instrument(skip_all, fields(realm = %self.realm.name(), user = %credential.identity().username()))]
    pub async fn complete_login(
        &self,
        request: Option<&mut RequestContext>,
        credential: Credential,
        response: Option<&mut OutgoingResponse>,
    ) -> Result<()> {
        // Locked, disabled or expired accounts do not get a session.
        if let Eligibility::Rejected(reason) = self.gate.check_eligible(credential.identity())? {
            info!(%reason, "Account not eligible, leaving session untouched");
            return Ok(());
        }

        self.storage.set_credential(credential.clone());
        debug!("Credential installed");

        let Some(request) = request else {
            debug!("No active request, skipping session binding and notification");
            return Ok(());
        };

        self.session_strategy.on_authentication(request, &credential)?;

        if let Some(response) = response {
            match &self.remember_me {
                Some(remember_me) => {
                    remember_me.issue(request, response, &credential).await?;
                    debug!("Remember-me artifact issued");
                }
                None => debug!("No remember-me service for realm"),
            }
        }

        self.events.publish(INTERACTIVE_LOGIN, &InteractiveLogin::new(request, &credential));

        info!(request_id = %request.id(), "User logged in");
        Ok(())
    }

    async fn oauth_credential(
        &self,
        access_token: AccessToken,
        state: &str,
        provider: &str,
    ) -> Result<Credential> {
        let oauth = self
            .oauth
            .as_ref()
            .ok_or_else(|| ConfigurationError::OAuthDisabled {
                realm: self.realm.name().to_string(),
            })?;

        let owner = oauth.resource_owners.resource_owner(provider)?;

        let user_info = owner.user_information(&access_token).await?;
        debug!(identifier = user_info.identifier(), "Fetched provider user information");

        let identity = oauth.users.load_user(&user_info).await?;

        if !owner.is_state_valid(state) {
            return Err(AuthError::InvalidState {
                provider: owner.name().to_string(),
            }
            .into());
        }

        let config = self.realm.oauth();
        let credential = if config.use_username_password_token {
            self.factory.username_password(&identity)
        } else {
            self.factory.oauth(access_token, &identity, owner.name().clone(), config)
        };

        Ok(credential)
    }
}

impl fmt::Debug for LoginManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginManager")
            .field("realm", &self.realm)
            .field("remember_me", &self.remember_me)
            .field("oauth", &self.oauth.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::Error;
    use crate::config::OAuthConfig;
    use crate::gate::StatusUserChecker;
    use crate::traits::{ResourceOwner, TokenRememberMe};
    use crate::types::AccountStatus;

    #[derive(Default)]
    struct Slot(Mutex<Option<Credential>>);

    impl TokenStorage for Slot {
        fn set_credential(&self, credential: Credential) {
            *self.0.lock().unwrap() = Some(credential);
        }

        fn credential(&self) -> Option<Credential> {
            self.0.lock().unwrap().clone()
        }
    }

    struct KeepSession;

    impl SessionStrategy for KeepSession {
        fn on_authentication(&self, _: &mut RequestContext, _: &Credential) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct Names(Mutex<Vec<String>>);

    impl EventPublisher for Names {
        fn publish(&self, name: &str, _: &InteractiveLogin<'_>) {
            self.0.lock().unwrap().push(name.to_string());
        }
    }

    struct NeverRemember;

    #[async_trait]
    impl TokenRememberMe for NeverRemember {
        async fn issue(&self, _: &Identity) -> Result<crate::traits::RememberMeToken> {
            unreachable!("remember-me is disabled for this realm")
        }
    }

    struct NoUsers;

    #[async_trait]
    impl OAuthUserResolver for NoUsers {
        async fn load_user(&self, info: &crate::traits::UserInfo) -> Result<Identity> {
            Err(crate::error::NotFoundError::User {
                provider: info.provider().to_string(),
                identifier: info.identifier().to_string(),
            }
            .into())
        }
    }

    /// Records each collaborator call it receives, in order.
    #[derive(Default)]
    struct Trace(Mutex<Vec<&'static str>>);

    impl Trace {
        fn steps(&self) -> Vec<&'static str> {
            self.0.lock().unwrap().clone()
        }

        fn push(&self, step: &'static str) {
            self.0.lock().unwrap().push(step);
        }
    }

    impl TokenStorage for Trace {
        fn set_credential(&self, _: Credential) {
            self.push("storage");
        }

        fn credential(&self) -> Option<Credential> {
            None
        }
    }

    impl SessionStrategy for Trace {
        fn on_authentication(&self, _: &mut RequestContext, _: &Credential) -> Result<()> {
            self.push("session");
            Ok(())
        }
    }

    #[async_trait]
    impl TokenRememberMe for Trace {
        async fn issue(&self, identity: &Identity) -> Result<crate::traits::RememberMeToken> {
            tokio::task::yield_now().await;
            self.push("remember-me");
            Ok(crate::traits::RememberMeToken {
                cookie_name: "REMEMBERME".to_string(),
                value: crate::tokens::Secret::new(identity.username()),
                expires_at: chrono::Utc::now(),
            })
        }
    }

    impl EventPublisher for Trace {
        fn publish(&self, _: &str, _: &InteractiveLogin<'_>) {
            self.push("event");
        }
    }

    fn services(storage: Arc<Slot>, events: Arc<Names>) -> LoginServices {
        LoginServices {
            storage,
            user_checker: Arc::new(StatusUserChecker),
            session_strategy: Arc::new(KeepSession),
            events,
        }
    }

    fn realm() -> RealmConfig {
        RealmConfig::new(RealmName::new("main").unwrap())
    }

    #[test]
    fn oauth_realm_requires_oauth_services() {
        let realm = realm().with_oauth(OAuthConfig {
            enabled: true,
            user_provider: Some("users".to_string()),
            ..OAuthConfig::default()
        });

        let err = LoginManager::new(
            realm,
            services(Arc::default(), Arc::default()),
            None,
            None,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            Error::Configuration(ConfigurationError::MissingOAuthService { .. })
        ));
    }

    #[test]
    fn remember_me_service_dropped_when_realm_disables_it() {
        let manager = LoginManager::new(
            realm(),
            services(Arc::default(), Arc::default()),
            Some(RememberMe::Token(Arc::new(NeverRemember))),
            None,
        )
        .unwrap();

        assert!(manager.remember_me_service().is_none());
    }

    #[tokio::test]
    async fn remember_user_without_service_still_logs_in() {
        let storage = Arc::new(Slot::default());
        let events = Arc::new(Names::default());
        let manager = LoginManager::new(
            realm(),
            services(storage.clone(), events.clone()),
            Some(RememberMe::Token(Arc::new(NeverRemember))),
            None,
        )
        .unwrap();

        let mut request = RequestContext::new("/login");
        let mut response = OutgoingResponse::new();
        manager
            .remember_user(
                Some(&mut request),
                &Identity::new("alice"),
                &mut response,
                false,
            )
            .await
            .unwrap();

        assert!(storage.credential().is_some());
        assert!(response.cookies().is_empty());
        assert_eq!(*events.0.lock().unwrap(), vec![INTERACTIVE_LOGIN]);
    }

    #[tokio::test]
    async fn rejected_account_is_silent() {
        let storage = Arc::new(Slot::default());
        let events = Arc::new(Names::default());
        let manager =
            LoginManager::new(realm(), services(storage.clone(), events.clone()), None, None)
                .unwrap();

        let locked = Identity::new("mallory").with_status(AccountStatus {
            locked: true,
            ..Default::default()
        });
        let mut request = RequestContext::new("/login");

        manager
            .log_in_user(Some(&mut request), &locked, false)
            .await
            .unwrap();

        assert!(storage.credential().is_none());
        assert!(events.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn oauth_on_disabled_realm_is_a_configuration_error() {
        let owners: HashMap<String, Arc<dyn ResourceOwner>> = HashMap::new();
        let manager = LoginManager::new(
            realm(),
            services(Arc::default(), Arc::default()),
            None,
            Some(OAuthServices {
                resource_owners: Arc::new(owners),
                users: Arc::new(NoUsers),
            }),
        )
        .unwrap();

        let err = manager
            .log_in_oauth(None, AccessToken::new("t"), "state", "github")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Configuration(ConfigurationError::OAuthDisabled { .. })
        ));
    }

    #[tokio::test]
    async fn unknown_provider_is_not_found() {
        let owners: HashMap<String, Arc<dyn ResourceOwner>> = HashMap::new();
        let realm = realm().with_oauth(OAuthConfig {
            enabled: true,
            user_provider: Some("users".to_string()),
            ..OAuthConfig::default()
        });
        let manager = LoginManager::new(
            realm,
            services(Arc::default(), Arc::default()),
            None,
            Some(OAuthServices {
                resource_owners: Arc::new(owners),
                users: Arc::new(NoUsers),
            }),
        )
        .unwrap();

        let err = manager
            .log_in_oauth(None, AccessToken::new("t"), "state", "github")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::NotFound(crate::error::NotFoundError::ResourceOwner { .. })
        ));
    }

    #[tokio::test]
    async fn collaborators_run_in_sequence_order() {
        let trace = Arc::new(Trace::default());
        let manager = LoginManager::new(
            realm().with_remember_me(true),
            LoginServices {
                storage: trace.clone(),
                user_checker: Arc::new(StatusUserChecker),
                session_strategy: trace.clone(),
                events: trace.clone(),
            },
            Some(RememberMe::Token(trace.clone())),
            None,
        )
        .unwrap();

        let mut request = RequestContext::new("/login");
        let mut response = OutgoingResponse::new();
        manager
            .remember_user(
                Some(&mut request),
                &Identity::new("alice"),
                &mut response,
                false,
            )
            .await
            .unwrap();

        assert_eq!(trace.steps(), vec!["storage", "session", "remember-me", "event"]);
        assert!(response.cookie("REMEMBERME").is_some());
    }
}
