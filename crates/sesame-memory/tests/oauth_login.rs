//! OAuth login through `LoginManager` with fixture providers.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use sesame_core::error::{AuthError, ConfigurationError, NotFoundError};
use sesame_core::traits::{ResourceOwner, TokenStorage};
use sesame_core::{
    AccessToken, CredentialKind, Error, Identity, LoginManager, LoginServices, OAuthConfig,
    OAuthServices, OAuthTokenKind, OutgoingResponse, ProviderName, RealmConfig, RealmName,
    RememberMe, RequestContext, Role, StatusUserChecker,
};
use sesame_memory::{
    FixtureUserResolver, MemoryTokenStorage, PersistentTokenRememberMe, REMEMBER_ME_COOKIE,
    RecordingPublisher, SessionFixation, StaticResourceOwner,
};

struct Harness {
    storage: Arc<MemoryTokenStorage>,
    events: Arc<RecordingPublisher>,
    owner: Arc<StaticResourceOwner>,
    users: Arc<FixtureUserResolver>,
    manager: LoginManager,
}

fn github() -> ProviderName {
    ProviderName::new("github").unwrap()
}

fn oauth_config() -> OAuthConfig {
    OAuthConfig {
        enabled: true,
        user_provider: Some("fixtures".to_string()),
        ..OAuthConfig::default()
    }
}

fn harness(oauth: OAuthConfig) -> Harness {
    let storage = Arc::new(MemoryTokenStorage::new());
    let events = Arc::new(RecordingPublisher::new());
    let owner = Arc::new(
        StaticResourceOwner::new(github())
            .with_user("gho_alice", json!({"id": 583231, "login": "alice"}))
            .with_user("gho_ghost", json!({"id": 1, "login": "ghost"}))
            .with_state("state-1"),
    );
    let users = Arc::new(FixtureUserResolver::new().with_user(
        github(),
        "583231",
        Identity::new("alice").with_roles([Role::new("ROLE_USER").unwrap()]),
    ));

    let mut owners: HashMap<String, Arc<dyn ResourceOwner>> = HashMap::new();
    owners.insert("github".to_string(), owner.clone());

    let realm = RealmConfig::new(RealmName::new("main").unwrap())
        .with_remember_me(true)
        .with_oauth(oauth);
    let manager = LoginManager::new(
        realm,
        LoginServices {
            storage: storage.clone(),
            user_checker: Arc::new(StatusUserChecker),
            session_strategy: Arc::new(SessionFixation::Migrate),
            events: events.clone(),
        },
        Some(RememberMe::Token(Arc::new(PersistentTokenRememberMe::new()))),
        Some(OAuthServices {
            resource_owners: Arc::new(owners),
            users: users.clone(),
        }),
    )
    .unwrap();

    Harness {
        storage,
        events,
        owner,
        users,
        manager,
    }
}

#[tokio::test]
async fn oauth_login_records_provider_as_resource_owner() {
    let h = harness(oauth_config());
    let mut request = RequestContext::new("/login/check-github");

    h.manager
        .log_in_oauth(
            Some(&mut request),
            AccessToken::new("gho_alice"),
            "state-1",
            "github",
        )
        .await
        .unwrap();

    let credential = h.storage.credential().unwrap();
    assert_eq!(credential.identity().username(), "alice");
    assert_eq!(credential.resource_owner(), Some(&github()));
    assert_eq!(credential.access_token().unwrap().as_str(), "gho_alice");
    assert_eq!(credential.roles().len(), 1);
    assert!(credential.is_authenticated());
    assert!(matches!(
        credential.kind(),
        CredentialKind::OAuth {
            token_kind: OAuthTokenKind::RealmBound,
            ..
        }
    ));

    let events = h.events.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].resource_owner, Some(github()));
}

#[tokio::test]
async fn structured_token_response_is_accepted() {
    let h = harness(oauth_config());
    let token = AccessToken::from_response(json!({
        "access_token": "gho_alice",
        "refresh_token": "ghr_refresh",
        "expires_in": 28800,
    }))
    .unwrap();

    h.manager
        .log_in_oauth(None, token, "state-1", "github")
        .await
        .unwrap();

    let credential = h.storage.credential().unwrap();
    assert_eq!(
        credential.access_token().unwrap().refresh_token(),
        Some("ghr_refresh")
    );
}

#[tokio::test]
async fn state_mismatch_is_an_auth_error_and_leaves_storage_unchanged() {
    let h = harness(oauth_config());

    let err = h
        .manager
        .log_in_oauth(
            Some(&mut RequestContext::new("/login/check-github")),
            AccessToken::new("gho_alice"),
            "forged",
            "github",
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::InvalidState { .. })));
    assert!(h.storage.credential().is_none());
    assert!(h.events.is_empty());
}

#[tokio::test]
async fn state_cannot_be_replayed() {
    let h = harness(oauth_config());

    h.manager
        .log_in_oauth(None, AccessToken::new("gho_alice"), "state-1", "github")
        .await
        .unwrap();
    let err = h
        .manager
        .log_in_oauth(None, AccessToken::new("gho_alice"), "state-1", "github")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Auth(_)));
}

#[tokio::test]
async fn disabled_realm_fails_before_any_provider_call() {
    let h = harness(OAuthConfig::default());

    let err = h
        .manager
        .log_in_oauth(
            Some(&mut RequestContext::new("/login/check-github")),
            AccessToken::new("gho_alice"),
            "state-1",
            "github",
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Configuration(ConfigurationError::OAuthDisabled { .. })
    ));
    assert_eq!(h.owner.fetches(), 0);
    assert_eq!(h.users.lookups(), 0);
    assert!(h.storage.credential().is_none());
}

#[tokio::test]
async fn unknown_provider_is_not_found() {
    let h = harness(oauth_config());

    let err = h
        .manager
        .log_in_oauth(None, AccessToken::new("gho_alice"), "state-1", "gitlab")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::NotFound(NotFoundError::ResourceOwner { .. })
    ));
    assert_eq!(h.owner.fetches(), 0);
}

#[tokio::test]
async fn provider_identity_without_local_user_is_not_found() {
    let h = harness(oauth_config());

    let err = h
        .manager
        .log_in_oauth(None, AccessToken::new("gho_ghost"), "state-1", "github")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotFound(NotFoundError::User { .. })));
    assert_eq!(h.owner.fetches(), 1);
    assert!(h.storage.credential().is_none());
}

#[tokio::test]
async fn provider_errors_surface_unchanged() {
    let h = harness(oauth_config());

    let err = h
        .manager
        .log_in_oauth(None, AccessToken::new("revoked"), "state-1", "github")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Upstream(_)));
    assert_eq!(h.users.lookups(), 0);
}

#[tokio::test]
async fn username_password_token_option_builds_a_standard_credential() {
    let h = harness(OAuthConfig {
        use_username_password_token: true,
        ..oauth_config()
    });

    h.manager
        .log_in_oauth(None, AccessToken::new("gho_alice"), "state-1", "github")
        .await
        .unwrap();

    let credential = h.storage.credential().unwrap();
    assert!(matches!(
        credential.kind(),
        CredentialKind::UsernamePassword { .. }
    ));
    assert!(credential.resource_owner().is_none());
}

#[tokio::test]
async fn plain_token_kind_ignores_always_authenticated() {
    let h = harness(OAuthConfig {
        token_kind: OAuthTokenKind::Plain,
        always_authenticated: true,
        ..oauth_config()
    });

    h.manager
        .log_in_oauth(None, AccessToken::new("gho_alice"), "state-1", "github")
        .await
        .unwrap();

    let credential = h.storage.credential().unwrap();
    assert!(matches!(
        credential.kind(),
        CredentialKind::OAuth {
            token_kind: OAuthTokenKind::Plain,
            ..
        }
    ));
    assert_eq!(credential.resource_owner(), Some(&github()));
}

#[tokio::test]
async fn remember_oauth_issues_a_cookie() {
    let h = harness(oauth_config());
    let mut response = OutgoingResponse::new();

    h.manager
        .remember_oauth(
            Some(&mut RequestContext::new("/login/check-github")),
            AccessToken::new("gho_alice"),
            "state-1",
            "github",
            &mut response,
        )
        .await
        .unwrap();

    assert!(response.cookie(REMEMBER_ME_COOKIE).is_some());
}
