//! Mock provider tests for the HTTP resource owner.
//!
//! These tests use wiremock to stand in for a provider's user-info
//! endpoint.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use sesame_core::error::UpstreamError;
use sesame_core::traits::{ResourceOwner, TokenStorage};
use sesame_core::{
    AccessToken, Error, Identity, LoginManager, LoginServices, OAuthConfig, OAuthServices,
    ProviderName, RealmConfig, RealmName, RequestContext, StatusUserChecker,
};
use sesame_memory::{FixtureUserResolver, MemoryTokenStorage, RecordingPublisher, SessionFixation};
use sesame_oauth::{HttpResourceOwner, StateStore};
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn github() -> ProviderName {
    ProviderName::new("github").unwrap()
}

fn owner(server: &MockServer) -> HttpResourceOwner {
    let url = Url::parse(&format!("{}/user", server.uri())).unwrap();
    HttpResourceOwner::new(github(), url).unwrap()
}

// ============================================================================
// User information
// ============================================================================

#[tokio::test]
async fn fetches_user_information_with_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", "Bearer gho_alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 583231,
            "login": "alice",
            "email": "alice@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let info = owner(&server)
        .user_information(&AccessToken::new("gho_alice"))
        .await
        .unwrap();

    assert_eq!(info.provider(), &github());
    assert_eq!(info.identifier(), "583231");
    assert_eq!(info.field("login"), Some("alice"));
}

#[tokio::test]
async fn identifier_can_be_nested() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": "u-17", "username": "alice"}
        })))
        .mount(&server)
        .await;

    let info = owner(&server)
        .with_identifier_field("/data/id")
        .user_information(&AccessToken::new("token"))
        .await
        .unwrap();

    assert_eq!(info.identifier(), "u-17");
}

#[tokio::test]
async fn rejected_token_is_a_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Bad credentials"
        })))
        .mount(&server)
        .await;

    let err = owner(&server)
        .user_information(&AccessToken::new("revoked"))
        .await
        .unwrap_err();

    match err {
        Error::Upstream(UpstreamError::Provider(e)) => {
            assert_eq!(e.status, 401);
            assert_eq!(e.message.as_deref(), Some("Bad credentials"));
            assert!(e.is_auth_error());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn payload_without_identifier_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"login": "alice"})))
        .mount(&server)
        .await;

    let err = owner(&server)
        .user_information(&AccessToken::new("token"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Upstream(UpstreamError::MalformedResponse { .. })
    ));
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>hello</html>"))
        .mount(&server)
        .await;

    let err = owner(&server)
        .user_information(&AccessToken::new("token"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Upstream(UpstreamError::MalformedResponse { .. })
    ));
}

#[tokio::test]
async fn slow_provider_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": 1}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/user", server.uri())).unwrap();
    let owner = HttpResourceOwner::with_timeout(github(), url, Duration::from_millis(100)).unwrap();

    let err = owner
        .user_information(&AccessToken::new("token"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Upstream(UpstreamError::Timeout { .. })));
}

// ============================================================================
// Login through a manager
// ============================================================================

#[tokio::test]
async fn oauth_login_against_http_provider() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", "Bearer gho_alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 583231,
            "login": "alice"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let states = Arc::new(StateStore::new());
    let provider = Arc::new(owner(&server).with_states(states.clone()));
    let mut owners: HashMap<String, Arc<dyn ResourceOwner>> = HashMap::new();
    owners.insert("github".to_string(), provider);

    let storage = Arc::new(MemoryTokenStorage::new());
    let events = Arc::new(RecordingPublisher::new());
    let realm = RealmConfig::new(RealmName::new("main").unwrap()).with_oauth(OAuthConfig {
        enabled: true,
        user_provider: Some("fixtures".to_string()),
        ..OAuthConfig::default()
    });
    let manager = LoginManager::new(
        realm,
        LoginServices {
            storage: storage.clone(),
            user_checker: Arc::new(StatusUserChecker),
            session_strategy: Arc::new(SessionFixation::Migrate),
            events: events.clone(),
        },
        None,
        Some(OAuthServices {
            resource_owners: Arc::new(owners),
            users: Arc::new(FixtureUserResolver::new().with_user(
                github(),
                "583231",
                Identity::new("alice"),
            )),
        }),
    )
    .unwrap();

    let state = states.issue();
    manager
        .log_in_oauth(
            Some(&mut RequestContext::new("/login/check-github")),
            AccessToken::new("gho_alice"),
            &state,
            "github",
        )
        .await
        .unwrap();

    let credential = storage.credential().unwrap();
    assert_eq!(credential.identity().username(), "alice");
    assert_eq!(credential.resource_owner(), Some(&github()));
    assert_eq!(events.len(), 1);
    assert!(states.is_empty());
}
