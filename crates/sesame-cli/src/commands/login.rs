//! Login dry run against in-memory collaborators.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use sesame_core::traits::{EventPublisher, ResourceOwner, TokenStorage};
use sesame_core::{
    Collaborators, Credential, CredentialKind, Identity, LoginConfig, LoginServices,
    ManagerRegistry, OutgoingResponse, RememberMe, RequestContext, Secret, Session, SessionId,
    StatusUserChecker,
};
use sesame_memory::{
    FixtureUserResolver, MemoryTokenStorage, RecordingPublisher, SessionFixation,
    SimpleHashRememberMe,
};
use tracing::debug;
use uuid::Uuid;

use crate::output;
use crate::settings;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Name of the login manager to use
    #[arg(long)]
    pub manager: String,

    /// JSON file holding an array of identities
    #[arg(long)]
    pub users: PathBuf,

    /// Username to log in
    #[arg(long)]
    pub user: String,

    /// Treat the identity as already authenticated
    #[arg(long)]
    pub pre_authenticated: bool,

    /// Issue a remember-me cookie
    #[arg(long)]
    pub remember: bool,

    /// Log in outside of a request
    #[arg(long)]
    pub no_request: bool,

    /// Configuration file (defaults to login.json in the config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

/// What a dry run did.
#[derive(Debug, Serialize)]
struct Outcome {
    established: bool,
    credential: Option<Credential>,
    session: Option<SessionChange>,
    cookies: Vec<CookieSummary>,
    events: Vec<EventSummary>,
}

#[derive(Debug, Serialize)]
struct SessionChange {
    before: String,
    after: String,
}

/// A cookie without its value.
#[derive(Debug, Serialize)]
struct CookieSummary {
    name: String,
    expires: Option<DateTime<Utc>>,
    http_only: bool,
    secure: bool,
}

#[derive(Debug, Serialize)]
struct EventSummary {
    name: String,
    username: String,
    realm: String,
    session_id: String,
}

pub async fn run(args: LoginArgs) -> Result<()> {
    let path = settings::config_path(args.config)?;
    let config = LoginConfig::from_path(&path)
        .with_context(|| format!("Invalid configuration {}", path.display()))?;
    let identity = load_user(&args.users, &args.user)?;

    let storage = Arc::new(MemoryTokenStorage::new());
    let events = Arc::new(RecordingPublisher::new());
    let registry = ManagerRegistry::build(
        &config,
        &collaborators(&config, storage.clone(), events.clone()),
    )
    .context("Failed to build login managers")?;

    let manager = registry.get(&args.manager).with_context(|| {
        format!(
            "Configured managers: {}",
            registry.names().collect::<Vec<_>>().join(", ")
        )
    })?;

    let mut request = (!args.no_request)
        .then(|| RequestContext::with_session("/login", Session::new(SessionId::generate())));
    let before = request.as_ref().map(|r| r.session().id().clone());
    let mut response = OutgoingResponse::new();

    debug!(manager = %args.manager, user = %args.user, "Running login");
    let result = if args.remember {
        manager
            .remember_user(
                request.as_mut(),
                &identity,
                &mut response,
                args.pre_authenticated,
            )
            .await
    } else {
        manager
            .log_in_user(request.as_mut(), &identity, args.pre_authenticated)
            .await
    };
    result.context("Login failed")?;

    let credential = storage.credential();
    let outcome = Outcome {
        established: credential.is_some(),
        credential,
        session: before.zip(request.as_ref()).map(|(before, request)| SessionChange {
            before: before.to_string(),
            after: request.session().id().to_string(),
        }),
        cookies: response
            .cookies()
            .iter()
            .map(|c| CookieSummary {
                name: c.name.clone(),
                expires: c.expires,
                http_only: c.http_only,
                secure: c.secure,
            })
            .collect(),
        events: events
            .events()
            .into_iter()
            .map(|e| EventSummary {
                name: e.name,
                username: e.username,
                realm: e.realm.to_string(),
                session_id: e.session_id.to_string(),
            })
            .collect(),
    };

    if args.json {
        return output::json_pretty(&outcome);
    }
    print_outcome(&outcome);
    Ok(())
}

fn load_user(path: &Path, username: &str) -> Result<Identity> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read users file {}", path.display()))?;
    let users: Vec<Identity> = serde_json::from_str(&json).context("Invalid users file")?;

    users
        .into_iter()
        .find(|u| u.username() == username)
        .with_context(|| format!("No user named \"{}\" in {}", username, path.display()))
}

/// In-memory collaborators for every manager in `config`.
///
/// OAuth logins are not dry-run; OAuth realms get empty fixtures so that
/// their managers can still be built.
fn collaborators(
    config: &LoginConfig,
    storage: Arc<dyn TokenStorage>,
    events: Arc<dyn EventPublisher>,
) -> Collaborators {
    let services = LoginServices {
        storage,
        user_checker: Arc::new(StatusUserChecker),
        session_strategy: Arc::new(SessionFixation::Migrate),
        events,
    };
    let remember_me = RememberMe::Cookie(Arc::new(SimpleHashRememberMe::new(Secret::new(
        Uuid::new_v4().simple().to_string(),
    ))));

    let mut collaborators = Collaborators::new(services);
    for manager in config.managers.values() {
        let firewall = manager.firewall_name.clone();
        if manager.remember_me {
            collaborators =
                collaborators.with_simple_hash_remember_me(firewall.clone(), remember_me.clone());
        }
        if manager.oauth.enabled {
            let owners: HashMap<String, Arc<dyn ResourceOwner>> = HashMap::new();
            collaborators = collaborators.with_resource_owner_map(firewall, Arc::new(owners));
            if let Some(provider) = &manager.oauth.user_provider {
                collaborators = collaborators
                    .with_user_resolver(provider.clone(), Arc::new(FixtureUserResolver::new()));
            }
        }
    }
    collaborators
}

fn print_outcome(outcome: &Outcome) {
    match &outcome.credential {
        Some(credential) => {
            output::success(&format!(
                "Logged in {} on {}",
                credential.identity().username().bold(),
                credential.realm()
            ));
            println!();
            output::field("Kind", kind_label(credential.kind()));
            output::field(
                "Roles",
                &credential
                    .roles()
                    .iter()
                    .map(|r| r.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            );
            output::field("Authenticated", &credential.is_authenticated().to_string());
        }
        None => output::notice("Account not eligible, no session established"),
    }

    match &outcome.session {
        Some(change) => output::field("Session", &format!("{} -> {}", change.before, change.after)),
        None => output::field("Session", "no request"),
    }

    for cookie in &outcome.cookies {
        let expires = cookie
            .expires
            .map(|e| e.to_rfc3339())
            .unwrap_or_else(|| "session".to_string());
        output::field("Cookie", &format!("{} (expires {})", cookie.name, expires));
    }

    for event in &outcome.events {
        output::field("Event", &format!("{} for {}", event.name, event.username));
    }
}

fn kind_label(kind: &CredentialKind) -> &'static str {
    match kind {
        CredentialKind::UsernamePassword { .. } => "username/password",
        CredentialKind::PreAuthenticated { .. } => "pre-authenticated",
        CredentialKind::OAuth { .. } => "oauth",
    }
}
