//! Identity client that trusts identity headers set by an upstream gateway.
//!
//! The gateway authenticates the caller and forwards `x-auth-user`,
//! `x-auth-roles` (comma separated role entries) and `x-auth-permissions`
//! (comma separated `resource:scope` entries). No token is validated here.

mod config;

use std::fmt;
use std::sync::Arc;

use axum::body::Body;
use axum::response::{IntoResponse, Response};
use gatehouse_core::error::AppError;
use http::{HeaderMap, HeaderName, Request};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{debug, info, warn};

use crate::client::IdentityClient;
use crate::guard::Guard;
use crate::identity::{GrantedPermissions, Identity};
use crate::options::ClientOptions;

pub use config::{
    DEFAULT_PERMISSIONS_HEADER, DEFAULT_ROLES_HEADER, DEFAULT_USER_HEADER, HeaderClientConfig,
    HeaderClientError,
};

/// Session key holding the identity of a session-authenticated caller.
pub const IDENTITY_SESSION_KEY: &str = "gatehouse.identity";

/// Access conditions for [`HeaderIdentityClient::protect`].
#[derive(Clone)]
pub enum Protection {
    /// Any identified caller.
    Authenticated,
    /// A role spec: `realm:<role>`, `<client>:<role>`, or a bare role of the
    /// configured resource.
    Role(String),
    /// A custom predicate over the caller's identity.
    Check(Arc<dyn Fn(&Identity) -> bool + Send + Sync>),
}

impl Protection {
    pub fn role(spec: impl Into<String>) -> Self {
        Self::Role(spec.into())
    }

    pub fn check<F>(predicate: F) -> Self
    where
        F: Fn(&Identity) -> bool + Send + Sync + 'static,
    {
        Self::Check(Arc::new(predicate))
    }

    fn allows(&self, identity: &Identity, resource: &str) -> bool {
        match self {
            Self::Authenticated => true,
            Self::Role(spec) => identity.has_role(spec, resource),
            Self::Check(predicate) => predicate(identity),
        }
    }
}

impl fmt::Debug for Protection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authenticated => f.write_str("Authenticated"),
            Self::Role(spec) => f.debug_tuple("Role").field(spec).finish(),
            Self::Check(_) => f.write_str("Check(..)"),
        }
    }
}

/// What an enforcer leaves for the handler after a successful check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// Insert [`GrantedPermissions`] into request extensions.
    #[default]
    Permissions,
    /// Check only.
    Token,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnforcerOptions {
    pub response_mode: ResponseMode,
}

impl EnforcerOptions {
    pub fn token() -> Self {
        Self {
            response_mode: ResponseMode::Token,
        }
    }
}

/// Header-trusting implementation of [`IdentityClient`].
#[derive(Clone)]
pub struct HeaderIdentityClient {
    inner: Arc<Inner>,
}

struct Inner {
    realm: String,
    resource: String,
    user_header: HeaderName,
    roles_header: HeaderName,
    permissions_header: HeaderName,
    use_sessions: bool,
}

impl HeaderIdentityClient {
    pub fn realm(&self) -> &str {
        &self.inner.realm
    }

    pub fn resource(&self) -> &str {
        &self.inner.resource
    }

    /// `true` when identities are kept in the session between requests.
    pub fn uses_sessions(&self) -> bool {
        self.inner.use_sessions
    }
}

impl Inner {
    fn identity_from_headers(&self, headers: &HeaderMap) -> Option<Identity> {
        let subject = header_str(headers, &self.user_header)?.trim();
        if subject.is_empty() {
            return None;
        }
        let mut identity = Identity::new(subject);
        if let Some(roles) = header_str(headers, &self.roles_header) {
            for entry in split_list(roles) {
                identity.add_role(entry);
            }
        }
        if let Some(permissions) = header_str(headers, &self.permissions_header) {
            identity
                .permissions
                .extend(split_list(permissions).map(str::to_owned));
        }
        Some(identity)
    }

    async fn authenticate(&self, mut request: Request<Body>) -> Result<Request<Body>, Response> {
        let from_headers = self.identity_from_headers(request.headers());
        let session = if self.use_sessions {
            request.extensions().get::<Session>().cloned()
        } else {
            None
        };

        let identity = match (from_headers, session) {
            (Some(identity), Some(session)) => {
                remember(&session, &identity).await;
                Some(identity)
            }
            (Some(identity), None) => Some(identity),
            (None, Some(session)) => recall(&session).await,
            (None, None) => None,
        };

        if let Some(identity) = identity {
            debug!(subject = %identity.subject, realm = %self.realm, "request authenticated");
            request.extensions_mut().insert(identity);
        }
        Ok(request)
    }
}

async fn remember(session: &Session, identity: &Identity) {
    match session.get::<Identity>(IDENTITY_SESSION_KEY).await {
        Ok(Some(stored)) if &stored == identity => {}
        _ => {
            if let Err(e) = session.insert(IDENTITY_SESSION_KEY, identity).await {
                warn!(error = %e, "failed to store identity in session");
            }
        }
    }
}

async fn recall(session: &Session) -> Option<Identity> {
    match session.get::<Identity>(IDENTITY_SESSION_KEY).await {
        Ok(identity) => identity,
        Err(e) => {
            warn!(error = %e, "failed to load identity from session");
            None
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn unauthorized() -> Response {
    AppError::Unauthorized.into_response()
}

fn forbidden() -> Response {
    AppError::Forbidden.into_response()
}

impl IdentityClient for HeaderIdentityClient {
    type Config = HeaderClientConfig;
    type Conditions = Protection;
    type Permissions = Vec<String>;
    type EnforcerOptions = EnforcerOptions;
    type Error = HeaderClientError;

    fn new(options: ClientOptions, config: HeaderClientConfig) -> Result<Self, HeaderClientError> {
        let [user_header, roles_header, permissions_header] = config.header_names()?;
        let use_sessions = options.store.is_some() && !config.bearer_only;
        Ok(Self {
            inner: Arc::new(Inner {
                realm: config.realm,
                resource: config.resource,
                user_header,
                roles_header,
                permissions_header,
                use_sessions,
            }),
        })
    }

    fn middleware(&self) -> Guard {
        let inner = Arc::clone(&self.inner);
        Guard::new(move |request| {
            let inner = Arc::clone(&inner);
            async move { inner.authenticate(request).await }
        })
    }

    fn protect(&self, conditions: Protection) -> Guard {
        let inner = Arc::clone(&self.inner);
        let conditions = Arc::new(conditions);
        Guard::new(move |request| {
            let inner = Arc::clone(&inner);
            let conditions = Arc::clone(&conditions);
            async move {
                let Some(identity) = request.extensions().get::<Identity>() else {
                    debug!(uri = %request.uri(), "anonymous request rejected");
                    return Err(unauthorized());
                };
                if conditions.allows(identity, &inner.resource) {
                    Ok(request)
                } else {
                    debug!(subject = %identity.subject, ?conditions, "access denied");
                    Err(forbidden())
                }
            }
        })
    }

    fn enforcer(&self, permissions: Vec<String>, options: EnforcerOptions) -> Guard {
        let required: Arc<[String]> = permissions.into();
        let mode = options.response_mode;
        Guard::new(move |mut request| {
            let required = Arc::clone(&required);
            async move {
                let Some(identity) = request.extensions().get::<Identity>() else {
                    debug!(uri = %request.uri(), "anonymous request rejected");
                    return Err(unauthorized());
                };
                if let Some(missing) = required.iter().find(|p| !identity.has_permission(p)) {
                    debug!(subject = %identity.subject, %missing, "permission denied");
                    return Err(forbidden());
                }
                if mode == ResponseMode::Permissions {
                    request
                        .extensions_mut()
                        .insert(GrantedPermissions(required.to_vec()));
                }
                Ok(request)
            }
        })
    }

    fn shutdown(&self) {
        info!(
            realm = %self.inner.realm,
            resource = %self.inner.resource,
            "header identity client retired"
        );
    }
}
