//! Authenticated identity attached to requests by the identity middleware.

use std::collections::{BTreeMap, BTreeSet};

use axum::extract::FromRequestParts;
use gatehouse_core::error::AppError;
use http::request::Parts;
use serde::{Deserialize, Serialize};

const REALM_PREFIX: &str = "realm";

/// Who is making the request and what they may do.
///
/// Inserted into request extensions by the identity middleware. Handlers take it
/// as an extractor; extraction fails with 401 when the request is anonymous.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub subject: String,
    pub realm_roles: BTreeSet<String>,
    pub client_roles: BTreeMap<String, BTreeSet<String>>,
    pub permissions: BTreeSet<String>,
}

/// Permissions granted by an enforcer, available to the handler that follows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GrantedPermissions(pub Vec<String>);

impl Identity {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Self::default()
        }
    }

    /// Add a role entry: `realm:<role>`, `<client>:<role>`, or a bare realm role.
    pub fn with_role(mut self, entry: &str) -> Self {
        self.add_role(entry);
        self
    }

    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    pub fn add_role(&mut self, entry: &str) {
        match entry.split_once(':') {
            Some((REALM_PREFIX, role)) => {
                self.realm_roles.insert(role.to_owned());
            }
            Some((client, role)) => {
                self.client_roles
                    .entry(client.to_owned())
                    .or_default()
                    .insert(role.to_owned());
            }
            None => {
                self.realm_roles.insert(entry.to_owned());
            }
        }
    }

    pub fn has_realm_role(&self, role: &str) -> bool {
        self.realm_roles.contains(role)
    }

    pub fn has_client_role(&self, client: &str, role: &str) -> bool {
        self.client_roles
            .get(client)
            .is_some_and(|roles| roles.contains(role))
    }

    /// Check a role spec: `realm:<role>`, `<client>:<role>`, or a bare role of
    /// `default_client`.
    pub fn has_role(&self, spec: &str, default_client: &str) -> bool {
        match spec.split_once(':') {
            Some((REALM_PREFIX, role)) => self.has_realm_role(role),
            Some((client, role)) => self.has_client_role(client, role),
            None => self.has_client_role(default_client, spec),
        }
    }

    /// Check a `resource:scope` permission.
    ///
    /// A granted bare `resource` covers all of its scopes; a required bare
    /// `resource` is met by any scope on it.
    pub fn has_permission(&self, required: &str) -> bool {
        if self.permissions.contains(required) {
            return true;
        }
        match required.split_once(':') {
            Some((resource, _)) => self.permissions.contains(resource),
            None => self
                .permissions
                .iter()
                .any(|granted| granted.split(':').next() == Some(required)),
        }
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let identity = parts.extensions.get::<Identity>().cloned();
        async move { identity.ok_or(AppError::Unauthorized) }
    }
}
