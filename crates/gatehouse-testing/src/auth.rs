//! Mock gateway identity headers.
//!
//! Services behind the gateway receive `x-auth-user`, `x-auth-roles` and
//! `x-auth-permissions`. `MockIdentity` produces them directly so no real
//! gateway is needed.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use gatehouse::header::{DEFAULT_PERMISSIONS_HEADER, DEFAULT_ROLES_HEADER, DEFAULT_USER_HEADER};

#[derive(Debug, Clone, Default)]
pub struct MockIdentity {
    pub user: String,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

impl MockIdentity {
    pub fn new(user: &str) -> Self {
        Self {
            user: user.to_owned(),
            ..Self::default()
        }
    }

    pub fn role(mut self, entry: &str) -> Self {
        self.roles.push(entry.to_owned());
        self
    }

    pub fn permission(mut self, entry: &str) -> Self {
        self.permissions.push(entry.to_owned());
        self
    }

    /// Return headers as if the gateway injected them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            HeaderName::from_static(DEFAULT_USER_HEADER),
            HeaderValue::from_str(&self.user).unwrap(),
        );
        if !self.roles.is_empty() {
            map.insert(
                HeaderName::from_static(DEFAULT_ROLES_HEADER),
                HeaderValue::from_str(&self.roles.join(",")).unwrap(),
            );
        }
        if !self.permissions.is_empty() {
            map.insert(
                HeaderName::from_static(DEFAULT_PERMISSIONS_HEADER),
                HeaderValue::from_str(&self.permissions.join(",")).unwrap(),
            );
        }
        map
    }

    /// Build a `GET` request to `uri` carrying these headers.
    pub fn get(&self, uri: &str) -> http::Request<axum::body::Body> {
        let mut request = http::Request::builder()
            .uri(uri)
            .body(axum::body::Body::empty())
            .unwrap();
        request.headers_mut().extend(self.headers());
        request
    }
}
