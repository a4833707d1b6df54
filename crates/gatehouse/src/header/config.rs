use std::path::Path;

use http::HeaderName;
use serde::Deserialize;

pub const DEFAULT_USER_HEADER: &str = "x-auth-user";
pub const DEFAULT_ROLES_HEADER: &str = "x-auth-roles";
pub const DEFAULT_PERMISSIONS_HEADER: &str = "x-auth-permissions";

#[derive(Debug, thiserror::Error)]
pub enum HeaderClientError {
    #[error("invalid client config: {0}")]
    InvalidConfig(String),
    #[error("failed to read client config")]
    Read(#[from] std::io::Error),
    #[error("failed to parse client config")]
    Parse(#[from] serde_json::Error),
}

/// Configuration of a [`HeaderIdentityClient`](super::HeaderIdentityClient).
///
/// JSON keys are kebab-case, in the style of adapter config files:
///
/// ```json
/// { "realm": "acme", "resource": "portal", "bearer-only": false }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HeaderClientConfig {
    pub realm: String,
    /// Client id; bare role names in `protect` conditions are roles of this client.
    pub resource: String,
    /// Never keep identities in the session; every request must carry headers.
    #[serde(default)]
    pub bearer_only: bool,
    #[serde(default = "default_user_header")]
    pub user_header: String,
    #[serde(default = "default_roles_header")]
    pub roles_header: String,
    #[serde(default = "default_permissions_header")]
    pub permissions_header: String,
}

fn default_user_header() -> String {
    DEFAULT_USER_HEADER.to_owned()
}

fn default_roles_header() -> String {
    DEFAULT_ROLES_HEADER.to_owned()
}

fn default_permissions_header() -> String {
    DEFAULT_PERMISSIONS_HEADER.to_owned()
}

impl HeaderClientConfig {
    pub fn new(realm: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
            resource: resource.into(),
            bearer_only: false,
            user_header: default_user_header(),
            roles_header: default_roles_header(),
            permissions_header: default_permissions_header(),
        }
    }

    pub fn bearer_only(mut self, bearer_only: bool) -> Self {
        self.bearer_only = bearer_only;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, HeaderClientError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, HeaderClientError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub(crate) fn header_names(&self) -> Result<[HeaderName; 3], HeaderClientError> {
        if self.realm.trim().is_empty() {
            return Err(HeaderClientError::InvalidConfig("realm is empty".to_owned()));
        }
        if self.resource.trim().is_empty() {
            return Err(HeaderClientError::InvalidConfig(
                "resource is empty".to_owned(),
            ));
        }
        Ok([
            parse_header_name(&self.user_header)?,
            parse_header_name(&self.roles_header)?,
            parse_header_name(&self.permissions_header)?,
        ])
    }
}

fn parse_header_name(name: &str) -> Result<HeaderName, HeaderClientError> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| HeaderClientError::InvalidConfig(format!("invalid header name {name:?}")))
}
