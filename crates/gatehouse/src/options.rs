//! Installer input and the options derived from it for the identity client.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::session::{SessionStoreHandle, StoreOptions};

/// Options supplied to the installer.
///
/// `store` enables session middleware. Every other key is opaque to the
/// installer and reaches the identity client unchanged through
/// [`ClientOptions::extras`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InstallOptions {
    #[serde(default, deserialize_with = "falsy_as_none")]
    pub store: Option<StoreOptions>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl InstallOptions {
    pub fn with_store(mut self, store: StoreOptions) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }
}

/// `false`, `0`, `""` and `null` all mean "no store"; anything else must parse
/// as [`StoreOptions`].
fn falsy_as_none<'de, D>(deserializer: D) -> Result<Option<StoreOptions>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let falsy = match &value {
        Value::Null | Value::Bool(false) => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    };
    if falsy {
        return Ok(None);
    }
    StoreOptions::deserialize(value)
        .map(Some)
        .map_err(serde::de::Error::custom)
}

/// Options handed to [`IdentityClient::new`](crate::IdentityClient::new).
///
/// Derived from [`InstallOptions`]; `store` is the live session store shared
/// with the session middleware, not the caller's store options.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub store: Option<SessionStoreHandle>,
    pub extras: Map<String, Value>,
}
