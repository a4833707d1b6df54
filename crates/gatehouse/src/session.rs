//! Session store adapter.
//!
//! Turns optional [`StoreOptions`] into [`SessionSettings`] backed by a fresh
//! in-memory store, and installs the matching `tower-sessions` middleware.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha512};
use tower_sessions::cookie::Key;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};
use tracing::{debug, warn};

use crate::options::{ClientOptions, InstallOptions};

pub const DEFAULT_SESSION_SECRET: &str = "mySecret";
pub const DEFAULT_RESAVE: bool = false;
pub const DEFAULT_SAVE_UNINITIALIZED: bool = true;

/// Session key written into new sessions when `save_uninitialized` is on.
pub const INITIALIZED_AT_KEY: &str = "gatehouse.initialized_at";

/// Store options as supplied by the caller. Absent fields take the defaults above.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreOptions {
    pub secret: Option<String>,
    pub resave: Option<bool>,
    pub save_uninitialized: Option<bool>,
    pub secure: Option<bool>,
    pub inactivity_secs: Option<i64>,
}

/// Shared handle to an in-memory session store.
///
/// Clones point at the same store; [`SessionStoreHandle::ptr_eq`] tells them apart
/// from independently created stores.
#[derive(Debug, Clone, Default)]
pub struct SessionStoreHandle(Arc<MemoryStore>);

impl SessionStoreHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[async_trait]
impl SessionStore for SessionStoreHandle {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        self.0.create(record).await
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.0.save(record).await
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        self.0.load(session_id).await
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.0.delete(session_id).await
    }
}

/// Resolved session middleware configuration.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub secret: String,
    pub resave: bool,
    pub save_uninitialized: bool,
    pub secure: bool,
    pub inactivity: Option<time::Duration>,
    pub store: SessionStoreHandle,
}

impl SessionSettings {
    /// Resolve `options` against the defaults, backed by a new empty store.
    pub fn from_options(options: &StoreOptions) -> Self {
        Self {
            secret: options
                .secret
                .clone()
                .unwrap_or_else(|| DEFAULT_SESSION_SECRET.to_owned()),
            resave: options.resave.unwrap_or(DEFAULT_RESAVE),
            save_uninitialized: options
                .save_uninitialized
                .unwrap_or(DEFAULT_SAVE_UNINITIALIZED),
            secure: options.secure.unwrap_or(false),
            inactivity: options.inactivity_secs.map(time::Duration::seconds),
            store: SessionStoreHandle::new(),
        }
    }

    /// Signing key for the session cookie, the SHA-512 digest of `secret`.
    pub fn signing_key(&self) -> Key {
        Key::from(Sha512::digest(self.secret.as_bytes()).as_slice())
    }

    /// Install session middleware over every route currently in `router`.
    /// The session cookie is signed with [`SessionSettings::signing_key`].
    pub fn apply<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let router = if self.save_uninitialized {
            router.layer(middleware::from_fn(mark_uninitialized))
        } else {
            router
        };

        let layer = SessionManagerLayer::new(self.store.clone())
            .with_always_save(self.resave)
            .with_secure(self.secure);
        let layer = match self.inactivity {
            Some(inactivity) => layer.with_expiry(Expiry::OnInactivity(inactivity)),
            None => layer,
        };

        router.layer(layer.with_signed(self.signing_key()))
    }
}

/// Split installer options into session settings and client options.
///
/// With a store configured, both results share the same [`SessionStoreHandle`].
/// The caller's options are left untouched.
pub fn prepare_session(options: &InstallOptions) -> (Option<SessionSettings>, ClientOptions) {
    let settings = options.store.as_ref().map(SessionSettings::from_options);
    let client_options = ClientOptions {
        store: settings.as_ref().map(|s| s.store.clone()),
        extras: options.extras.clone(),
    };
    (settings, client_options)
}

async fn mark_uninitialized(request: Request, next: Next) -> Response {
    if let Some(session) = request.extensions().get::<Session>().cloned() {
        // `is_empty` loads the record; an unknown cookie leaves the id cleared.
        if session.is_empty().await && session.id().is_none() {
            match session.insert(INITIALIZED_AT_KEY, Utc::now().timestamp()).await {
                Ok(()) => debug!("initialized new session"),
                Err(e) => warn!(error = %e, "failed to initialize session"),
            }
        }
    }
    next.run(request).await
}
