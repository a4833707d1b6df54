use std::sync::Arc;

use axum::Router;
use tracing::info;

use crate::client::IdentityClient;
use crate::error::GatehouseError;
use crate::guard::Guard;
use crate::options::InstallOptions;
use crate::session::{SessionSettings, prepare_session};

/// A configured identity client and the session settings it was built with.
///
/// Cloning is cheap; clones share the client.
pub struct AuthContext<C> {
    client: Arc<C>,
    session: Option<SessionSettings>,
}

impl<C> Clone for AuthContext<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            session: self.session.clone(),
        }
    }
}

impl<C: IdentityClient> AuthContext<C> {
    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn session(&self) -> Option<&SessionSettings> {
        self.session.as_ref()
    }

    pub fn protect(&self, conditions: C::Conditions) -> Guard {
        self.client.protect(conditions)
    }

    pub fn enforcer(&self, permissions: C::Permissions, options: C::EnforcerOptions) -> Guard {
        self.client.enforcer(permissions, options)
    }

    /// Layer the client's middleware, then the session middleware, over `router`.
    ///
    /// Only routes already registered are covered. Requests pass the session
    /// layer first, then the identity middleware, then any route guards.
    pub fn attach<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let router = router.layer(self.client.middleware().layer());
        match &self.session {
            Some(settings) => settings.apply(router),
            None => router,
        }
    }

    pub(crate) fn shutdown(&self) {
        self.client.shutdown();
    }

    /// `true` if both contexts share the same client instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.client, &other.client)
    }
}

/// Build an identity client from `config` and `options`.
///
/// Store options, when present, become [`SessionSettings`] whose store is also
/// passed to the client. Constructor failures come back as
/// [`GatehouseError::Client`].
pub fn install<C: IdentityClient>(
    config: C::Config,
    options: &InstallOptions,
) -> Result<AuthContext<C>, GatehouseError> {
    let (session, client_options) = prepare_session(options);
    let client = C::new(client_options, config).map_err(GatehouseError::client)?;
    info!(
        client = std::any::type_name::<C>(),
        session = session.is_some(),
        "identity client installed"
    );
    Ok(AuthContext {
        client: Arc::new(client),
        session,
    })
}
