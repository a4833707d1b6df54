use std::sync::{PoisonError, RwLock};

use axum::Router;
use tracing::warn;

use crate::client::IdentityClient;
use crate::context::{AuthContext, install};
use crate::error::GatehouseError;
use crate::guard::Guard;
use crate::options::InstallOptions;

/// Holds the configured identity client for an application.
///
/// Create one at startup, call [`Gatekeeper::configure`], then obtain route
/// guards with [`Gatekeeper::protect`] / [`Gatekeeper::enforcer`]. Both fail with
/// [`GatehouseError::NotConfigured`] until `configure` has succeeded.
///
/// Calling `configure` again replaces the retained client: the previous client's
/// [`IdentityClient::shutdown`] runs, and routers built from it keep their own
/// client and session store until dropped.
pub struct Gatekeeper<C> {
    current: RwLock<Option<AuthContext<C>>>,
}

impl<C> Default for Gatekeeper<C> {
    fn default() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }
}

impl<C: IdentityClient> Gatekeeper<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the client, register routes against it, and install its middleware.
    ///
    /// `routes` receives the new context and returns the routes to cover; the
    /// returned router has the identity middleware and, if store options were
    /// given, session middleware applied to all of them.
    pub fn configure<S, F>(
        &self,
        config: C::Config,
        options: &InstallOptions,
        routes: F,
    ) -> Result<Router<S>, GatehouseError>
    where
        S: Clone + Send + Sync + 'static,
        F: FnOnce(&AuthContext<C>) -> Router<S>,
    {
        let context = install::<C>(config, options)?;
        self.retain(context.clone());
        Ok(context.attach(routes(&context)))
    }

    pub fn context(&self) -> Result<AuthContext<C>, GatehouseError> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(GatehouseError::NotConfigured)
    }

    pub fn is_configured(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn protect(&self, conditions: C::Conditions) -> Result<Guard, GatehouseError> {
        Ok(self.context()?.protect(conditions))
    }

    pub fn enforcer(
        &self,
        permissions: C::Permissions,
        options: C::EnforcerOptions,
    ) -> Result<Guard, GatehouseError> {
        Ok(self.context()?.enforcer(permissions, options))
    }

    fn retain(&self, context: AuthContext<C>) {
        let previous = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(context);
        if let Some(previous) = previous {
            warn!("identity client re-configured; shutting down previous instance");
            previous.shutdown();
        }
    }
}
