use crate::guard::Guard;
use crate::options::ClientOptions;

/// An identity-and-access-management client the installer can wire into a router.
///
/// The condition and option types are defined by the implementation; the
/// installer and [`Gatekeeper`](crate::Gatekeeper) only forward them.
pub trait IdentityClient: Sized + Send + Sync + 'static {
    /// Client configuration (realm, resource, ...), forwarded verbatim to [`IdentityClient::new`].
    type Config;
    /// Access conditions accepted by [`IdentityClient::protect`].
    type Conditions;
    /// Permissions accepted by [`IdentityClient::enforcer`].
    type Permissions;
    /// Policy options accepted by [`IdentityClient::enforcer`].
    type EnforcerOptions;
    type Error: std::error::Error + Send + Sync + 'static;

    fn new(options: ClientOptions, config: Self::Config) -> Result<Self, Self::Error>;

    /// Guard installed in front of every route.
    fn middleware(&self) -> Guard;

    /// Guard enforcing `conditions` on a single route.
    fn protect(&self, conditions: Self::Conditions) -> Guard;

    /// Guard enforcing `permissions` under `options` on a single route.
    fn enforcer(&self, permissions: Self::Permissions, options: Self::EnforcerOptions) -> Guard;

    /// Called when a re-configuration retires this instance.
    fn shutdown(&self) {}
}
