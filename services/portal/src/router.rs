use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use gatehouse::header::{EnforcerOptions, HeaderClientConfig, HeaderIdentityClient, Protection};
use gatehouse::{AuthContext, Gatekeeper, GatehouseError, InstallOptions};
use gatehouse_core::health::{healthz, readyz};
use gatehouse_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{admin, documents, me, visits};

pub fn build_routes(ctx: &AuthContext<HeaderIdentityClient>) -> Router {
    let router = Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Identity
        .route(
            "/me",
            get(me).route_layer(ctx.protect(Protection::Authenticated).layer()),
        )
        // Admin
        .route(
            "/admin",
            get(admin).route_layer(ctx.protect(Protection::role("realm:admin")).layer()),
        )
        // Documents
        .route(
            "/documents",
            get(documents).route_layer(
                ctx.enforcer(vec!["document:read".to_owned()], EnforcerOptions::default())
                    .layer(),
            ),
        );

    // Visits live in the session; without one the route does not exist.
    if ctx.session().is_none() {
        return router;
    }
    router.route(
        "/visits",
        get(visits).route_layer(ctx.protect(Protection::Authenticated).layer()),
    )
}

/// Configure the identity client on `gatekeeper` and build the full portal router.
pub fn build_app(
    gatekeeper: &Gatekeeper<HeaderIdentityClient>,
    identity: HeaderClientConfig,
    options: &InstallOptions,
) -> Result<Router, GatehouseError> {
    let router = gatekeeper.configure(identity, options, build_routes)?;
    Ok(router
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer()))
}
