use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Router};
use tower::ServiceExt;

use gatehouse::header::{EnforcerOptions, HeaderClientConfig, HeaderIdentityClient, Protection};
use gatehouse::{AuthContext, Gatekeeper, GrantedPermissions, Identity, InstallOptions, StoreOptions};
use gatehouse_testing::MockIdentity;
use gatehouse_testing::cookie::{session_cookie, with_cookie};

use crate::helpers::{self, body_json, body_string};

async fn me(identity: Identity) -> String {
    identity.subject
}

async fn documents(Extension(granted): Extension<GrantedPermissions>) -> String {
    granted.0.join(",")
}

fn routes(ctx: &AuthContext<HeaderIdentityClient>) -> Router {
    Router::new()
        .route(
            "/me",
            get(me).route_layer(ctx.protect(Protection::Authenticated).layer()),
        )
        .route(
            "/admin",
            get(me).route_layer(ctx.protect(Protection::role("realm:admin")).layer()),
        )
        .route(
            "/documents",
            get(documents).route_layer(
                ctx.enforcer(vec!["document:read".to_owned()], EnforcerOptions::default())
                    .layer(),
            ),
        )
}

fn app(config: HeaderClientConfig, options: InstallOptions) -> Router {
    Gatekeeper::<HeaderIdentityClient>::new()
        .configure(config, &options, routes)
        .unwrap()
}

fn stateless_app() -> Router {
    app(HeaderClientConfig::new("acme", "portal"), InstallOptions::default())
}

fn session_app(bearer_only: bool) -> Router {
    app(
        HeaderClientConfig::new("acme", "portal").bearer_only(bearer_only),
        InstallOptions::default().with_store(StoreOptions::default()),
    )
}

#[tokio::test]
async fn should_reject_anonymous_request_with_json_envelope() {
    let resp = stateless_app().oneshot(helpers::get("/me")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(resp).await;
    assert_eq!(json["kind"], "UNAUTHORIZED");
}

#[tokio::test]
async fn should_pass_identified_request() {
    let resp = stateless_app()
        .oneshot(MockIdentity::new("alice").get("/me"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "alice");
}

#[tokio::test]
async fn should_forbid_missing_realm_role() {
    let app = stateless_app();

    let resp = app
        .clone()
        .oneshot(MockIdentity::new("bob").role("portal:editor").get("/admin"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await["kind"], "FORBIDDEN");

    let resp = app
        .oneshot(MockIdentity::new("root").role("realm:admin").get("/admin"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn should_expose_granted_permissions_to_handler() {
    let app = stateless_app();

    let resp = app
        .clone()
        .oneshot(MockIdentity::new("dave").permission("document:read").get("/documents"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "document:read");

    let resp = app
        .oneshot(MockIdentity::new("erin").permission("invoice:read").get("/documents"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn should_restore_identity_from_session() {
    let app = session_app(false);

    let resp = app
        .clone()
        .oneshot(MockIdentity::new("alice").get("/me"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = session_cookie(&resp).expect("session cookie");

    let resp = app
        .oneshot(with_cookie(helpers::get("/me"), &cookie))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "alice");
}

#[tokio::test]
async fn should_not_restore_identity_when_bearer_only() {
    let app = session_app(true);

    let resp = app
        .clone()
        .oneshot(MockIdentity::new("alice").get("/me"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = session_cookie(&resp).expect("session cookie");

    let resp = app
        .oneshot(with_cookie(helpers::get("/me"), &cookie))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[test]
fn should_fail_configure_on_invalid_client_config() {
    let gatekeeper = Gatekeeper::<HeaderIdentityClient>::new();
    let result = gatekeeper.configure(
        HeaderClientConfig::new("", "portal"),
        &InstallOptions::default(),
        routes,
    );
    assert!(result.is_err());
    assert!(!gatekeeper.is_configured());
}
