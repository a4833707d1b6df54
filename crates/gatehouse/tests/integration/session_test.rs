use axum::Router;
use axum::http::header::SET_COOKIE;
use axum::routing::get;
use tower::ServiceExt;

use gatehouse::session::DEFAULT_SESSION_SECRET;
use gatehouse::{Gatekeeper, InstallOptions, StoreOptions};
use gatehouse_testing::cookie::{session_cookie, with_cookie};
use gatehouse_testing::{StubConfig, StubIdentityClient};

use crate::helpers::{self, echo_stub};

fn configure(options: &InstallOptions) -> (Gatekeeper<StubIdentityClient>, Router) {
    let gatekeeper = Gatekeeper::new();
    let app = gatekeeper
        .configure(StubConfig::new("s"), options, |_| {
            Router::new().route("/", get(echo_stub))
        })
        .unwrap();
    (gatekeeper, app)
}

#[test]
fn should_resolve_defaults_when_store_has_no_fields() {
    let (gatekeeper, _) = configure(&InstallOptions::default().with_store(StoreOptions::default()));
    let ctx = gatekeeper.context().unwrap();
    let settings = ctx.session().unwrap();

    assert_eq!(settings.secret, DEFAULT_SESSION_SECRET);
    assert_eq!(settings.secret, "mySecret");
    assert!(!settings.resave);
    assert!(settings.save_uninitialized);
}

#[test]
fn should_use_explicit_store_fields_verbatim() {
    let store = StoreOptions {
        secret: Some("x".to_owned()),
        resave: Some(true),
        save_uninitialized: Some(false),
        ..StoreOptions::default()
    };
    let (gatekeeper, _) = configure(&InstallOptions::default().with_store(store));
    let ctx = gatekeeper.context().unwrap();
    let settings = ctx.session().unwrap();

    assert_eq!(settings.secret, "x");
    assert!(settings.resave);
    assert!(!settings.save_uninitialized);
}

#[test]
fn should_pass_the_same_store_to_client_and_session_middleware() {
    let (gatekeeper, _) = configure(&InstallOptions::default().with_store(StoreOptions::default()));
    let ctx = gatekeeper.context().unwrap();

    let session_store = &ctx.session().unwrap().store;
    let client_store = ctx.client().options().store.as_ref().unwrap();
    assert!(client_store.ptr_eq(session_store));
}

#[test]
fn should_use_a_fresh_store_per_configure() {
    let options = InstallOptions::default().with_store(StoreOptions::default());
    let gatekeeper = Gatekeeper::<StubIdentityClient>::new();
    let _first_app = gatekeeper
        .configure(StubConfig::new("a"), &options, |_| Router::<()>::new())
        .unwrap();
    let first = gatekeeper.context().unwrap();
    let _second_app = gatekeeper
        .configure(StubConfig::new("b"), &options, |_| Router::<()>::new())
        .unwrap();
    let second = gatekeeper.context().unwrap();

    assert!(!first.session().unwrap().store.ptr_eq(&second.session().unwrap().store));
}

#[tokio::test]
async fn should_skip_session_middleware_without_store() {
    let (gatekeeper, app) = configure(&InstallOptions::default());
    let ctx = gatekeeper.context().unwrap();
    assert!(ctx.session().is_none());
    assert!(ctx.client().options().store.is_none());

    let resp = app.oneshot(helpers::get("/")).await.unwrap();
    assert!(resp.headers().get(SET_COOKIE).is_none());
}

#[tokio::test]
async fn should_issue_cookie_for_untouched_session_when_saving_uninitialized() {
    let (_, app) = configure(&InstallOptions::default().with_store(StoreOptions::default()));
    let resp = app.oneshot(helpers::get("/")).await.unwrap();
    assert!(resp.headers().get(SET_COOKIE).is_some());
}

#[tokio::test]
async fn should_not_issue_cookie_for_untouched_session_otherwise() {
    let store = StoreOptions {
        save_uninitialized: Some(false),
        ..StoreOptions::default()
    };
    let (_, app) = configure(&InstallOptions::default().with_store(store));
    let resp = app.oneshot(helpers::get("/")).await.unwrap();
    assert!(resp.headers().get(SET_COOKIE).is_none());
}

fn signed_value_len(cookie: &str) -> usize {
    cookie.split_once('=').unwrap().1.len()
}

// A signed value is a 44-character base64 MAC followed by the 22-character id;
// an unsigned one is the bare id.
const SIGNED_VALUE_LEN: usize = 44 + 22;

#[tokio::test]
async fn should_sign_cookie_with_default_secret() {
    let (_, app) = configure(&InstallOptions::default().with_store(StoreOptions::default()));
    let resp = app.oneshot(helpers::get("/")).await.unwrap();
    let cookie = session_cookie(&resp).unwrap();
    assert!(signed_value_len(&cookie) >= SIGNED_VALUE_LEN);
}

#[tokio::test]
async fn should_sign_cookie_with_short_and_long_secrets() {
    for secret in ["x".to_owned(), "s".repeat(40), "k".repeat(64)] {
        let store = StoreOptions {
            secret: Some(secret),
            ..StoreOptions::default()
        };
        let (_, app) = configure(&InstallOptions::default().with_store(store));
        let resp = app.oneshot(helpers::get("/")).await.unwrap();
        let cookie = session_cookie(&resp).unwrap();
        assert!(signed_value_len(&cookie) >= SIGNED_VALUE_LEN);
    }
}

#[tokio::test]
async fn should_ignore_cookie_signed_with_another_secret() {
    let signer = StoreOptions {
        secret: Some("first".to_owned()),
        ..StoreOptions::default()
    };
    let (_, first) = configure(&InstallOptions::default().with_store(signer));
    let resp = first.oneshot(helpers::get("/")).await.unwrap();
    let cookie = session_cookie(&resp).unwrap();

    let verifier = StoreOptions {
        secret: Some("second".to_owned()),
        save_uninitialized: Some(false),
        ..StoreOptions::default()
    };
    let (_, second) = configure(&InstallOptions::default().with_store(verifier));
    let resp = second
        .oneshot(with_cookie(helpers::get("/"), &cookie))
        .await
        .unwrap();
    // Untouched and unrecognized: nothing to save, nothing to clear.
    assert!(resp.headers().get(SET_COOKIE).is_none());
}

#[tokio::test]
async fn should_reinitialize_session_for_unknown_cookie() {
    let options = InstallOptions::default().with_store(StoreOptions::default());
    let (_, first) = configure(&options);
    let resp = first.oneshot(helpers::get("/")).await.unwrap();
    let stale = session_cookie(&resp).unwrap();

    // Same secret, fresh store: the signature checks out but the id is unknown.
    let (_, second) = configure(&options);
    let resp = second
        .oneshot(with_cookie(helpers::get("/"), &stale))
        .await
        .unwrap();
    let fresh = session_cookie(&resp).unwrap();
    assert_ne!(fresh, stale);
    assert!(signed_value_len(&fresh) >= SIGNED_VALUE_LEN);
}
