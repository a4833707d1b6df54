//! Type-erased async request checks.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::response::Response;
use futures::future::BoxFuture;
use http::Request;
use tower_http::auth::{AsyncAuthorizeRequest, AsyncRequireAuthorizationLayer};

/// Outcome of a guard: the request to pass on, or the response to answer with.
pub type GuardFuture = BoxFuture<'static, Result<Request<Body>, Response>>;

type CheckFn = dyn Fn(Request<Body>) -> GuardFuture + Send + Sync;

/// A request check produced by an identity client.
///
/// `Ok(request)` lets the (possibly enriched) request continue down the stack,
/// `Err(response)` short-circuits. Install it with [`Guard::layer`]:
///
/// ```ignore
/// Router::new().route("/admin", get(admin).route_layer(guard.layer()))
/// ```
#[derive(Clone)]
pub struct Guard {
    check: Arc<CheckFn>,
}

impl Guard {
    pub fn new<F, Fut>(check: F) -> Self
    where
        F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Request<Body>, Response>> + Send + 'static,
    {
        Self {
            check: Arc::new(move |request| Box::pin(check(request))),
        }
    }

    /// A guard that lets every request through untouched.
    pub fn allow_all() -> Self {
        Self::new(|request| async move { Ok(request) })
    }

    pub async fn check(&self, request: Request<Body>) -> Result<Request<Body>, Response> {
        (self.check)(request).await
    }

    pub fn layer(self) -> AsyncRequireAuthorizationLayer<Self> {
        AsyncRequireAuthorizationLayer::new(self)
    }

    /// `true` if both values are clones of the same guard.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.check, &other.check)
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}

impl AsyncAuthorizeRequest<Body> for Guard {
    type RequestBody = Body;
    type ResponseBody = Body;
    type Future = GuardFuture;

    fn authorize(&mut self, request: Request<Body>) -> Self::Future {
        (self.check)(request)
    }
}
