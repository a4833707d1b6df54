//! Stub identity client.
//!
//! Every guard it issues stamps a header onto the request naming the client
//! instance and the arguments it was built from, so tests can see which
//! instance a route delegated to.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::http::{HeaderName, HeaderValue};
use gatehouse::{ClientOptions, Guard, IdentityClient};

pub const X_STUB_CLIENT: &str = "x-stub-client";
pub const X_STUB_PROTECT: &str = "x-stub-protect";
pub const X_STUB_ENFORCER: &str = "x-stub-enforcer";

#[derive(Debug, thiserror::Error)]
#[error("stub client {0} refused to start")]
pub struct StubError(pub String);

#[derive(Debug, Clone)]
pub struct StubConfig {
    pub tag: String,
    pub fail: bool,
    pub shutdowns: Arc<AtomicUsize>,
}

impl StubConfig {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_owned(),
            fail: false,
            shutdowns: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make construction fail with [`StubError`].
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// How many times a client built from this config was shut down.
    pub fn shutdown_count(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

pub struct StubIdentityClient {
    tag: String,
    options: ClientOptions,
    shutdowns: Arc<AtomicUsize>,
    issued: Mutex<Vec<Guard>>,
}

impl StubIdentityClient {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The options the installer passed to the constructor.
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// The most recent guard returned by `protect` or `enforcer`.
    pub fn last_issued(&self) -> Option<Guard> {
        self.issued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    fn issue(&self, guard: Guard) -> Guard {
        self.issued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(guard.clone());
        guard
    }
}

fn stamping(name: &'static str, value: String) -> Guard {
    let value = HeaderValue::from_str(&value).unwrap();
    Guard::new(move |mut request| {
        let value = value.clone();
        async move {
            request
                .headers_mut()
                .insert(HeaderName::from_static(name), value);
            Ok(request)
        }
    })
}

impl IdentityClient for StubIdentityClient {
    type Config = StubConfig;
    type Conditions = String;
    type Permissions = Vec<String>;
    type EnforcerOptions = String;
    type Error = StubError;

    fn new(options: ClientOptions, config: StubConfig) -> Result<Self, StubError> {
        if config.fail {
            return Err(StubError(config.tag));
        }
        Ok(Self {
            tag: config.tag,
            options,
            shutdowns: config.shutdowns,
            issued: Mutex::new(Vec::new()),
        })
    }

    fn middleware(&self) -> Guard {
        stamping(X_STUB_CLIENT, self.tag.clone())
    }

    fn protect(&self, conditions: String) -> Guard {
        self.issue(stamping(
            X_STUB_PROTECT,
            format!("{}:{}", self.tag, conditions),
        ))
    }

    fn enforcer(&self, permissions: Vec<String>, options: String) -> Guard {
        self.issue(stamping(
            X_STUB_ENFORCER,
            format!("{}:{}:{}", self.tag, permissions.join(","), options),
        ))
    }

    fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}
