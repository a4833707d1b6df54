//! Test utilities for Gatehouse.
//!
//! Provides `StubIdentityClient`, `MockIdentity` gateway headers and cookie helpers.
//! Use from tests only, never from production code.

pub mod auth;
pub mod cookie;
pub mod stub;

pub use auth::MockIdentity;
pub use stub::{StubConfig, StubError, StubIdentityClient};
