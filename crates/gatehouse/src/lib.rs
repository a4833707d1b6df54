//! Wires an identity client into an axum router.
//!
//! [`Gatekeeper::configure`] prepares optional session middleware, builds the
//! identity client, hands an [`AuthContext`] to route registration and installs
//! the client's middleware over the registered routes. Route-level checks come
//! from [`Gatekeeper::protect`] and [`Gatekeeper::enforcer`], which delegate to
//! the configured client.

pub mod client;
pub mod context;
pub mod error;
pub mod gatekeeper;
pub mod guard;
pub mod header;
pub mod identity;
pub mod options;
pub mod session;

pub use client::IdentityClient;
pub use context::{AuthContext, install};
pub use error::GatehouseError;
pub use gatekeeper::Gatekeeper;
pub use guard::Guard;
pub use identity::{GrantedPermissions, Identity};
pub use options::{ClientOptions, InstallOptions};
pub use session::{SessionSettings, SessionStoreHandle, StoreOptions};
