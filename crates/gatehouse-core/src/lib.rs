//! Shared plumbing for Gatehouse crates and services.
//!
//! Error envelope, tracing setup, env config loading, request ids and health probes.

pub mod config;
pub mod error;
pub mod health;
pub mod middleware;
pub mod tracing;
