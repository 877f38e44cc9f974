//! Core types and rules for the dormfix facility-issue desk.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it. Every operation is synchronous and runs to
//! completion; callers that share a [`desk::Desk`] across threads wrap it in
//! a lock.

pub mod client;
pub mod credential;
pub mod desk;
pub mod dorm;
pub mod error;
pub mod fixtures;
pub mod issue;
pub mod mirror;
pub mod query;
pub mod session;
pub mod store;
pub mod workflow;

pub use error::{Error, Result};
