//! SQLite backend for the dormfix persistence mirror.
//!
//! Implements [`dormfix_core::mirror::KeyValue`] over a single table so a
//! client's session, accounts and issues survive between processes.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteKv;

#[cfg(test)]
mod tests;
