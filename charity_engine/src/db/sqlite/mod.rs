//! # SQLite backend
//!
//! [`SqliteDatabase`] implements [`CharityDatabase`](crate::traits::CharityDatabase) on top of SQLite.
//!
//! The "low-level" interactions live in the submodules as simple functions (rather than stateful structs) that accept
//! a `&mut SqliteConnection` argument. Callers can obtain a connection from a pool, or create an atomic transaction
//! as the need arises and call through to the functions without any other changes.
//!
//! ## Serializing allocation runs
//! Two allocation runs must never claim the same open counterpart. SQLite has a single writer lock per database, so
//! every write transaction here issues its first *write* before any read. The transaction then owns the write lock
//! for its whole lifetime, and concurrent runs queue up behind it (for at most the configured busy timeout) instead
//! of reading a queue that is about to change.
use std::{str::FromStr, time::Duration};

use log::*;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

pub mod donations;
pub mod funding;
pub mod projects;
mod sqlite_impl;

pub use funding::SqliteOpenQueue;
pub use sqlite_impl::SqliteDatabase;

pub async fn new_pool(url: &str, max_connections: u32, busy_timeout: Duration) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true).busy_timeout(busy_timeout);
    trace!("🗃️ Opening pool of {max_connections} connections to {url}");
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}
