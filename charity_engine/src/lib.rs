//! Charity Fund Engine
//!
//! The charity fund records donations and keeps track of charity projects that are looking for money. Whenever a new
//! donation or project arrives, it is matched against the queue of open records on the other side, in strict arrival
//! order, with partial funding on either side.
//!
//! The library is divided into these main sections:
//! 1. The allocation engine ([`mod@allocation`]). This is the matching algorithm itself. It is storage-agnostic and
//!    talks to the outside world only through the [`OpenQueue`] trait.
//! 2. Database management and control ([`mod@db`]). Currently, SQLite is the supported backend. Backends implement the
//!    [`CharityDatabase`] trait. The data types stored in the database are defined in [`mod@db_types`] and are public.
//! 3. The public API ([`mod@fund_api`]). [`ProjectApi`] and [`DonationApi`] validate requests, apply the
//!    administrative guard rails and trigger allocation runs.
pub mod allocation;
pub mod config;
mod db;
pub mod db_types;
mod fund_api;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use allocation::{allocate, Allocation, OpenQueue, Transfer};
pub use config::EngineConfig;
#[cfg(feature = "sqlite")]
pub use db::sqlite::{SqliteDatabase, SqliteOpenQueue};
pub use fund_api::{donation_api::DonationApi, project_api::ProjectApi};
pub use traits::{CharityDatabase, FundingError};
