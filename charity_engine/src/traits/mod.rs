//! # Backend contracts
//!
//! A storage backend has to provide two things before the fund can run on top of it:
//!
//! * [`CharityDatabase`] is the high-level contract. Every write that touches funding state (creating a project or a
//!   donation, changing or removing a project) is a single atomic call on this trait, so that an allocation run is
//!   either committed in full or not at all.
//! * An [`OpenQueue`](crate::allocation::OpenQueue) that the backend hands to the allocation engine inside its own
//!   transaction. It is not part of this trait because the queue only lives as long as that transaction.
mod charity_database;

pub use charity_database::{CharityDatabase, FundingError};
