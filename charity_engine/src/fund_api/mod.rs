//! # Charity fund public API
//!
//! The `fund_api` module exposes the programmatic API of the charity fund. It is split by audience:
//!
//! * [`project_api`] is for fund administrators: opening projects, changing or removing them, and listing them.
//! * [`donation_api`] records donations and lists them, either all of them (for administrators) or per user.
//!
//! Both APIs validate their input and apply the business guards before anything is written, and both trigger an
//! allocation run whenever a new project or donation is created.
//!
//! # API usage
//!
//! An API instance is created by supplying a database backend that implements
//! [`CharityDatabase`](crate::traits::CharityDatabase):
//!
//! ```rust,ignore
//! use charity_common::Amount;
//! use charity_engine::{db_types::NewDonation, DonationApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/charity_fund.db", 5).await?;
//! let api = DonationApi::new(db);
//! let donation = api.create_donation(NewDonation::new(Amount::from(500)).with_user_id(42)).await?;
//! ```
pub mod donation_api;
pub mod project_api;
