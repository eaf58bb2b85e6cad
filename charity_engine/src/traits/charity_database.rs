use charity_common::Amount;
use thiserror::Error;

use crate::{
    allocation::Allocation,
    db_types::{CharityProject, Donation, NewCharityProject, NewDonation, ProjectUpdate},
};

/// This trait defines the behaviour a storage backend needs in order to host the charity fund.
///
/// This behaviour includes:
/// * Running allocation runs when new projects or donations arrive
/// * Guarded administrative changes to projects
/// * Plain reads of projects and donations
#[allow(async_fn_in_trait)]
pub trait CharityDatabase: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Returns the id of the project with exactly this name, if there is one.
    async fn project_id_by_name(&self, name: &str) -> Result<Option<i64>, FundingError>;

    async fn fetch_project(&self, id: i64) -> Result<Option<CharityProject>, FundingError>;

    /// All projects, oldest first.
    async fn fetch_projects(&self) -> Result<Vec<CharityProject>, FundingError>;

    async fn fetch_donation(&self, id: i64) -> Result<Option<Donation>, FundingError>;

    /// All donations, oldest first.
    async fn fetch_donations(&self) -> Result<Vec<Donation>, FundingError>;

    /// All donations made by the given user, oldest first.
    async fn fetch_donations_for_user(&self, user_id: i64) -> Result<Vec<Donation>, FundingError>;

    /// Takes a new project, and in a single atomic transaction,
    /// * stores the project,
    /// * runs an allocation run against the queue of open donations, oldest first,
    /// * persists every donation touched by the run as well as the final state of the project.
    ///
    /// Name uniqueness is expected to have been checked by the caller. A name clash that slips past that check (a
    /// concurrent insert, for instance) is reported as [`FundingError::DuplicateName`] and nothing is stored.
    ///
    /// Returns the stored project along with a report of the transfers made.
    async fn process_new_project(
        &self,
        project: NewCharityProject,
    ) -> Result<(CharityProject, Allocation), FundingError>;

    /// Takes a new donation, and in a single atomic transaction,
    /// * stores the donation,
    /// * runs an allocation run against the queue of open projects, oldest first,
    /// * persists every project touched by the run as well as the final state of the donation.
    ///
    /// Returns the stored donation along with a report of the transfers made.
    async fn process_new_donation(&self, donation: NewDonation) -> Result<(Donation, Allocation), FundingError>;

    /// Applies an administrative change to a project.
    ///
    /// ## Failure modes:
    /// - The project does not exist.
    /// - The project is already fully invested. Closed projects cannot be changed at all.
    /// - The new `full_amount` is less than the amount already invested.
    /// - The new name belongs to another project.
    ///
    /// If the new `full_amount` equals the amount already invested, the project is closed as part of the update.
    async fn update_project(&self, id: i64, update: ProjectUpdate) -> Result<CharityProject, FundingError>;

    /// Removes a project that has not received any money. Returns the removed record.
    async fn delete_project(&self, id: i64) -> Result<CharityProject, FundingError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), FundingError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum FundingError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("A project with the name '{0}' already exists")]
    DuplicateName(String),
    #[error("The requested project (id {0}) does not exist")]
    ProjectNotFound(i64),
    #[error("Cannot set the target amount to {requested}, since {invested} has already been invested")]
    InvalidAmountFloor { requested: Amount, invested: Amount },
    #[error("Project {0} is fully invested and can no longer be changed")]
    ImmutableClosedEntity(i64),
    #[error("Project {0} has received investments and cannot be deleted")]
    NonDeletable(i64),
    #[error("Invalid input. {0}")]
    ValidationError(String),
}

impl From<sqlx::Error> for FundingError {
    fn from(e: sqlx::Error) -> Self {
        FundingError::DatabaseError(e.to_string())
    }
}
