use std::fmt::Display;

use charity_common::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::traits::FundingError;

/// The longest project name the fund will accept, in characters.
pub const MAX_PROJECT_NAME_LENGTH: usize = 100;

//--------------------------------------     FundingKind      ---------------------------------------------------------
/// The two sides of the fund. Projects absorb money and donations supply it; the allocation engine treats them
/// symmetrically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FundingKind {
    Project,
    Donation,
}

impl FundingKind {
    /// The kind on the other side of the ledger.
    pub fn counterpart(&self) -> Self {
        match self {
            FundingKind::Project => FundingKind::Donation,
            FundingKind::Donation => FundingKind::Project,
        }
    }

    /// The table that holds records of this kind.
    pub fn table(&self) -> &'static str {
        match self {
            FundingKind::Project => "charity_projects",
            FundingKind::Donation => "donations",
        }
    }
}

impl Display for FundingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FundingKind::Project => write!(f, "project"),
            FundingKind::Donation => write!(f, "donation"),
        }
    }
}

//--------------------------------------       Funding        ---------------------------------------------------------
/// The funding state shared by projects and donations.
///
/// After every engine operation the following hold:
/// * `0 <= invested_amount <= full_amount`
/// * `fully_invested` is true exactly when `invested_amount == full_amount`
/// * `close_date` is set exactly when `fully_invested` is true, and never changes once set.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Funding {
    pub full_amount: Amount,
    pub invested_amount: Amount,
    pub fully_invested: bool,
    pub create_date: DateTime<Utc>,
    pub close_date: Option<DateTime<Utc>>,
}

impl Funding {
    /// A fresh, open funding state with nothing invested yet.
    pub fn new(full_amount: Amount, create_date: DateTime<Utc>) -> Self {
        Self { full_amount, invested_amount: Amount::zero(), fully_invested: false, create_date, close_date: None }
    }

    /// How much is still needed (for a project) or still available (for a donation).
    pub fn remaining(&self) -> Amount {
        self.full_amount - self.invested_amount
    }

    pub fn is_open(&self) -> bool {
        !self.fully_invested
    }

    /// Moves `amount` into this entity, closing it if the target has been reached.
    ///
    /// Returns `true` if this call closed the entity.
    pub fn invest(&mut self, amount: Amount, now: DateTime<Utc>) -> bool {
        debug_assert!(amount <= self.remaining(), "investment of {amount} exceeds remaining {}", self.remaining());
        self.invested_amount += amount;
        self.close_if_complete(now)
    }

    /// Closes the entity if it is open and has been fully invested. Returns `true` if the entity was closed by this
    /// call.
    pub fn close_if_complete(&mut self, now: DateTime<Utc>) -> bool {
        if self.fully_invested || self.invested_amount != self.full_amount {
            return false;
        }
        self.fully_invested = true;
        self.close_date = Some(now);
        true
    }

    /// Checks the funding invariants.
    pub fn is_consistent(&self) -> bool {
        let bounded = self.invested_amount >= Amount::zero() && self.invested_amount <= self.full_amount;
        let closed_iff_full = self.fully_invested == (self.invested_amount == self.full_amount);
        let dated_iff_closed = self.close_date.is_some() == self.fully_invested;
        bounded && closed_iff_full && dated_iff_closed
    }
}

//--------------------------------------    FundingRecord     ---------------------------------------------------------
/// A kind-agnostic view of a stored project or donation. This is what the open queue hands to the allocation engine.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct FundingRecord {
    pub id: i64,
    #[sqlx(flatten)]
    pub funding: Funding,
}

//--------------------------------------    CharityProject    ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct CharityProject {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub funding: Funding,
}

impl CharityProject {
    pub fn is_closed(&self) -> bool {
        self.funding.fully_invested
    }

    /// A project can only be removed while no money has been committed to it.
    pub fn check_deletable(&self) -> Result<(), FundingError> {
        if self.funding.fully_invested || self.funding.invested_amount.is_positive() {
            return Err(FundingError::NonDeletable(self.id));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewCharityProject {
    pub name: String,
    pub description: String,
    pub full_amount: Amount,
}

impl NewCharityProject {
    pub fn new<S1: Into<String>, S2: Into<String>>(name: S1, description: S2, full_amount: Amount) -> Self {
        Self { name: name.into(), description: description.into(), full_amount }
    }

    pub fn validate(&self) -> Result<(), FundingError> {
        validate_name(&self.name)?;
        validate_description(&self.description)?;
        validate_amount(self.full_amount)
    }
}

//--------------------------------------    ProjectUpdate     ---------------------------------------------------------
/// An administrative change to an open project. Fields left as `None` are untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub full_amount: Option<Amount>,
}

impl ProjectUpdate {
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_full_amount(mut self, full_amount: Amount) -> Self {
        self.full_amount = Some(full_amount);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.full_amount.is_none()
    }

    pub fn validate(&self) -> Result<(), FundingError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        if let Some(amount) = self.full_amount {
            validate_amount(amount)?;
        }
        Ok(())
    }

    /// Checks that this update may be applied to `project`: closed projects are immutable, and the target amount may
    /// never drop below what has already been invested.
    pub fn check_against(&self, project: &CharityProject) -> Result<(), FundingError> {
        if project.is_closed() {
            return Err(FundingError::ImmutableClosedEntity(project.id));
        }
        match self.full_amount {
            Some(requested) if requested < project.funding.invested_amount => Err(FundingError::InvalidAmountFloor {
                requested,
                invested: project.funding.invested_amount,
            }),
            _ => Ok(()),
        }
    }
}

//--------------------------------------       Donation       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Donation {
    pub id: i64,
    pub comment: Option<String>,
    pub user_id: Option<i64>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub funding: Funding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewDonation {
    pub full_amount: Amount,
    pub comment: Option<String>,
    pub user_id: Option<i64>,
}

impl NewDonation {
    pub fn new(full_amount: Amount) -> Self {
        Self { full_amount, comment: None, user_id: None }
    }

    pub fn with_comment<S: Into<String>>(mut self, comment: S) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_user_id(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn validate(&self) -> Result<(), FundingError> {
        validate_amount(self.full_amount)
    }
}

/// What a donor gets to see of their own donation. The investment internals and the owning user stay private to
/// the fund administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationReceipt {
    pub id: i64,
    pub full_amount: Amount,
    pub comment: Option<String>,
    pub create_date: DateTime<Utc>,
}

impl From<Donation> for DonationReceipt {
    fn from(donation: Donation) -> Self {
        Self {
            id: donation.id,
            full_amount: donation.funding.full_amount,
            comment: donation.comment,
            create_date: donation.funding.create_date,
        }
    }
}

//--------------------------------------      Validation      ---------------------------------------------------------
fn validate_name(name: &str) -> Result<(), FundingError> {
    if name.trim().is_empty() {
        return Err(FundingError::ValidationError("Project name cannot be empty".into()));
    }
    let len = name.chars().count();
    if len > MAX_PROJECT_NAME_LENGTH {
        return Err(FundingError::ValidationError(format!(
            "Project name is {len} characters long. The maximum is {MAX_PROJECT_NAME_LENGTH}"
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), FundingError> {
    if description.trim().is_empty() {
        return Err(FundingError::ValidationError("Project description cannot be empty".into()));
    }
    Ok(())
}

fn validate_amount(amount: Amount) -> Result<(), FundingError> {
    if !amount.is_positive() {
        return Err(FundingError::ValidationError(format!("Amount must be positive, but was {amount}")));
    }
    Ok(())
}
