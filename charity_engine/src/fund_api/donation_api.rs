use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Donation, DonationReceipt, NewDonation},
    traits::{CharityDatabase, FundingError},
};

/// `DonationApi` records donations and answers questions about them.
///
/// Creation returns the full [`Donation`] record. When responding to the donor, convert it into a
/// [`DonationReceipt`], which leaves out the investment details.
pub struct DonationApi<B> {
    db: B,
}

impl<B> Debug for DonationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DonationApi")
    }
}

impl<B> DonationApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}

impl<B> DonationApi<B>
where B: CharityDatabase
{
    /// Records a new donation and invests it into open projects, oldest first.
    pub async fn create_donation(&self, donation: NewDonation) -> Result<Donation, FundingError> {
        donation.validate()?;
        let (donation, allocation) = self.db.process_new_donation(donation).await?;
        let closed = allocation.closed_counterparts().count();
        info!(
            "🔄️💰️ Donation #{} of {} received. {} invested into {} projects, {closed} of which are now fully funded",
            donation.id,
            donation.funding.full_amount,
            allocation.total(),
            allocation.transfers.len()
        );
        Ok(donation)
    }

    pub async fn donation(&self, id: i64) -> Result<Option<Donation>, FundingError> {
        self.db.fetch_donation(id).await
    }

    pub async fn donations(&self) -> Result<Vec<Donation>, FundingError> {
        self.db.fetch_donations().await
    }

    /// A donor's own donations, oldest first, in the reduced form donors are allowed to see.
    pub async fn donations_for_user(&self, user_id: i64) -> Result<Vec<DonationReceipt>, FundingError> {
        trace!("🔄️💰️ Fetching donations for user #{user_id}");
        let donations = self.db.fetch_donations_for_user(user_id).await?;
        Ok(donations.into_iter().map(DonationReceipt::from).collect())
    }
}
