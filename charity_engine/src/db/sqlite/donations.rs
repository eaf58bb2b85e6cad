use chrono::{DateTime, Utc};
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Donation, NewDonation},
    traits::FundingError,
};

/// Inserts a new, open donation with nothing invested. This is not atomic. Embed the call inside a transaction if
/// you need atomicity.
pub async fn insert_donation(
    donation: NewDonation,
    create_date: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Donation, FundingError> {
    let donation: Donation = sqlx::query_as(
        r#"
            INSERT INTO donations (comment, user_id, full_amount, invested_amount, fully_invested, create_date)
            VALUES ($1, $2, $3, 0, FALSE, $4)
            RETURNING *;
        "#,
    )
    .bind(donation.comment)
    .bind(donation.user_id)
    .bind(donation.full_amount)
    .bind(create_date)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Donation #{} of {} inserted", donation.id, donation.funding.full_amount);
    Ok(donation)
}

pub async fn fetch_donation(id: i64, conn: &mut SqliteConnection) -> Result<Option<Donation>, FundingError> {
    let donation = sqlx::query_as("SELECT * FROM donations WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(donation)
}

/// Returns all donations, in queue order.
pub async fn fetch_donations(conn: &mut SqliteConnection) -> Result<Vec<Donation>, FundingError> {
    let donations = sqlx::query_as("SELECT * FROM donations ORDER BY create_date ASC, id ASC").fetch_all(conn).await?;
    Ok(donations)
}

pub async fn fetch_donations_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Donation>, FundingError> {
    let donations = sqlx::query_as("SELECT * FROM donations WHERE user_id = $1 ORDER BY create_date ASC, id ASC")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(donations)
}
