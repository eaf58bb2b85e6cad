//! Queries shared by both sides of the ledger, parameterised over [`FundingKind`].
use chrono::{DateTime, Utc};
use log::trace;
use sqlx::SqliteConnection;

use crate::{
    allocation::OpenQueue,
    db_types::{Funding, FundingKind, FundingRecord},
    traits::FundingError,
};

/// Returns the oldest open record of the given kind. Ties on `create_date` are broken by id, so that the queue has a
/// total order.
pub async fn next_open(kind: FundingKind, conn: &mut SqliteConnection) -> Result<Option<FundingRecord>, FundingError> {
    let sql = format!(
        "SELECT id, full_amount, invested_amount, fully_invested, create_date, close_date FROM {} WHERE \
         fully_invested = FALSE ORDER BY create_date ASC, id ASC LIMIT 1",
        kind.table()
    );
    let record = sqlx::query_as(sql.as_str()).fetch_optional(conn).await?;
    Ok(record)
}

/// Writes the investment state of a single record. The target amount and creation date are never touched here.
pub async fn save_funding(
    kind: FundingKind,
    id: i64,
    funding: &Funding,
    conn: &mut SqliteConnection,
) -> Result<(), FundingError> {
    let sql = format!(
        "UPDATE {} SET invested_amount = $1, fully_invested = $2, close_date = $3 WHERE id = $4",
        kind.table()
    );
    let result = sqlx::query(sql.as_str())
        .bind(funding.invested_amount)
        .bind(funding.fully_invested)
        .bind(funding.close_date)
        .bind(id)
        .execute(conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(FundingError::DatabaseError(format!("Cannot save funding state: {kind} #{id} does not exist")));
    }
    trace!("🗃️ {kind} #{id} now has {} of {} invested", funding.invested_amount, funding.full_amount);
    Ok(())
}

/// Overwrites the creation date of a record. Allocation runs call this once they hold the write lock, so that the
/// date reflects when the record actually joined the queue rather than when the request arrived.
pub async fn stamp_create_date(
    kind: FundingKind,
    id: i64,
    create_date: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<(), FundingError> {
    let sql = format!("UPDATE {} SET create_date = $1 WHERE id = $2", kind.table());
    let result = sqlx::query(sql.as_str()).bind(create_date).bind(id).execute(conn).await?;
    if result.rows_affected() == 0 {
        return Err(FundingError::DatabaseError(format!("Cannot set creation date: {kind} #{id} does not exist")));
    }
    Ok(())
}

/// The open queue, bound to a connection or (more usefully) to a transaction.
pub struct SqliteOpenQueue<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> SqliteOpenQueue<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }
}

impl OpenQueue for SqliteOpenQueue<'_> {
    type Error = FundingError;

    async fn next_open(&mut self, kind: FundingKind) -> Result<Option<FundingRecord>, Self::Error> {
        next_open(kind, &mut *self.conn).await
    }

    async fn save(&mut self, kind: FundingKind, record: &FundingRecord) -> Result<(), Self::Error> {
        save_funding(kind, record.id, &record.funding, &mut *self.conn).await
    }
}
