//! # The allocation engine
//!
//! Whenever a project or a donation is created, it is folded against the queue of open records of the *other* kind,
//! oldest first, until either the new record is fully invested or the queue runs dry.
//!
//! Each step moves `min(need_self, need_other)` from one side to the other. After the move, each side is checked
//! independently to see whether it has just reached its target:
//!
//! | need_self vs need_other | counterpart          | new record            | loop      |
//! |-------------------------|----------------------|-----------------------|-----------|
//! | `<`                     | stays open (partial) | closes                | stops     |
//! | `==`                    | closes               | closes                | stops     |
//! | `>`                     | closes               | stays open (partial)  | continues |
//!
//! The engine knows nothing about storage. Backends hand it an [`OpenQueue`] bound to their own transaction, which
//! keeps the engine testable with an in-memory queue.
use charity_common::Amount;
use chrono::{DateTime, Utc};
use log::*;

use crate::db_types::{Funding, FundingKind, FundingRecord};

/// Access to the queue of open (not fully invested) records.
#[allow(async_fn_in_trait)]
pub trait OpenQueue {
    type Error;

    /// Returns the open record of the given kind with the smallest `create_date`, ties broken by the smallest id.
    ///
    /// A record saved as fully invested through [`Self::save`] must never be returned again.
    async fn next_open(&mut self, kind: FundingKind) -> Result<Option<FundingRecord>, Self::Error>;

    /// Writes back the funding state of a record that the engine has changed.
    async fn save(&mut self, kind: FundingKind, record: &FundingRecord) -> Result<(), Self::Error>;
}

/// A single movement of money between the new record and one counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub counterpart_id: i64,
    pub amount: Amount,
    /// Whether this transfer fully invested the counterpart.
    pub counterpart_closed: bool,
}

/// The outcome of one allocation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation {
    pub transfers: Vec<Transfer>,
}

impl Allocation {
    /// The total amount moved during the run. This always equals the new record's `invested_amount`.
    pub fn total(&self) -> Amount {
        self.transfers.iter().map(|t| t.amount).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    /// Ids of the counterparts that were fully invested during the run.
    pub fn closed_counterparts(&self) -> impl Iterator<Item = i64> + '_ {
        self.transfers.iter().filter(|t| t.counterpart_closed).map(|t| t.counterpart_id)
    }
}

/// Runs an allocation run for a freshly created record of kind `kind`.
///
/// `funding` is the new record's funding state and is updated in place; every counterpart the run touches is written
/// back through `queue`. All close-outs in the run are stamped with `now`.
///
/// The run itself cannot fail: the only errors are those reported by the queue.
pub async fn allocate<Q: OpenQueue>(
    queue: &mut Q,
    kind: FundingKind,
    funding: &mut Funding,
    now: DateTime<Utc>,
) -> Result<Allocation, Q::Error> {
    let counterpart_kind = kind.counterpart();
    let mut allocation = Allocation::default();
    loop {
        if funding.close_if_complete(now) {
            break;
        }
        let Some(mut other) = queue.next_open(counterpart_kind).await? else {
            trace!("🔀️ No open {counterpart_kind} left for the new {kind}");
            break;
        };
        let amount = funding.remaining().min(other.funding.remaining());
        funding.invest(amount, now);
        let counterpart_closed = other.funding.invest(amount, now);
        queue.save(counterpart_kind, &other).await?;
        trace!(
            "🔀️ Moved {amount} between the new {kind} and {counterpart_kind} #{}{}",
            other.id,
            if counterpart_closed { ", which is now fully invested" } else { "" }
        );
        allocation.transfers.push(Transfer { counterpart_id: other.id, amount, counterpart_closed });
        if funding.fully_invested {
            break;
        }
    }
    debug!(
        "🔀️ Allocation run for new {kind} complete. {} transfers, {} invested of {}",
        allocation.transfers.len(),
        funding.invested_amount,
        funding.full_amount
    );
    Ok(allocation)
}
