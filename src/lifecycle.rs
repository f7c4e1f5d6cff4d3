// Check-in / check-out orchestration
// The two multi-step sequences over the locker table. Each runs inside a
// single SQLite transaction: claim-and-mark for check-in, and the
// read / bill / append / release unit for check-out. A failure anywhere in
// the unit rolls the whole thing back, so an occupied locker can never lose
// its billing record and a freed locker can never carry a phantom charge.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;

use crate::billing::{self, FeeQuote};
use crate::error::{LockerError, LockerResult};
use crate::lockers::{self, Locker, LockerStatus, SizeClass};
use crate::transactions::{self, NewTransaction};

/// Outcome of a completed check-out
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub locker_id: i64,
    pub locker_number: String,
    pub check_in_time: DateTime<Utc>,
    pub check_out_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub fee_charged: i64,
}

/// Claim a free locker of the requested class and mark it occupied.
///
/// Find-then-occupy runs as one transactional unit; `occupy` additionally
/// re-checks the Free status, so two racing check-ins for the last locker of
/// a class resolve to exactly one success.
pub fn check_in(
    conn: &mut Connection,
    size: SizeClass,
    now: DateTime<Utc>,
) -> LockerResult<Locker> {
    let tx = conn.transaction()?;

    let locker = lockers::find_free_by_size(&tx, size)?
        .ok_or(LockerError::NoLockerAvailable(size))?;
    lockers::occupy(&tx, locker.id, now)?;

    tx.commit()?;

    Ok(Locker {
        status: LockerStatus::Occupied,
        check_in_time: Some(now),
        ..locker
    })
}

/// Bill and free an occupied locker.
///
/// Appending the transaction record and releasing the locker happen inside
/// one SQLite transaction; dropping it on any error path rolls both back.
pub fn check_out(conn: &mut Connection, id: i64, now: DateTime<Utc>) -> LockerResult<CheckoutReceipt> {
    let tx = conn.transaction()?;

    let locker = lockers::get(&tx, id)?.ok_or(LockerError::LockerNotFound(id))?;
    if locker.status == LockerStatus::Free {
        return Err(LockerError::LockerAlreadyFree(locker.number));
    }

    let FeeQuote {
        duration_minutes,
        fee,
    } = billing::quote_fee(locker.check_in_time, now);

    // checkInTime is non-null for any occupied locker (store invariant);
    // fall back to "now" rather than fail the checkout if it ever is not
    let check_in_time = locker.check_in_time.unwrap_or(now);

    transactions::append(
        &tx,
        &NewTransaction {
            locker_id: locker.id,
            locker_number: locker.number.clone(),
            check_in_time,
            check_out_time: now,
            duration_minutes,
            fee_charged: fee,
        },
    )?;
    lockers::release(&tx, locker.id)?;

    tx.commit()?;

    Ok(CheckoutReceipt {
        locker_id: locker.id,
        locker_number: locker.number,
        check_in_time,
        check_out_time: now,
        duration_minutes,
        fee_charged: fee,
    })
}

/// Advisory fee preview for an occupied locker.
///
/// Runs the same billing rule the checkout path uses; nothing is mutated and
/// the client never supplies its own fee.
pub fn quote(conn: &Connection, id: i64, now: DateTime<Utc>) -> LockerResult<FeeQuote> {
    let locker = lockers::get(conn, id)?.ok_or(LockerError::LockerNotFound(id))?;
    if locker.status == LockerStatus::Free {
        return Err(LockerError::LockerAlreadyFree(locker.number));
    }

    Ok(billing::quote_fee(locker.check_in_time, now))
}
