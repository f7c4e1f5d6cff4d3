// 🧾 Transaction Log - append-only record of completed check-outs
// Rows are written exactly once per checkout and never mutated. locker_number
// is a denormalized snapshot of the locker's display label at checkout time,
// not a live reference; a receipt keeps its label even if the locker catalog
// changes later.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::error::LockerResult;

/// A completed check-out. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub locker_id: i64,
    pub locker_number: String,
    pub check_in_time: DateTime<Utc>,
    pub check_out_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub fee_charged: i64,
}

/// Fields for a transaction about to be appended (id assigned by the store)
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub locker_id: i64,
    pub locker_number: String,
    pub check_in_time: DateTime<Utc>,
    pub check_out_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub fee_charged: i64,
}

/// Append one entry to the log. No validation beyond required fields;
/// the only failure mode is the store itself.
pub fn append(conn: &Connection, entry: &NewTransaction) -> LockerResult<i64> {
    conn.execute(
        "INSERT INTO transactions (
            locker_id, locker_number, check_in_time, check_out_time,
            duration_minutes, fee_charged
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            entry.locker_id,
            entry.locker_number,
            entry.check_in_time.to_rfc3339(),
            entry.check_out_time.to_rfc3339(),
            entry.duration_minutes,
            entry.fee_charged,
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

/// The most recently appended entries, newest first
pub fn recent(conn: &Connection, limit: u32) -> LockerResult<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, locker_id, locker_number, check_in_time, check_out_time,
                duration_minutes, fee_charged
         FROM transactions
         ORDER BY id DESC
         LIMIT ?1",
    )?;

    let transactions = stmt
        .query_map(params![limit], |row| {
            let check_in_str: String = row.get(3)?;
            let check_out_str: String = row.get(4)?;

            Ok(Transaction {
                id: row.get(0)?,
                locker_id: row.get(1)?,
                locker_number: row.get(2)?,
                check_in_time: DateTime::parse_from_rfc3339(&check_in_str)
                    .map_err(|_| rusqlite::Error::InvalidQuery)?
                    .with_timezone(&Utc),
                check_out_time: DateTime::parse_from_rfc3339(&check_out_str)
                    .map_err(|_| rusqlite::Error::InvalidQuery)?
                    .with_timezone(&Utc),
                duration_minutes: row.get(5)?,
                fee_charged: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(transactions)
}

/// Total number of logged transactions
pub fn count(conn: &Connection) -> LockerResult<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
    Ok(count)
}
