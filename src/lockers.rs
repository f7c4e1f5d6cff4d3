// 🗄️ Locker Store - the persistent locker table and its state transitions
// Lockers are created once at seed time and never deleted; the only writes
// are the Free -> Occupied and Occupied -> Free flips performed here.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LockerError, LockerResult};

// ============================================================================
// TYPES
// ============================================================================

/// Luggage size classes, each with a fixed seeded inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
    VIP,
}

impl SizeClass {
    pub const ALL: [SizeClass; 4] = [
        SizeClass::Small,
        SizeClass::Medium,
        SizeClass::Large,
        SizeClass::VIP,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeClass::Small => "Small",
            SizeClass::Medium => "Medium",
            SizeClass::Large => "Large",
            SizeClass::VIP => "VIP",
        }
    }

    /// Prefix used in display numbers (S-101, M-101, ...)
    pub fn initial(&self) -> char {
        match self {
            SizeClass::Small => 'S',
            SizeClass::Medium => 'M',
            SizeClass::Large => 'L',
            SizeClass::VIP => 'V',
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeClass {
    type Err = LockerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Small" => Ok(SizeClass::Small),
            "Medium" => Ok(SizeClass::Medium),
            "Large" => Ok(SizeClass::Large),
            "VIP" => Ok(SizeClass::VIP),
            other => Err(LockerError::Validation(format!(
                "Unknown luggage type: {other}"
            ))),
        }
    }
}

/// Occupancy state of a locker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockerStatus {
    Free,
    Occupied,
}

impl LockerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LockerStatus::Free => "Free",
            LockerStatus::Occupied => "Occupied",
        }
    }
}

impl FromStr for LockerStatus {
    type Err = LockerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Free" => Ok(LockerStatus::Free),
            "Occupied" => Ok(LockerStatus::Occupied),
            other => Err(LockerError::Validation(format!(
                "Unknown locker status: {other}"
            ))),
        }
    }
}

/// One physical locker.
/// Wire names (`type`, `checkInTime`) match the dashboard API.
/// Invariant: check_in_time is Some iff status is Occupied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Locker {
    pub id: i64,
    pub number: String,
    #[serde(rename = "type")]
    pub size: SizeClass,
    pub status: LockerStatus,
    #[serde(rename = "checkInTime")]
    pub check_in_time: Option<DateTime<Utc>>,
}

// ============================================================================
// ROW MAPPING
// ============================================================================

const LOCKER_COLUMNS: &str = "id, number, type, status, check_in_time";

fn map_locker(row: &rusqlite::Row<'_>) -> rusqlite::Result<Locker> {
    let size_str: String = row.get(2)?;
    let status_str: String = row.get(3)?;
    let check_in_str: Option<String> = row.get(4)?;

    let check_in_time = check_in_str
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    Ok(Locker {
        id: row.get(0)?,
        number: row.get(1)?,
        size: size_str.parse().map_err(|_| rusqlite::Error::InvalidQuery)?,
        status: status_str
            .parse()
            .map_err(|_| rusqlite::Error::InvalidQuery)?,
        check_in_time,
    })
}

// ============================================================================
// STORE OPERATIONS
// ============================================================================

/// Get one locker by id
pub fn get(conn: &Connection, id: i64) -> LockerResult<Option<Locker>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {LOCKER_COLUMNS} FROM lockers WHERE id = ?1"
    ))?;

    let mut rows = stmt.query_map(params![id], map_locker)?;
    match rows.next() {
        Some(locker) => Ok(Some(locker?)),
        None => Ok(None),
    }
}

/// All lockers ordered by display number (lexicographic)
pub fn list_all(conn: &Connection) -> LockerResult<Vec<Locker>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {LOCKER_COLUMNS} FROM lockers ORDER BY number"
    ))?;

    let lockers = stmt
        .query_map([], map_locker)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(lockers)
}

/// One free locker of the requested class, if any.
/// Pick among candidates is arbitrary but stable (lowest id first).
pub fn find_free_by_size(conn: &Connection, size: SizeClass) -> LockerResult<Option<Locker>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {LOCKER_COLUMNS} FROM lockers
         WHERE type = ?1 AND status = 'Free'
         ORDER BY id LIMIT 1"
    ))?;

    let mut rows = stmt.query_map(params![size.as_str()], map_locker)?;
    match rows.next() {
        Some(locker) => Ok(Some(locker?)),
        None => Ok(None),
    }
}

/// Flip a Free locker to Occupied and stamp the check-in time.
///
/// The UPDATE re-checks the Free status so a claim that raced with another
/// check-in fails instead of silently double-booking the locker.
pub fn occupy(conn: &Connection, id: i64, now: DateTime<Utc>) -> LockerResult<()> {
    let updated = conn.execute(
        "UPDATE lockers SET status = 'Occupied', check_in_time = ?1
         WHERE id = ?2 AND status = 'Free'",
        params![now.to_rfc3339(), id],
    )?;

    if updated == 1 {
        return Ok(());
    }

    match get(conn, id)? {
        Some(locker) => Err(LockerError::LockerOccupied(locker.number)),
        None => Err(LockerError::LockerNotFound(id)),
    }
}

/// Flip an Occupied locker back to Free and clear the check-in time
pub fn release(conn: &Connection, id: i64) -> LockerResult<()> {
    let locker = get(conn, id)?.ok_or(LockerError::LockerNotFound(id))?;

    if locker.status == LockerStatus::Free {
        return Err(LockerError::LockerAlreadyFree(locker.number));
    }

    conn.execute(
        "UPDATE lockers SET status = 'Free', check_in_time = NULL WHERE id = ?1",
        params![id],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::setup_database(&conn).unwrap();
        db::seed_catalog(&conn).unwrap();
        conn
    }

    #[test]
    fn test_list_all_ordered_by_number() {
        let conn = test_db();
        let lockers = list_all(&conn).unwrap();

        assert_eq!(lockers.len(), 170);

        let numbers: Vec<&str> = lockers.iter().map(|l| l.number.as_str()).collect();
        let mut sorted = numbers.clone();
        sorted.sort();
        assert_eq!(numbers, sorted, "listing must be ordered by number");
    }

    #[test]
    fn test_seeded_lockers_start_free() {
        let conn = test_db();
        for locker in list_all(&conn).unwrap() {
            assert_eq!(locker.status, LockerStatus::Free);
            assert!(locker.check_in_time.is_none());
        }
    }

    #[test]
    fn test_occupy_sets_check_in_time() {
        let conn = test_db();
        let locker = find_free_by_size(&conn, SizeClass::Large).unwrap().unwrap();
        let now = Utc::now();

        occupy(&conn, locker.id, now).unwrap();

        let reloaded = get(&conn, locker.id).unwrap().unwrap();
        assert_eq!(reloaded.status, LockerStatus::Occupied);
        let stored = reloaded.check_in_time.unwrap();
        assert!((stored - now).num_seconds().abs() <= 1);
    }

    #[test]
    fn test_occupy_rejects_occupied_locker() {
        let conn = test_db();
        let locker = find_free_by_size(&conn, SizeClass::Small).unwrap().unwrap();

        occupy(&conn, locker.id, Utc::now()).unwrap();
        let err = occupy(&conn, locker.id, Utc::now()).unwrap_err();

        assert!(matches!(err, LockerError::LockerOccupied(_)));
    }

    #[test]
    fn test_occupy_unknown_id_is_not_found() {
        let conn = test_db();
        let err = occupy(&conn, 99_999, Utc::now()).unwrap_err();
        assert!(matches!(err, LockerError::LockerNotFound(99_999)));
    }

    #[test]
    fn test_release_clears_check_in_time() {
        let conn = test_db();
        let locker = find_free_by_size(&conn, SizeClass::VIP).unwrap().unwrap();

        occupy(&conn, locker.id, Utc::now()).unwrap();
        release(&conn, locker.id).unwrap();

        let reloaded = get(&conn, locker.id).unwrap().unwrap();
        assert_eq!(reloaded.status, LockerStatus::Free);
        assert!(reloaded.check_in_time.is_none());
    }

    #[test]
    fn test_release_free_locker_is_conflict() {
        let conn = test_db();
        let locker = find_free_by_size(&conn, SizeClass::Medium).unwrap().unwrap();

        let err = release(&conn, locker.id).unwrap_err();
        assert!(matches!(err, LockerError::LockerAlreadyFree(_)));
    }

    #[test]
    fn test_find_free_skips_occupied() {
        let conn = test_db();
        let first = find_free_by_size(&conn, SizeClass::VIP).unwrap().unwrap();
        occupy(&conn, first.id, Utc::now()).unwrap();

        let second = find_free_by_size(&conn, SizeClass::VIP).unwrap().unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(second.size, SizeClass::VIP);
    }

    #[test]
    fn test_size_class_round_trip() {
        for size in SizeClass::ALL {
            assert_eq!(size.as_str().parse::<SizeClass>().unwrap(), size);
        }
        assert!("Gigantic".parse::<SizeClass>().is_err());
    }
}
