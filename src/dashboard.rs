// Dashboard Aggregator - occupancy counts plus recent receipts in one read
// Always recomputed from the live locker table; with a seeded catalog of 170
// lockers there is nothing worth caching.

use rusqlite::Connection;
use serde::Serialize;

use crate::error::LockerResult;
use crate::lockers::{self, Locker, LockerStatus};
use crate::transactions::{self, Transaction};

/// Number of receipts shown on the dashboard
pub const RECENT_RECEIPTS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    pub occupied: usize,
    pub free: usize,
}

impl DashboardStats {
    pub fn from_lockers(lockers: &[Locker]) -> Self {
        let occupied = lockers
            .iter()
            .filter(|l| l.status == LockerStatus::Occupied)
            .count();

        DashboardStats {
            total: lockers.len(),
            occupied,
            free: lockers.len() - occupied,
        }
    }
}

/// The composed dashboard read: stats, full locker list, recent receipts
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub lockers: Vec<Locker>,
    pub receipts: Vec<Transaction>,
}

pub fn load(conn: &Connection) -> LockerResult<Dashboard> {
    let lockers = lockers::list_all(conn)?;
    let stats = DashboardStats::from_lockers(&lockers);
    let receipts = transactions::recent(conn, RECENT_RECEIPTS)?;

    Ok(Dashboard {
        stats,
        lockers,
        receipts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::lifecycle;
    use crate::lockers::SizeClass;
    use chrono::Utc;

    #[test]
    fn test_stats_track_occupancy() {
        let mut conn = Connection::open_in_memory().unwrap();
        db::setup_database(&conn).unwrap();
        db::seed_catalog(&conn).unwrap();

        let empty = load(&conn).unwrap();
        assert_eq!(
            empty.stats,
            DashboardStats {
                total: 170,
                occupied: 0,
                free: 170
            }
        );
        assert!(empty.receipts.is_empty());

        let a = lifecycle::check_in(&mut conn, SizeClass::Small, Utc::now()).unwrap();
        lifecycle::check_in(&mut conn, SizeClass::Medium, Utc::now()).unwrap();

        let busy = load(&conn).unwrap();
        assert_eq!(busy.stats.occupied, 2);
        assert_eq!(busy.stats.free, 168);
        assert_eq!(busy.stats.total, 170);

        lifecycle::check_out(&mut conn, a.id, Utc::now()).unwrap();

        let after = load(&conn).unwrap();
        assert_eq!(after.stats.occupied, 1);
        assert_eq!(after.receipts.len(), 1);
        assert_eq!(after.receipts[0].locker_number, a.number);
    }

    #[test]
    fn test_receipts_capped_at_fifty() {
        let mut conn = Connection::open_in_memory().unwrap();
        db::setup_database(&conn).unwrap();
        db::seed_catalog(&conn).unwrap();

        // 55 completed stays on the same small locker
        for _ in 0..55 {
            let locker = lifecycle::check_in(&mut conn, SizeClass::Small, Utc::now()).unwrap();
            lifecycle::check_out(&mut conn, locker.id, Utc::now()).unwrap();
        }

        let dashboard = load(&conn).unwrap();
        assert_eq!(dashboard.receipts.len(), 50);
        assert!(dashboard.receipts[0].id > dashboard.receipts[49].id);
    }
}
