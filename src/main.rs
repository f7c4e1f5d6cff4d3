use anyhow::Result;
use std::env;
use std::path::PathBuf;

use luggage_locker::{dashboard, db};

/// Database location: LUGGAGE_DB env var, or ./luggage.db next to the process
fn db_path() -> PathBuf {
    env::var("LUGGAGE_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("luggage.db"))
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() > 1 && args[1] == "init" {
        run_init()?;
    } else {
        run_report()?;
    }

    Ok(())
}

fn run_init() -> Result<()> {
    println!("🗄️  Luggage Locker - Database Init");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let path = db_path();
    let conn = db::open(&path)?;
    println!("✓ Database ready: {:?} (WAL mode)", path);

    let lockers = luggage_locker::lockers::list_all(&conn)?;
    println!("✓ Catalog seeded: {} lockers (version {})", lockers.len(), db::CATALOG_VERSION);
    for (size, count) in db::CATALOG {
        println!("  - {}: {}", size, count);
    }

    Ok(())
}

fn run_report() -> Result<()> {
    let path = db_path();

    if !path.exists() {
        eprintln!("❌ Database not found at {:?}", path);
        eprintln!("   Run: luggage-locker init");
        std::process::exit(1);
    }

    let conn = db::open(&path)?;
    let dashboard = dashboard::load(&conn)?;

    println!("📊 Luggage Locker - Occupancy Report");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Total lockers:    {}", dashboard.stats.total);
    println!("Occupied:         {}", dashboard.stats.occupied);
    println!("Free:             {}", dashboard.stats.free);

    println!("\nRecent transactions ({}):", dashboard.receipts.len());
    for receipt in dashboard.receipts.iter().take(10) {
        println!(
            "  {}  {:>4} min  ₹{:<4}  checked out {}",
            receipt.locker_number,
            receipt.duration_minutes,
            receipt.fee_charged,
            receipt.check_out_time.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}
