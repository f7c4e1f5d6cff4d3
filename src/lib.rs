// Airport Luggage Locker Service - Core Library
// Exposes all modules for use in the CLI, API server, and tests

pub mod billing;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod lockers;
pub mod transactions;

// Re-export commonly used types
pub use billing::{quote_fee, FeeQuote};
pub use dashboard::{Dashboard, DashboardStats, RECENT_RECEIPTS};
pub use db::{catalog_size, open, seed_catalog, setup_database, CATALOG, CATALOG_VERSION};
pub use error::{LockerError, LockerResult};
pub use lifecycle::{check_in, check_out, quote, CheckoutReceipt};
pub use lockers::{Locker, LockerStatus, SizeClass};
pub use transactions::{NewTransaction, Transaction};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
