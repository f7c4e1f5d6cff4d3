// Domain error taxonomy for the locker service
// Every variant maps to exactly one HTTP status at the request boundary.

use thiserror::Error;

use crate::lockers::SizeClass;

/// Result alias used by all store and lifecycle operations
pub type LockerResult<T> = std::result::Result<T, LockerError>;

#[derive(Error, Debug)]
pub enum LockerError {
    /// Missing or malformed request field (-> 400)
    #[error("{0}")]
    Validation(String),

    /// No locker row with this id (-> 404)
    #[error("Locker not found.")]
    LockerNotFound(i64),

    /// Checkout requested for a locker that is not occupied (-> 409)
    #[error("Locker {0} is already free.")]
    LockerAlreadyFree(String),

    /// Check-in requested for a size class with no free lockers (-> 409)
    #[error("No {0} lockers are available.")]
    NoLockerAvailable(SizeClass),

    /// Claim raced for a locker that is no longer free (-> 409)
    #[error("Locker {0} is already occupied.")]
    LockerOccupied(String),

    /// Backing store failure, including a failed transactional unit (-> 500)
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}
