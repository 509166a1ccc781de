//! Domain error type and the kind taxonomy transports map from.

use crate::model::PlatformId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// Every fallible operation in the crate returns this.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], for callers that translate domain
/// failures into their own status vocabulary (HTTP codes, exit codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced entity does not exist.
    NotFound,
    /// The request conflicts with current state or a business rule.
    InvalidOperation,
    /// Unexpected persistence or infrastructure failure.
    Internal,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("warehouse {0} not found")]
    WarehouseNotFound(String),

    #[error("picket {0} not found")]
    PicketNotFound(String),

    #[error("platform {0} not found")]
    PlatformNotFound(String),

    #[error("cargo type {0} not found")]
    CargoTypeNotFound(String),

    #[error("platform {platform_id} has no cargo recorded at or before {as_of}")]
    NoCargoRecorded {
        platform_id: PlatformId,
        as_of: DateTime<Utc>,
    },

    #[error("name '{0}' is already in use")]
    DuplicateName(String),

    #[error("pickets [{0}] do not form a contiguous run")]
    NotContiguous(String),

    #[error("cannot split platform '{platform}': pickets [{remaining}] left behind would not be contiguous")]
    PlatformSplit { platform: String, remaining: String },

    #[error("mixed cargo types: {0}")]
    MixedCargoTypes(String),

    #[error("insufficient stock: remainder would drop to {0}")]
    InsufficientStock(Decimal),

    #[error("{0} is already closed")]
    AlreadyClosed(String),

    #[error("timestamp {at} is outside the active window of {entity}")]
    OutsideWindow {
        entity: String,
        at: DateTime<Utc>,
    },

    #[error("{0}")]
    InvalidOperation(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Map this error onto the three-way taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::WarehouseNotFound(_)
            | Error::PicketNotFound(_)
            | Error::PlatformNotFound(_)
            | Error::CargoTypeNotFound(_)
            | Error::NoCargoRecorded { .. } => ErrorKind::NotFound,

            Error::DuplicateName(_)
            | Error::NotContiguous(_)
            | Error::PlatformSplit { .. }
            | Error::MixedCargoTypes(_)
            | Error::InsufficientStock(_)
            | Error::AlreadyClosed(_)
            | Error::OutsideWindow { .. }
            | Error::InvalidOperation(_) => ErrorKind::InvalidOperation,

            Error::Database(_) | Error::Io(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_cover_the_taxonomy() {
        assert_eq!(
            Error::PlatformNotFound("7".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            Error::DuplicateName("A".into()).kind(),
            ErrorKind::InvalidOperation
        );
        assert_eq!(
            Error::Database(rusqlite::Error::InvalidQuery).kind(),
            ErrorKind::Internal
        );
    }
}
