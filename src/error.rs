use chrono::NaiveTime;
use thiserror::Error;

use crate::models::{BookingId, FeedbackId, VendorId};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: u64 },

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(i32),

    #[error("Feedback has already been submitted for booking {0}")]
    DuplicateFeedback(BookingId),

    #[error("Unknown sort direction: {0}")]
    InvalidSortDirection(String),

    #[error("Booking mismatch: {0}")]
    BookingMismatch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    pub fn vendor_not_found(id: VendorId) -> Self {
        Error::NotFound { entity: "Vendor", id: id.0 }
    }

    pub fn feedback_not_found(id: FeedbackId) -> Self {
        Error::NotFound { entity: "Feedback", id }
    }

    pub fn booking_not_found(id: BookingId) -> Self {
        Error::NotFound { entity: "Booking", id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

/// Rejections raised while validating schedule input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("availableFrom and availableTo must both be present")]
    MissingTimes,

    #[error("availableFrom ({from}) must be strictly before availableTo ({to})")]
    WindowNotIncreasing { from: NaiveTime, to: NaiveTime },

    #[error("capacity must be present")]
    MissingCapacity,

    #[error("capacity must be >= 1, got {0}")]
    NonPositiveCapacity(i64),

    #[error("capacity {0} is too large")]
    CapacityOverflow(i64),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinateParseError {
    #[error("{axis} is missing")]
    Missing { axis: &'static str },

    #[error("invalid {axis} value: {value:?}")]
    Invalid { axis: &'static str, value: String },
}
