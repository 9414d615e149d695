//! Discovery and availability engine for a car-wash marketplace: vendor
//! ranking, proximity search over open vendors, schedule evaluation and
//! rating aggregates kept in step with feedback.

pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
