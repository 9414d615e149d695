//! Store traits the engine is written against, plus the in-memory reference
//! store and its JSON snapshot format.

pub mod json;
pub mod memory;

pub use json::Snapshot;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{BookingId, BookingRef, FeedbackId, FeedbackRecord, NewFeedback, VendorId, VendorListing};

#[async_trait]
pub trait VendorStore: Send + Sync {
    /// Listings of accounts holding the vendor role with a profile present.
    async fn list_eligible_vendors(&self) -> Result<Vec<VendorListing>>;

    async fn get_vendor(&self, id: VendorId) -> Result<Option<VendorListing>>;

    async fn save_vendor(&self, vendor: VendorListing) -> Result<()>;
}

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn find_feedback(&self, id: FeedbackId) -> Result<Option<FeedbackRecord>>;

    async fn feedback_for_vendor(&self, vendor_id: VendorId) -> Result<Vec<FeedbackRecord>>;

    async fn feedback_for_client(&self, client_id: u64) -> Result<Vec<FeedbackRecord>>;

    async fn average_rating(&self, vendor_id: VendorId) -> Result<Option<f64>>;

    async fn count_feedback(&self, vendor_id: VendorId) -> Result<u32>;
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn booking(&self, id: BookingId) -> Result<Option<BookingRef>>;

    /// Bookings currently occupying capacity at the vendor.
    async fn active_bookings(&self, vendor_id: VendorId) -> Result<u32>;
}

/// A unit of work over vendors, feedback and bookings. Changes become visible
/// to other readers only on [`FeedbackLedger::commit`]; dropping the ledger
/// discards them.
#[async_trait]
pub trait FeedbackLedger: VendorStore + FeedbackStore + BookingStore {
    async fn feedback_for_booking(&self, booking_id: BookingId) -> Result<Option<FeedbackRecord>>;

    async fn insert_feedback(&self, feedback: NewFeedback, created_at: DateTime<Utc>) -> Result<FeedbackRecord>;

    async fn delete_feedback(&self, id: FeedbackId) -> Result<FeedbackRecord>;

    fn commit(self: Box<Self>) -> Result<()>;
}

#[async_trait]
pub trait Transactional: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn FeedbackLedger>>;
}
