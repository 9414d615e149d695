use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::VendorId;

pub type FeedbackId = u64;
pub type BookingId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub id: FeedbackId,
    pub booking_id: BookingId,
    pub vendor_id: VendorId,
    pub client_id: u64,
    pub rating: i32,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Feedback submitted by a client, before it is assigned an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeedback {
    pub booking_id: BookingId,
    pub vendor_id: VendorId,
    pub client_id: u64,
    pub rating: i32,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

impl NewFeedback {
    pub fn into_record(self, id: FeedbackId, created_at: DateTime<Utc>) -> FeedbackRecord {
        FeedbackRecord {
            id,
            booking_id: self.booking_id,
            vendor_id: self.vendor_id,
            client_id: self.client_id,
            rating: self.rating,
            comment: self.comment,
            image_urls: self.image_urls,
            created_at,
        }
    }
}

/// What the engine needs to know about a booking owned by the booking service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRef {
    pub id: BookingId,
    pub vendor_id: VendorId,
    pub client_id: u64,
    /// Whether the booking currently occupies one unit of vendor capacity.
    #[serde(default)]
    pub active: bool,
}
