use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::models::{BookingId, FeedbackId, FeedbackRecord, NewFeedback, VendorId};
use crate::services::rating::RatingAggregator;
use crate::storage::{FeedbackLedger, FeedbackStore, Transactional};

/// A committed-to-be feedback mutation, delivered to listeners inside the
/// same unit of work as the mutation itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackEvent {
    Created {
        feedback_id: FeedbackId,
        booking_id: BookingId,
        vendor_id: VendorId,
    },
    Deleted {
        feedback_id: FeedbackId,
        vendor_id: VendorId,
    },
}

impl FeedbackEvent {
    pub fn vendor_id(&self) -> VendorId {
        match self {
            FeedbackEvent::Created { vendor_id, .. } | FeedbackEvent::Deleted { vendor_id, .. } => *vendor_id,
        }
    }
}

/// Reacts to feedback mutations. A listener error aborts the whole mutation.
#[async_trait]
pub trait FeedbackListener: Send + Sync {
    async fn on_feedback(&self, ledger: &dyn FeedbackLedger, event: &FeedbackEvent) -> Result<()>;
}

pub struct FeedbackService<S, C> {
    store: Arc<S>,
    clock: C,
    listeners: Vec<Arc<dyn FeedbackListener>>,
}

impl<S, C> FeedbackService<S, C>
where
    S: Transactional + FeedbackStore,
    C: Clock,
{
    /// Creates the service with rating recomputation registered.
    pub fn new(store: Arc<S>, clock: C) -> Self {
        Self {
            store,
            clock,
            listeners: vec![Arc::new(RatingAggregator)],
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn FeedbackListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub async fn create_feedback(&self, feedback: NewFeedback) -> Result<FeedbackRecord> {
        if !(1..=5).contains(&feedback.rating) {
            return Err(Error::InvalidRating(feedback.rating));
        }

        let ledger = self.store.begin().await?;

        let booking = ledger
            .booking(feedback.booking_id)
            .await?
            .ok_or_else(|| Error::booking_not_found(feedback.booking_id))?;
        ledger
            .get_vendor(feedback.vendor_id)
            .await?
            .ok_or_else(|| Error::vendor_not_found(feedback.vendor_id))?;

        if booking.client_id != feedback.client_id {
            return Err(Error::BookingMismatch(format!(
                "client {} does not match the client on booking {}",
                feedback.client_id, booking.id
            )));
        }
        if ledger.feedback_for_booking(booking.id).await?.is_some() {
            return Err(Error::DuplicateFeedback(booking.id));
        }
        if booking.vendor_id != feedback.vendor_id {
            return Err(Error::BookingMismatch(format!(
                "booking {} does not belong to vendor {}",
                booking.id, feedback.vendor_id
            )));
        }

        let record = ledger.insert_feedback(feedback, self.clock.now()).await?;
        info!(
            feedback_id = record.id,
            booking_id = record.booking_id,
            vendor_id = %record.vendor_id,
            "Feedback created"
        );

        let event = FeedbackEvent::Created {
            feedback_id: record.id,
            booking_id: record.booking_id,
            vendor_id: record.vendor_id,
        };
        self.dispatch(&*ledger, &event).await?;
        ledger.commit()?;

        Ok(record)
    }

    pub async fn delete_feedback(&self, id: FeedbackId) -> Result<FeedbackRecord> {
        let ledger = self.store.begin().await?;
        let record = ledger.delete_feedback(id).await?;
        info!(feedback_id = id, vendor_id = %record.vendor_id, "Feedback deleted");

        let event = FeedbackEvent::Deleted {
            feedback_id: id,
            vendor_id: record.vendor_id,
        };
        self.dispatch(&*ledger, &event).await?;
        ledger.commit()?;

        Ok(record)
    }

    pub async fn feedback(&self, id: FeedbackId) -> Result<FeedbackRecord> {
        self.store
            .find_feedback(id)
            .await?
            .ok_or_else(|| Error::feedback_not_found(id))
    }

    pub async fn feedback_for_vendor(&self, vendor_id: VendorId) -> Result<Vec<FeedbackRecord>> {
        self.store.feedback_for_vendor(vendor_id).await
    }

    pub async fn feedback_for_client(&self, client_id: u64) -> Result<Vec<FeedbackRecord>> {
        self.store.feedback_for_client(client_id).await
    }

    async fn dispatch(&self, ledger: &dyn FeedbackLedger, event: &FeedbackEvent) -> Result<()> {
        for listener in &self.listeners {
            if let Err(e) = listener.on_feedback(ledger, event).await {
                warn!(error = %e, event = ?event, "Feedback listener failed, rolling back");
                return Err(e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{BookingRef, VendorListing};
    use crate::storage::{MemoryStore, VendorStore};
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingListener {
        events: Mutex<Vec<FeedbackEvent>>,
    }

    impl RecordingListener {
        fn events(&self) -> Vec<FeedbackEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FeedbackListener for RecordingListener {
        async fn on_feedback(&self, _ledger: &dyn FeedbackLedger, event: &FeedbackEvent) -> Result<()> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    struct FailingListener;

    #[async_trait]
    impl FeedbackListener for FailingListener {
        async fn on_feedback(&self, _ledger: &dyn FeedbackLedger, _event: &FeedbackEvent) -> Result<()> {
            Err(Error::Storage("listener down".to_string()))
        }
    }

    async fn setup() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.save_vendor(VendorListing::new(VendorId(1), "Alpha")).await.unwrap();
        store.save_vendor(VendorListing::new(VendorId(2), "Beta")).await.unwrap();
        for (id, vendor) in [(10, 1), (11, 1), (12, 2)] {
            store
                .insert_booking(BookingRef {
                    id,
                    vendor_id: VendorId(vendor),
                    client_id: 500,
                    active: false,
                })
                .await;
        }
        store
    }

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2025, 4, 2, 8, 30, 0).unwrap())
    }

    fn new_feedback(booking_id: BookingId, vendor: u64, rating: i32) -> NewFeedback {
        NewFeedback {
            booking_id,
            vendor_id: VendorId(vendor),
            client_id: 500,
            rating,
            comment: Some("Great foam".to_string()),
            image_urls: vec!["https://img.example/a.jpg".to_string()],
        }
    }

    #[tokio::test]
    async fn test_each_mutation_notifies_listeners_once() {
        let store = setup().await;
        let recorder = Arc::new(RecordingListener::default());
        let service = FeedbackService::new(store.clone(), clock()).with_listener(recorder.clone());

        let record = service.create_feedback(new_feedback(10, 1, 4)).await.unwrap();
        assert_eq!(record.created_at, clock().0);
        assert_eq!(recorder.events().len(), 1);

        service.feedback(record.id).await.unwrap();
        service.feedback_for_vendor(VendorId(1)).await.unwrap();
        service.feedback_for_client(500).await.unwrap();
        assert_eq!(recorder.events().len(), 1);

        service.delete_feedback(record.id).await.unwrap();
        assert_eq!(
            recorder.events(),
            vec![
                FeedbackEvent::Created {
                    feedback_id: record.id,
                    booking_id: 10,
                    vendor_id: VendorId(1)
                },
                FeedbackEvent::Deleted {
                    feedback_id: record.id,
                    vendor_id: VendorId(1)
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_rating_follows_create_and_delete() {
        let store = setup().await;
        let service = FeedbackService::new(store.clone(), clock());

        let vendor = store.get_vendor(VendorId(1)).await.unwrap().unwrap();
        assert_eq!(vendor.rating.average, Some(5.0));

        let record = service.create_feedback(new_feedback(10, 1, 4)).await.unwrap();
        let vendor = store.get_vendor(VendorId(1)).await.unwrap().unwrap();
        assert_eq!((vendor.rating.average, vendor.rating.count), (Some(4.0), 1));

        service.create_feedback(new_feedback(11, 1, 1)).await.unwrap();
        let vendor = store.get_vendor(VendorId(1)).await.unwrap().unwrap();
        assert_eq!((vendor.rating.average, vendor.rating.count), (Some(2.5), 2));

        service.delete_feedback(record.id).await.unwrap();
        service.delete_feedback(record.id + 1).await.unwrap();
        let vendor = store.get_vendor(VendorId(1)).await.unwrap().unwrap();
        assert_eq!((vendor.rating.average, vendor.rating.count), (Some(0.0), 0));
    }

    #[tokio::test]
    async fn test_rejected_feedback() {
        let store = setup().await;
        let service = FeedbackService::new(store.clone(), clock());

        for rating in [0, 6, -1] {
            let err = service.create_feedback(new_feedback(10, 1, rating)).await.unwrap_err();
            assert!(matches!(err, Error::InvalidRating(r) if r == rating));
        }

        let err = service.create_feedback(new_feedback(99, 1, 3)).await.unwrap_err();
        assert!(err.is_not_found());

        let err = service.create_feedback(new_feedback(12, 1, 3)).await.unwrap_err();
        assert!(matches!(err, Error::BookingMismatch(_)));

        let mut wrong_client = new_feedback(10, 1, 3);
        wrong_client.client_id = 501;
        let err = service.create_feedback(wrong_client).await.unwrap_err();
        assert!(matches!(err, Error::BookingMismatch(_)));

        service.create_feedback(new_feedback(10, 1, 3)).await.unwrap();
        let err = service.create_feedback(new_feedback(10, 1, 5)).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateFeedback(10)));

        assert_eq!(store.count_feedback(VendorId(1)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_listener_failure_rolls_back_mutation() {
        let store = setup().await;
        let service = FeedbackService::new(store.clone(), clock()).with_listener(Arc::new(FailingListener));

        let err = service.create_feedback(new_feedback(10, 1, 2)).await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));

        assert_eq!(store.count_feedback(VendorId(1)).await.unwrap(), 0);
        let vendor = store.get_vendor(VendorId(1)).await.unwrap().unwrap();
        assert_eq!(vendor.rating.average, Some(5.0));
    }

    #[tokio::test]
    async fn test_feedback_for_client_is_read_only() {
        let store = setup().await;
        store
            .insert_booking(BookingRef {
                id: 13,
                vendor_id: VendorId(2),
                client_id: 501,
                active: false,
            })
            .await;
        let service = FeedbackService::new(store.clone(), clock());

        let first = service.create_feedback(new_feedback(10, 1, 4)).await.unwrap();
        let second = service.create_feedback(new_feedback(12, 2, 2)).await.unwrap();
        let mut other = new_feedback(13, 2, 5);
        other.client_id = 501;
        service.create_feedback(other).await.unwrap();

        let before = store.get_vendor(VendorId(2)).await.unwrap().unwrap().rating;
        let ids: Vec<FeedbackId> = service
            .feedback_for_client(500)
            .await
            .unwrap()
            .iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert!(service.feedback_for_client(999).await.unwrap().is_empty());
        assert_eq!(store.get_vendor(VendorId(2)).await.unwrap().unwrap().rating, before);
    }

    #[tokio::test]
    async fn test_missing_feedback() {
        let store = setup().await;
        let service = FeedbackService::new(store, clock());

        assert!(service.feedback(3).await.unwrap_err().is_not_found());
        assert!(service.delete_feedback(3).await.unwrap_err().is_not_found());
    }
}
