use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};
use tracing::debug;

use super::{BookingStore, FeedbackLedger, FeedbackStore, Snapshot, Transactional, VendorStore};
use crate::error::{Error, Result};
use crate::models::{
    Account, BookingId, BookingRef, FeedbackId, FeedbackRecord, NewFeedback, VendorId, VendorListing,
};
use crate::services::ranking::eligible_listings;

#[derive(Debug, Clone, Default)]
struct StoreState {
    accounts: BTreeMap<VendorId, Account>,
    feedback: BTreeMap<FeedbackId, FeedbackRecord>,
    bookings: BTreeMap<BookingId, BookingRef>,
    next_feedback_id: FeedbackId,
}

impl StoreState {
    fn from_snapshot(snapshot: Snapshot) -> Self {
        let accounts = snapshot.accounts.into_iter().map(|a| (a.id, a)).collect();
        let feedback: BTreeMap<_, _> = snapshot.feedback.into_iter().map(|f| (f.id, f)).collect();
        let bookings = snapshot.bookings.into_iter().map(|b| (b.id, b)).collect();
        let next_feedback_id = feedback.keys().next_back().map_or(1, |id| id + 1);

        Self {
            accounts,
            feedback,
            bookings,
            next_feedback_id,
        }
    }

    fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            accounts: self.accounts.values().cloned().collect(),
            feedback: self.feedback.values().cloned().collect(),
            bookings: self.bookings.values().cloned().collect(),
        }
    }

    fn eligible_vendors(&self) -> Vec<VendorListing> {
        eligible_listings(self.accounts.values())
    }

    fn vendor(&self, id: VendorId) -> Option<VendorListing> {
        self.accounts.get(&id).and_then(Account::eligible_listing).cloned()
    }

    fn save_vendor(&mut self, vendor: VendorListing) {
        match self.accounts.get_mut(&vendor.id) {
            Some(account) => account.vendor = Some(vendor),
            None => {
                self.accounts.insert(vendor.id, Account::vendor(vendor));
            }
        }
    }

    fn ratings(&self, vendor_id: VendorId) -> impl Iterator<Item = i32> + '_ {
        self.feedback
            .values()
            .filter(move |f| f.vendor_id == vendor_id)
            .map(|f| f.rating)
    }

    fn feedback_for_vendor(&self, vendor_id: VendorId) -> Vec<FeedbackRecord> {
        self.feedback
            .values()
            .filter(|f| f.vendor_id == vendor_id)
            .cloned()
            .collect()
    }

    fn feedback_for_client(&self, client_id: u64) -> Vec<FeedbackRecord> {
        self.feedback
            .values()
            .filter(|f| f.client_id == client_id)
            .cloned()
            .collect()
    }

    fn average_rating(&self, vendor_id: VendorId) -> Option<f64> {
        let (sum, count) = self
            .ratings(vendor_id)
            .fold((0i64, 0u64), |(sum, count), r| (sum + i64::from(r), count + 1));
        (count > 0).then(|| sum as f64 / count as f64)
    }

    fn count_feedback(&self, vendor_id: VendorId) -> Result<u32> {
        u32::try_from(self.ratings(vendor_id).count())
            .map_err(|_| Error::Storage(format!("feedback count overflow for vendor {}", vendor_id)))
    }

    fn active_bookings(&self, vendor_id: VendorId) -> Result<u32> {
        let count = self
            .bookings
            .values()
            .filter(|b| b.vendor_id == vendor_id && b.active)
            .count();
        u32::try_from(count).map_err(|_| Error::Storage(format!("booking count overflow for vendor {}", vendor_id)))
    }

    fn feedback_for_booking(&self, booking_id: BookingId) -> Option<FeedbackRecord> {
        self.feedback.values().find(|f| f.booking_id == booking_id).cloned()
    }

    fn insert_feedback(&mut self, feedback: NewFeedback, created_at: DateTime<Utc>) -> FeedbackRecord {
        let id = self.next_feedback_id;
        self.next_feedback_id += 1;
        let record = feedback.into_record(id, created_at);
        self.feedback.insert(id, record.clone());
        record
    }

    fn delete_feedback(&mut self, id: FeedbackId) -> Result<FeedbackRecord> {
        self.feedback.remove(&id).ok_or_else(|| Error::feedback_not_found(id))
    }
}

/// In-memory store. Reads see the last committed state; feedback mutations go
/// through [`Transactional::begin`] and hold the write lock until commit.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState::from_snapshot(snapshot))),
        }
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.state.read().await.to_snapshot()
    }

    pub async fn insert_account(&self, account: Account) {
        self.state.write().await.accounts.insert(account.id, account);
    }

    pub async fn insert_booking(&self, booking: BookingRef) {
        self.state.write().await.bookings.insert(booking.id, booking);
    }

    async fn inspect<T>(&self, f: impl FnOnce(&StoreState) -> T + Send) -> Result<T> {
        Ok(f(&*self.state.read().await))
    }

    async fn modify<T>(&self, f: impl FnOnce(&mut StoreState) -> T + Send) -> Result<T> {
        Ok(f(&mut *self.state.write().await))
    }
}

#[async_trait]
impl Transactional for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn FeedbackLedger>> {
        let guard = self.state.clone().write_owned().await;
        let working = Mutex::new((*guard).clone());
        Ok(Box::new(MemoryLedger { guard, working }))
    }
}

/// Exclusive unit of work over a [`MemoryStore`]. Mutations apply to a working
/// copy that replaces the shared state on commit.
pub struct MemoryLedger {
    guard: OwnedRwLockWriteGuard<StoreState>,
    working: Mutex<StoreState>,
}

impl MemoryLedger {
    async fn inspect<T>(&self, f: impl FnOnce(&StoreState) -> T + Send) -> Result<T> {
        let state = self
            .working
            .lock()
            .map_err(|_| Error::Storage("ledger state poisoned".to_string()))?;
        Ok(f(&state))
    }

    async fn modify<T>(&self, f: impl FnOnce(&mut StoreState) -> T + Send) -> Result<T> {
        let mut state = self
            .working
            .lock()
            .map_err(|_| Error::Storage("ledger state poisoned".to_string()))?;
        Ok(f(&mut state))
    }
}

macro_rules! impl_read_stores {
    ($store:ty) => {
        #[async_trait]
        impl VendorStore for $store {
            async fn list_eligible_vendors(&self) -> Result<Vec<VendorListing>> {
                self.inspect(|state| state.eligible_vendors()).await
            }

            async fn get_vendor(&self, id: VendorId) -> Result<Option<VendorListing>> {
                self.inspect(|state| state.vendor(id)).await
            }

            async fn save_vendor(&self, vendor: VendorListing) -> Result<()> {
                self.modify(|state| state.save_vendor(vendor)).await
            }
        }

        #[async_trait]
        impl FeedbackStore for $store {
            async fn find_feedback(&self, id: FeedbackId) -> Result<Option<FeedbackRecord>> {
                self.inspect(|state| state.feedback.get(&id).cloned()).await
            }

            async fn feedback_for_vendor(&self, vendor_id: VendorId) -> Result<Vec<FeedbackRecord>> {
                self.inspect(|state| state.feedback_for_vendor(vendor_id)).await
            }

            async fn feedback_for_client(&self, client_id: u64) -> Result<Vec<FeedbackRecord>> {
                self.inspect(|state| state.feedback_for_client(client_id)).await
            }

            async fn average_rating(&self, vendor_id: VendorId) -> Result<Option<f64>> {
                self.inspect(|state| state.average_rating(vendor_id)).await
            }

            async fn count_feedback(&self, vendor_id: VendorId) -> Result<u32> {
                self.inspect(|state| state.count_feedback(vendor_id)).await?
            }
        }

        #[async_trait]
        impl BookingStore for $store {
            async fn booking(&self, id: BookingId) -> Result<Option<BookingRef>> {
                self.inspect(|state| state.bookings.get(&id).cloned()).await
            }

            async fn active_bookings(&self, vendor_id: VendorId) -> Result<u32> {
                self.inspect(|state| state.active_bookings(vendor_id)).await?
            }
        }
    };
}

impl_read_stores!(MemoryStore);
impl_read_stores!(MemoryLedger);

#[async_trait]
impl FeedbackLedger for MemoryLedger {
    async fn feedback_for_booking(&self, booking_id: BookingId) -> Result<Option<FeedbackRecord>> {
        self.inspect(|state| state.feedback_for_booking(booking_id)).await
    }

    async fn insert_feedback(&self, feedback: NewFeedback, created_at: DateTime<Utc>) -> Result<FeedbackRecord> {
        self.modify(|state| state.insert_feedback(feedback, created_at)).await
    }

    async fn delete_feedback(&self, id: FeedbackId) -> Result<FeedbackRecord> {
        self.modify(|state| state.delete_feedback(id)).await?
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let MemoryLedger { mut guard, working } = *self;
        let state = working
            .into_inner()
            .map_err(|_| Error::Storage("ledger state poisoned".to_string()))?;

        debug!(
            accounts = state.accounts.len(),
            feedback = state.feedback.len(),
            "Committing ledger"
        );
        *guard = state;
        Ok(())
    }
}
