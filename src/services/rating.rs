use async_trait::async_trait;
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{RatingAggregate, VendorId};
use crate::services::feedback::{FeedbackEvent, FeedbackListener};
use crate::storage::{FeedbackLedger, FeedbackStore, VendorStore};

/// Keeps a vendor's rating aggregate equal to the mean of its feedback set.
#[derive(Debug, Clone, Copy, Default)]
pub struct RatingAggregator;

impl RatingAggregator {
    /// Reads the current feedback set and overwrites the vendor's aggregate.
    /// Running it twice with no feedback change in between is harmless.
    pub async fn recompute<S>(store: &S, vendor_id: VendorId) -> Result<RatingAggregate>
    where
        S: VendorStore + FeedbackStore + ?Sized,
    {
        let mut vendor = store
            .get_vendor(vendor_id)
            .await?
            .ok_or_else(|| Error::vendor_not_found(vendor_id))?;

        let average = store.average_rating(vendor_id).await?;
        let count = store.count_feedback(vendor_id).await?;
        let aggregate = RatingAggregate::from_feedback(average, count);

        vendor.rating = aggregate;
        store.save_vendor(vendor).await?;

        info!(
            vendor_id = %vendor_id,
            average = ?aggregate.average,
            count = aggregate.count,
            "Updated vendor rating"
        );
        Ok(aggregate)
    }
}

#[async_trait]
impl FeedbackListener for RatingAggregator {
    async fn on_feedback(&self, ledger: &dyn FeedbackLedger, event: &FeedbackEvent) -> Result<()> {
        Self::recompute(ledger, event.vendor_id()).await.map(|_| ())
    }
}
