use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::config::DiscoveryConfig;
use crate::error::{Error, Result};
use crate::models::{RatingAggregate, Schedule, ScheduleInput, ScheduleView, VendorId, VendorListing};
use crate::services::geo::GeoPoint;
use crate::services::proximity::{ProximityOutcome, ProximitySearch};
use crate::services::ranking::{SearchQuery, VendorRanker};
use crate::services::rating::RatingAggregator;
use crate::services::schedule::ScheduleEvaluator;
use crate::storage::{BookingStore, Transactional, VendorStore};
use crate::utils::time::{offset_from_minutes, time_of_day};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: Option<f64>,
    pub limit: Option<usize>,
    /// Defaults to the engine clock's current instant.
    pub at: Option<DateTime<Utc>>,
}

impl NearbyRequest {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            radius_km: None,
            limit: None,
            at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorDetails {
    pub listing: VendorListing,
    pub schedule: Option<ScheduleView>,
}

/// Entry point for discovery and availability queries.
pub struct DiscoveryEngine<S, C> {
    store: Arc<S>,
    clock: C,
    config: DiscoveryConfig,
    offset: FixedOffset,
}

impl<S, C> DiscoveryEngine<S, C>
where
    S: VendorStore + BookingStore + Transactional,
    C: Clock,
{
    pub fn new(store: Arc<S>, clock: C, config: DiscoveryConfig) -> Result<Self> {
        let offset = offset_from_minutes(config.utc_offset_minutes)?;
        Ok(Self {
            store,
            clock,
            config,
            offset,
        })
    }

    fn local_time(&self, at: Option<DateTime<Utc>>) -> NaiveTime {
        let instant = at.unwrap_or_else(|| self.clock.now());
        time_of_day(&instant, self.offset)
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<VendorListing>> {
        let vendors = self.store.list_eligible_vendors().await?;
        Ok(VendorRanker::search(vendors, query))
    }

    pub async fn nearby(&self, request: &NearbyRequest) -> Result<ProximityOutcome> {
        let time = self.local_time(request.at);
        let radius_km = request.radius_km.unwrap_or(self.config.default_radius_km);
        let limit = request.limit.unwrap_or(self.config.default_limit);
        let origin = GeoPoint::new(request.latitude, request.longitude);

        debug!(
            latitude = request.latitude,
            longitude = request.longitude,
            radius_km = radius_km,
            limit = limit,
            time = %time,
            "Searching nearby vendors"
        );

        let vendors = self.store.list_eligible_vendors().await?;
        Ok(ProximitySearch::nearby(&vendors, time, origin, radius_km, limit))
    }

    pub fn validate_schedule(&self, input: &ScheduleInput) -> Result<Schedule> {
        Ok(ScheduleEvaluator::validate(input)?)
    }

    /// Replaces a vendor's schedule after validating it.
    pub async fn update_schedule(&self, vendor_id: VendorId, input: &ScheduleInput) -> Result<VendorListing> {
        let schedule = self.validate_schedule(input)?;

        let ledger = self.store.begin().await?;
        let mut vendor = ledger
            .get_vendor(vendor_id)
            .await?
            .ok_or_else(|| Error::vendor_not_found(vendor_id))?;
        vendor.schedule = Some(schedule);
        ledger.save_vendor(vendor.clone()).await?;
        ledger.commit()?;

        info!(
            vendor_id = %vendor_id,
            available_from = %schedule.available_from,
            available_to = %schedule.available_to,
            capacity = schedule.capacity,
            "Updated schedule"
        );
        Ok(vendor)
    }

    pub async fn recompute_rating(&self, vendor_id: VendorId) -> Result<RatingAggregate> {
        let ledger = self.store.begin().await?;
        let aggregate = RatingAggregator::recompute(&*ledger, vendor_id).await?;
        ledger.commit()?;
        Ok(aggregate)
    }

    pub async fn vendor(&self, vendor_id: VendorId) -> Result<VendorDetails> {
        let listing = self
            .store
            .get_vendor(vendor_id)
            .await?
            .ok_or_else(|| Error::vendor_not_found(vendor_id))?;
        let now = self.local_time(None);
        let schedule = listing.schedule.as_ref().map(|s| ScheduleEvaluator::view(s, now));

        Ok(VendorDetails { listing, schedule })
    }

    pub async fn open_vendors(&self, at: Option<DateTime<Utc>>) -> Result<Vec<VendorListing>> {
        let time = self.local_time(at);
        let mut vendors = self.store.list_eligible_vendors().await?;
        vendors.retain(|v| {
            v.schedule
                .as_ref()
                .is_some_and(|s| ScheduleEvaluator::is_open_at(s, time))
        });
        Ok(vendors)
    }

    /// Whether `units` more bookings fit under the vendor's capacity right now.
    pub async fn check_capacity(&self, vendor_id: VendorId, units: u32) -> Result<bool> {
        let vendor = self
            .store
            .get_vendor(vendor_id)
            .await?
            .ok_or_else(|| Error::vendor_not_found(vendor_id))?;
        let Some(schedule) = vendor.schedule else {
            return Ok(false);
        };

        let occupied = self.store.active_bookings(vendor_id).await?;
        Ok(ScheduleEvaluator::has_capacity_with(&schedule, occupied, units))
    }
}
