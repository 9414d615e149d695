use chrono::NaiveTime;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::CoordinateParseError;
use crate::models::{VendorId, VendorListing};
use crate::services::geo::GeoPoint;
use crate::services::schedule::ScheduleEvaluator;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyVendor {
    pub vendor_id: VendorId,
    #[serde(rename = "carwashName")]
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
}

/// A vendor left out of proximity results because its coordinates are unusable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinateIssue {
    pub vendor_id: VendorId,
    #[serde(serialize_with = "serialize_display")]
    pub error: CoordinateParseError,
}

fn serialize_display<S: serde::Serializer>(error: &CoordinateParseError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProximityOutcome {
    pub results: Vec<NearbyVendor>,
    pub skipped: Vec<CoordinateIssue>,
}

pub struct ProximitySearch;

impl ProximitySearch {
    /// Open vendors strictly within `radius_km` of `origin`, nearest first,
    /// at most `limit` of them.
    pub fn nearby<'a>(
        vendors: impl IntoIterator<Item = &'a VendorListing>,
        time: NaiveTime,
        origin: GeoPoint,
        radius_km: f64,
        limit: usize,
    ) -> ProximityOutcome {
        let mut outcome = ProximityOutcome::default();

        let open = vendors.into_iter().filter(|v| {
            v.schedule
                .as_ref()
                .is_some_and(|schedule| ScheduleEvaluator::is_open_at(schedule, time))
        });

        for vendor in open {
            let point = match GeoPoint::from_listing(vendor) {
                Ok(point) => point,
                Err(error) => {
                    warn!(vendor_id = %vendor.id, error = %error, "Skipping vendor with unusable coordinates");
                    outcome.skipped.push(CoordinateIssue {
                        vendor_id: vendor.id,
                        error,
                    });
                    continue;
                }
            };

            let distance_km = origin.distance_to(&point);
            if distance_km < radius_km {
                outcome.results.push(NearbyVendor {
                    vendor_id: vendor.id,
                    name: vendor.name.clone(),
                    latitude: point.latitude,
                    longitude: point.longitude,
                    distance_km,
                });
            }
        }

        outcome.results.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        outcome.results.truncate(limit);

        debug!(
            found = outcome.results.len(),
            skipped = outcome.skipped.len(),
            radius_km = radius_km,
            limit = limit,
            "Proximity search finished"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Schedule;
    use crate::services::geo::distance_km;

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn open_8_to_20() -> Schedule {
        Schedule {
            available_from: t(8),
            available_to: t(20),
            capacity: 2,
        }
    }

    fn vendor(id: u64, lat: f64, lon: f64) -> VendorListing {
        VendorListing::new(VendorId(id), format!("Wash {}", id))
            .with_coordinates(lat, lon)
            .with_schedule(open_8_to_20())
    }

    const ORIGIN: GeoPoint = GeoPoint {
        latitude: 10.776,
        longitude: 106.700,
    };

    #[test]
    fn test_results_sorted_and_limited() {
        let vendors = vec![
            vendor(1, 10.80, 106.70),
            vendor(2, 10.777, 106.701),
            vendor(3, 10.79, 106.71),
            vendor(4, 10.776, 106.700),
        ];

        let outcome = ProximitySearch::nearby(&vendors, t(12), ORIGIN, 50.0, 3);
        let ids: Vec<u64> = outcome.results.iter().map(|r| r.vendor_id.0).collect();
        assert_eq!(ids, vec![4, 2, 3]);
        assert!(outcome
            .results
            .windows(2)
            .all(|pair| pair[0].distance_km <= pair[1].distance_km));
        assert_eq!(outcome.results[0].distance_km, 0.0);

        for limit in 0..6 {
            let outcome = ProximitySearch::nearby(&vendors, t(12), ORIGIN, 50.0, limit);
            assert!(outcome.results.len() <= limit);
        }
    }

    #[test]
    fn test_radius_boundary_is_exclusive() {
        let vendors = vec![vendor(1, 10.9, 106.8)];
        let exact = distance_km(ORIGIN.latitude, ORIGIN.longitude, 10.9, 106.8);

        let at_boundary = ProximitySearch::nearby(&vendors, t(12), ORIGIN, exact, 10);
        assert!(at_boundary.results.is_empty());

        let just_inside = ProximitySearch::nearby(&vendors, t(12), ORIGIN, exact + 0.001, 10);
        assert_eq!(just_inside.results.len(), 1);
    }

    #[test]
    fn test_closed_or_unscheduled_vendors_are_excluded() {
        let mut unscheduled = vendor(2, 10.777, 106.700);
        unscheduled.schedule = None;
        let vendors = vec![vendor(1, 10.777, 106.700), unscheduled];

        assert!(ProximitySearch::nearby(&vendors, t(20), ORIGIN, 10.0, 10).results.is_empty());
        assert!(ProximitySearch::nearby(&vendors, t(7), ORIGIN, 10.0, 10).results.is_empty());

        let outcome = ProximitySearch::nearby(&vendors, t(8), ORIGIN, 10.0, 10);
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].vendor_id, VendorId(1));
    }

    #[test]
    fn test_bad_coordinates_are_reported_not_fatal() {
        let mut garbled = vendor(2, 0.0, 0.0);
        garbled.latitude = Some("ten point eight".into());
        let mut missing = vendor(3, 0.0, 0.0);
        missing.longitude = None;
        let mut textual = vendor(4, 0.0, 0.0);
        textual.latitude = Some("10.78".into());
        textual.longitude = Some("106.70".into());

        let vendors = vec![vendor(1, 10.777, 106.700), garbled, missing, textual];
        let outcome = ProximitySearch::nearby(&vendors, t(9), ORIGIN, 10.0, 10);

        let found: Vec<u64> = outcome.results.iter().map(|r| r.vendor_id.0).collect();
        assert_eq!(found, vec![1, 4]);
        assert_eq!(outcome.skipped.len(), 2);
        assert_eq!(outcome.skipped[0].vendor_id, VendorId(2));
        assert!(matches!(outcome.skipped[0].error, CoordinateParseError::Invalid { axis: "latitude", .. }));
        assert_eq!(
            outcome.skipped[1].error,
            CoordinateParseError::Missing { axis: "longitude" }
        );
    }

    #[test]
    fn test_nan_coordinate_is_reported_not_dropped() {
        let nan = VendorListing::new(VendorId(7), "Wash 7")
            .with_coordinates("NaN", "106.7")
            .with_schedule(open_8_to_20());

        let outcome = ProximitySearch::nearby(&[nan], t(12), ORIGIN, 1e9, 10);
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].vendor_id, VendorId(7));
        assert!(matches!(outcome.skipped[0].error, CoordinateParseError::Invalid { axis: "latitude", .. }));
    }
}
