use serde::{Deserialize, Serialize};

use crate::error::CoordinateParseError;
use crate::models::{Coordinate, VendorListing};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers between two coordinates (haversine).
///
/// Inputs are not range-checked; NaN propagates to the result.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat_distance = (lat2 - lat1).to_radians();
    let lon_distance = (lon2 - lon1).to_radians();

    let a = (lat_distance / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (lon_distance / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }

    /// Parses a listing's stored coordinates. Missing or unparsable values
    /// are errors, never a default position.
    pub fn from_listing(listing: &VendorListing) -> Result<Self, CoordinateParseError> {
        let latitude = parse_coordinate(listing.latitude.as_ref(), "latitude")?;
        let longitude = parse_coordinate(listing.longitude.as_ref(), "longitude")?;
        Ok(Self { latitude, longitude })
    }
}

/// Non-finite values ("NaN", "inf") are rejected like any other garbage.
pub fn parse_coordinate(value: Option<&Coordinate>, axis: &'static str) -> Result<f64, CoordinateParseError> {
    let invalid = |value: String| CoordinateParseError::Invalid { axis, value };
    match value {
        None => Err(CoordinateParseError::Missing { axis }),
        Some(Coordinate::Number(n)) if n.is_finite() => Ok(*n),
        Some(Coordinate::Number(n)) => Err(invalid(n.to_string())),
        Some(Coordinate::Text(text)) => match text.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(n),
            _ => Err(invalid(text.clone())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VendorId;
    use rand::Rng;

    #[test]
    fn test_distance_to_self_is_zero() {
        assert_eq!(distance_km(10.776, 106.700, 10.776, 106.700), 0.0);
        assert_eq!(distance_km(-45.0, -170.0, -45.0, -170.0), 0.0);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = distance_km(10.0, 106.0, 11.0, 106.0);
        assert!((d - 111.2).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let (lat1, lon1) = (rng.random_range(-90.0..=90.0), rng.random_range(-180.0..=180.0));
            let (lat2, lon2) = (rng.random_range(-90.0..=90.0), rng.random_range(-180.0..=180.0));
            let there = distance_km(lat1, lon1, lat2, lon2);
            let back = distance_km(lat2, lon2, lat1, lon1);
            assert!((there - back).abs() < 1e-9, "{} vs {}", there, back);
        }
    }

    #[test]
    fn test_nan_propagates_without_panic() {
        assert!(distance_km(f64::NAN, 106.0, 10.0, 106.0).is_nan());
        // Out of range is the caller's problem, but must still compute.
        assert!(distance_km(200.0, 400.0, 10.0, 106.0).is_finite());
    }

    #[test]
    fn test_parse_coordinate_fails_loudly() {
        assert_eq!(parse_coordinate(Some(&Coordinate::from(" 10.5 ")), "latitude"), Ok(10.5));
        assert_eq!(parse_coordinate(Some(&Coordinate::Number(3.0)), "latitude"), Ok(3.0));
        assert_eq!(
            parse_coordinate(None, "longitude"),
            Err(CoordinateParseError::Missing { axis: "longitude" })
        );
        assert_eq!(
            parse_coordinate(Some(&Coordinate::from("north")), "latitude"),
            Err(CoordinateParseError::Invalid {
                axis: "latitude",
                value: "north".to_string()
            })
        );
    }

    #[test]
    fn test_non_finite_coordinates_are_invalid() {
        for text in ["NaN", "inf", "-infinity"] {
            assert_eq!(
                parse_coordinate(Some(&Coordinate::from(text)), "latitude"),
                Err(CoordinateParseError::Invalid {
                    axis: "latitude",
                    value: text.to_string()
                })
            );
        }
        assert!(matches!(
            parse_coordinate(Some(&Coordinate::Number(f64::INFINITY)), "longitude"),
            Err(CoordinateParseError::Invalid { axis: "longitude", .. })
        ));
    }

    #[test]
    fn test_point_from_listing() {
        let listing = VendorListing::new(VendorId(1), "A").with_coordinates("10.0", 106.0);
        assert_eq!(GeoPoint::from_listing(&listing), Ok(GeoPoint::new(10.0, 106.0)));

        let missing = VendorListing::new(VendorId(2), "B");
        assert!(GeoPoint::from_listing(&missing).is_err());
    }
}
