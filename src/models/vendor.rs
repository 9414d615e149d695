use std::fmt;

use serde::{Deserialize, Serialize};

use super::{RatingAggregate, Schedule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VendorId(pub u64);

impl fmt::Display for VendorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored latitude or longitude. Older records keep coordinates as text,
/// so both shapes are accepted and parsed on use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    Number(f64),
    Text(String),
}

impl From<f64> for Coordinate {
    fn from(value: f64) -> Self {
        Coordinate::Number(value)
    }
}

impl From<&str> for Coordinate {
    fn from(value: &str) -> Self {
        Coordinate::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorListing {
    pub id: VendorId,
    #[serde(rename = "carwashName")]
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub latitude: Option<Coordinate>,
    #[serde(default)]
    pub longitude: Option<Coordinate>,
    #[serde(flatten)]
    pub rating: RatingAggregate,
    #[serde(default)]
    pub schedule: Option<Schedule>,
}

impl VendorListing {
    /// A newly onboarded listing: default rating, no coordinates, no schedule.
    pub fn new(id: VendorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            location: None,
            description: None,
            latitude: None,
            longitude: None,
            rating: RatingAggregate::default(),
            schedule: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_coordinates(mut self, latitude: impl Into<Coordinate>, longitude: impl Into<Coordinate>) -> Self {
        self.latitude = Some(latitude.into());
        self.longitude = Some(longitude.into());
        self
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = Some(schedule);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Client,
    #[serde(alias = "CARWASH")]
    Vendor,
    Admin,
}

/// A user account. Vendor listings are owned by accounts and share their id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: VendorId,
    pub username: String,
    pub role: UserRole,
    #[serde(default)]
    pub vendor: Option<VendorListing>,
}

impl Account {
    pub fn vendor(listing: VendorListing) -> Self {
        Self {
            id: listing.id,
            username: format!("vendor-{}", listing.id),
            role: UserRole::Vendor,
            vendor: Some(listing),
        }
    }

    /// The account's listing when it is eligible for discovery.
    pub fn eligible_listing(&self) -> Option<&VendorListing> {
        match self.role {
            UserRole::Vendor => self.vendor.as_ref(),
            _ => None,
        }
    }
}
