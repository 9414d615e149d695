use serde::{Deserialize, Serialize};

/// Average assigned to a freshly onboarded vendor that has never been rated.
pub const CREATION_DEFAULT_AVERAGE: f64 = 5.0;

/// Summary of a vendor's feedback set.
///
/// Only [`crate::services::RatingAggregator`] writes this after onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingAggregate {
    #[serde(rename = "averageRating")]
    pub average: Option<f64>,
    #[serde(rename = "ratingCount")]
    pub count: u32,
}

impl RatingAggregate {
    /// Builds the aggregate from feedback store results. An empty feedback set
    /// yields an average of 0.0, not the onboarding default.
    pub fn from_feedback(average: Option<f64>, count: u32) -> Self {
        Self {
            average: Some(average.unwrap_or(0.0)),
            count,
        }
    }
}

impl Default for RatingAggregate {
    fn default() -> Self {
        Self {
            average: Some(CREATION_DEFAULT_AVERAGE),
            count: 0,
        }
    }
}
