pub mod discovery;
pub mod feedback;
pub mod geo;
pub mod proximity;
pub mod ranking;
pub mod rating;
pub mod schedule;

pub use discovery::{DiscoveryEngine, NearbyRequest, VendorDetails};
pub use feedback::{FeedbackEvent, FeedbackListener, FeedbackService};
pub use geo::{distance_km, GeoPoint};
pub use proximity::{CoordinateIssue, NearbyVendor, ProximityOutcome, ProximitySearch};
pub use ranking::{SearchQuery, SortDirection, SortKey, VendorRanker};
pub use rating::RatingAggregator;
pub use schedule::ScheduleEvaluator;
