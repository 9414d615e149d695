mod feedback;
mod ratings;
mod schedule;
mod vendor;

pub use feedback::{BookingId, BookingRef, FeedbackId, FeedbackRecord, NewFeedback};
pub use ratings::RatingAggregate;
pub use schedule::{Schedule, ScheduleInput, ScheduleView};
pub use vendor::{Account, Coordinate, UserRole, VendorId, VendorListing};
