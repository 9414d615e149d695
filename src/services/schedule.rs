use chrono::{DateTime, FixedOffset, NaiveTime, TimeZone};

use crate::error::ValidationError;
use crate::models::{Schedule, ScheduleInput, ScheduleView};
use crate::utils::time::time_of_day;

/// Evaluates vendor schedules. Windows never wrap past midnight.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleEvaluator;

impl ScheduleEvaluator {
    /// Opening is inclusive, closing is exclusive.
    pub fn is_open_at(schedule: &Schedule, time: NaiveTime) -> bool {
        schedule.available_from <= time && time < schedule.available_to
    }

    pub fn is_open_at_instant<Tz: TimeZone>(schedule: &Schedule, instant: &DateTime<Tz>, offset: FixedOffset) -> bool {
        Self::is_open_at(schedule, time_of_day(instant, offset))
    }

    pub fn has_capacity_for(schedule: &Schedule, requested_units: u32) -> bool {
        requested_units <= schedule.capacity
    }

    /// Capacity check against bookings already occupying the window.
    pub fn has_capacity_with(schedule: &Schedule, occupied: u32, requested_units: u32) -> bool {
        occupied
            .checked_add(requested_units)
            .is_some_and(|load| load <= schedule.capacity)
    }

    pub fn view(schedule: &Schedule, time: NaiveTime) -> ScheduleView {
        ScheduleView {
            available_from: schedule.available_from,
            available_to: schedule.available_to,
            capacity: schedule.capacity,
            is_active: Self::is_open_at(schedule, time),
        }
    }

    pub fn validate(input: &ScheduleInput) -> Result<Schedule, ValidationError> {
        let (from, to) = match (input.available_from, input.available_to) {
            (Some(from), Some(to)) => (from, to),
            _ => return Err(ValidationError::MissingTimes),
        };
        if from >= to {
            return Err(ValidationError::WindowNotIncreasing { from, to });
        }

        let capacity = input.capacity.ok_or(ValidationError::MissingCapacity)?;
        if capacity < 1 {
            return Err(ValidationError::NonPositiveCapacity(capacity));
        }
        let capacity = u32::try_from(capacity).map_err(|_| ValidationError::CapacityOverflow(capacity))?;

        Ok(Schedule {
            available_from: from,
            available_to: to,
            capacity,
        })
    }
}
