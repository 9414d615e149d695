use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// A vendor's single daily opening window and its concurrent booking ceiling.
///
/// Only constructed through [`crate::services::ScheduleEvaluator::validate`]
/// (or deserialized from a trusted snapshot), so `available_from` is always
/// strictly before `available_to` and `capacity` is at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub available_from: NaiveTime,
    pub available_to: NaiveTime,
    pub capacity: u32,
}

/// Untrusted schedule input as sent by a vendor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInput {
    pub available_from: Option<NaiveTime>,
    pub available_to: Option<NaiveTime>,
    pub capacity: Option<i64>,
    /// Accepted for compatibility and ignored; openness is always derived.
    pub is_active: Option<bool>,
}

/// Schedule as shown to callers, with the derived open flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleView {
    pub available_from: NaiveTime,
    pub available_to: NaiveTime,
    pub capacity: u32,
    pub is_active: bool,
}
