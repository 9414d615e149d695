pub mod time;

pub use time::{offset_from_minutes, time_of_day};
