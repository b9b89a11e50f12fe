//! Weekdays, day sets, schedule partitions and date ranges.

pub mod dates;
pub mod partition;
pub mod preset;
pub mod weekday;

pub use dates::DateRange;
pub use partition::{CyclePattern, DayKind, OverlaySchedule, WeeklySchedule};
pub use preset::{DayPreset, describe_active_days};
pub use weekday::{ParseWeekdayError, Weekday, WeekdaySet};
