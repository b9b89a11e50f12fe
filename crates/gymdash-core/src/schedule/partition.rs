use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::weekday::{Weekday, WeekdaySet};
use crate::error::ValidationError;

/// How a member treats a given day of the week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    #[default]
    Active,
    Rest,
    Cheat,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown day kind {0:?} (expected active, rest or cheat)")]
pub struct ParseDayKindError(pub String);

impl fmt::Display for DayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Rest => "rest",
            Self::Cheat => "cheat",
        };
        f.write_str(s)
    }
}

impl FromStr for DayKind {
    type Err = ParseDayKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "rest" => Ok(Self::Rest),
            "cheat" => Ok(Self::Cheat),
            other => Err(ParseDayKindError(other.to_owned())),
        }
    }
}

/// Classification of all seven days. Every day always has exactly one kind.
///
/// Serialized as a `weekday -> kind` map. Days missing from a stored map
/// load as active.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Weekday, DayKind>", into = "BTreeMap<Weekday, DayKind>")]
pub struct WeeklySchedule([DayKind; 7]);

impl Default for WeeklySchedule {
    fn default() -> Self {
        Self([DayKind::Active; 7])
    }
}

impl WeeklySchedule {
    pub fn kind_of(&self, day: Weekday) -> DayKind {
        self.0[day.index()]
    }

    /// Move `day` into `kind`, taking it out of whichever kind held it.
    pub fn set(&mut self, day: Weekday, kind: DayKind) {
        self.0[day.index()] = kind;
    }

    pub fn days_of(&self, kind: DayKind) -> WeekdaySet {
        Weekday::ALL
            .into_iter()
            .filter(|d| self.kind_of(*d) == kind)
            .collect()
    }

    /// Build from separate rest and cheat lists, as older schedules were
    /// stored. A day in both is a rest day; a day in neither is active.
    pub fn from_lists(rest: WeekdaySet, cheat: WeekdaySet) -> Self {
        let mut schedule = Self::default();
        for day in Weekday::ALL {
            let kind = if rest.contains(day) {
                DayKind::Rest
            } else if cheat.contains(day) {
                DayKind::Cheat
            } else {
                DayKind::Active
            };
            schedule.set(day, kind);
        }
        schedule
    }
}

impl fmt::Debug for WeeklySchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(Weekday::DISPLAY_ORDER.iter().map(|d| (d, self.kind_of(*d))))
            .finish()
    }
}

impl From<BTreeMap<Weekday, DayKind>> for WeeklySchedule {
    fn from(map: BTreeMap<Weekday, DayKind>) -> Self {
        let mut schedule = Self::default();
        for (day, kind) in map {
            schedule.set(day, kind);
        }
        schedule
    }
}

impl From<WeeklySchedule> for BTreeMap<Weekday, DayKind> {
    fn from(schedule: WeeklySchedule) -> Self {
        Weekday::ALL
            .into_iter()
            .map(|d| (d, schedule.kind_of(d)))
            .collect()
    }
}

// ---------------------------------------------------------------------------

/// Length of the repeating cycle the schedule describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "pattern", rename_all = "snake_case")]
pub enum CyclePattern {
    #[default]
    Weekly,
    BiWeekly,
    Custom { days: u16 },
}

impl CyclePattern {
    pub fn custom(days: u16) -> Result<Self, ValidationError> {
        if !(1..=365).contains(&days) {
            return Err(ValidationError::CycleOutOfRange(days));
        }
        Ok(Self::Custom { days })
    }

    pub fn length_days(self) -> u16 {
        match self {
            Self::Weekly => 7,
            Self::BiWeekly => 14,
            Self::Custom { days } => days,
        }
    }
}

/// Schedule section of a customization overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlaySchedule {
    pub days: WeeklySchedule,
    #[serde(default)]
    pub cycle: CyclePattern,
}
