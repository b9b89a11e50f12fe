use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Day of the week. Numbered from Sunday, matching `chrono`'s
/// `num_days_from_sunday`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown weekday {0:?}")]
pub struct ParseWeekdayError(pub String);

impl Weekday {
    /// Sunday-first, the numbering order.
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// Monday-first, the order days are shown in.
    pub const DISPLAY_ORDER: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sunday => "sunday",
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
        }
    }

    /// Three-letter label, e.g. `Mon`.
    pub fn short_label(self) -> &'static str {
        match self {
            Self::Sunday => "Sun",
            Self::Monday => "Mon",
            Self::Tuesday => "Tue",
            Self::Wednesday => "Wed",
            Self::Thursday => "Thu",
            Self::Friday => "Fri",
            Self::Saturday => "Sat",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = ParseWeekdayError;

    /// Accepts full names and three-letter abbreviations, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Weekday::ALL
            .into_iter()
            .find(|d| d.as_str() == lower || d.as_str()[..3] == lower)
            .ok_or_else(|| ParseWeekdayError(s.to_owned()))
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        Weekday::ALL[day.num_days_from_sunday() as usize]
    }
}

// ---------------------------------------------------------------------------

/// A set of weekdays. Serialized as a list of day names in display order.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Weekday>", into = "Vec<Weekday>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: WeekdaySet = WeekdaySet(0);
    pub const ALL: WeekdaySet = WeekdaySet(0b111_1111);

    pub fn insert(&mut self, day: Weekday) -> bool {
        let had = self.contains(day);
        self.0 |= 1 << day.index();
        !had
    }

    pub fn remove(&mut self, day: Weekday) -> bool {
        let had = self.contains(day);
        self.0 &= !(1 << day.index());
        had
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & (1 << day.index()) != 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Days in display order (Monday first).
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        Weekday::DISPLAY_ORDER
            .into_iter()
            .filter(move |d| self.contains(*d))
    }

    /// Day names for storage in a `TEXT[]` column.
    pub fn to_names(self) -> Vec<String> {
        self.iter().map(|d| d.as_str().to_owned()).collect()
    }

    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, ParseWeekdayError> {
        names.iter().map(|n| n.as_ref().parse::<Weekday>()).collect()
    }
}

impl fmt::Debug for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = WeekdaySet::EMPTY;
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl From<Vec<Weekday>> for WeekdaySet {
    fn from(days: Vec<Weekday>) -> Self {
        days.into_iter().collect()
    }
}

impl From<WeekdaySet> for Vec<Weekday> {
    fn from(set: WeekdaySet) -> Self {
        set.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_abbreviations_and_case() {
        assert_eq!("Mon".parse::<Weekday>().unwrap(), Weekday::Monday);
        assert_eq!("SATURDAY".parse::<Weekday>().unwrap(), Weekday::Saturday);
        assert!("funday".parse::<Weekday>().is_err());
    }

    #[test]
    fn chrono_conversion_matches_names() {
        assert_eq!(Weekday::from(chrono::Weekday::Sun), Weekday::Sunday);
        assert_eq!(Weekday::from(chrono::Weekday::Thu), Weekday::Thursday);
    }

    #[test]
    fn set_ignores_duplicates() {
        let set: WeekdaySet = [Weekday::Monday, Weekday::Monday, Weekday::Friday]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
        assert_eq!(set.to_names(), vec!["monday", "friday"]);
    }

    #[test]
    fn set_serializes_as_names_in_display_order() {
        let set: WeekdaySet = [Weekday::Sunday, Weekday::Tuesday].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["tuesday","sunday"]"#);
        let back: WeekdaySet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn insert_and_remove_report_change() {
        let mut set = WeekdaySet::EMPTY;
        assert!(set.insert(Weekday::Wednesday));
        assert!(!set.insert(Weekday::Wednesday));
        assert!(set.remove(Weekday::Wednesday));
        assert!(set.is_empty());
    }
}
