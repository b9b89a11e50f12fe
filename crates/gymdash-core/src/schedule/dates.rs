use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Start date plus an optional end. No end means the range is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// End before start. Stored as given; callers surface it as a warning.
    pub fn is_inverted(&self) -> bool {
        matches!(self.end, Some(end) if end < self.start)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && self.end.is_none_or(|end| date <= end)
    }

    /// Whole weeks between the start and `today`, zero before the start.
    pub fn weeks_elapsed(&self, today: NaiveDate) -> u32 {
        let days = (today - self.start).num_days();
        if days <= 0 {
            0
        } else {
            u32::try_from(days / 7).unwrap_or(u32::MAX)
        }
    }

    /// Whole weeks the range has been in effect by `today`. Counting stops
    /// at the end date.
    pub fn weeks_in_effect(&self, today: NaiveDate) -> u32 {
        let until = match self.end {
            Some(end) if end < today => end,
            _ => today,
        };
        self.weeks_elapsed(until)
    }

    pub fn end_label(&self) -> String {
        match self.end {
            Some(end) => end.format("%Y-%m-%d").to_string(),
            None => "Ongoing".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn open_range_is_ongoing() {
        let range = DateRange::new(date(2024, 1, 1), None);
        assert_eq!(range.end_label(), "Ongoing");
        assert!(range.contains(date(2030, 6, 1)));
        assert!(!range.is_inverted());
    }

    #[test]
    fn inverted_range_is_detected() {
        let range = DateRange::new(date(2024, 3, 1), Some(date(2024, 2, 1)));
        assert!(range.is_inverted());
        assert!(!range.contains(date(2024, 2, 15)));
    }

    #[test]
    fn weeks_elapsed_floors() {
        let range = DateRange::new(date(2024, 1, 1), None);
        assert_eq!(range.weeks_elapsed(date(2023, 12, 25)), 0);
        assert_eq!(range.weeks_elapsed(date(2024, 1, 7)), 0);
        assert_eq!(range.weeks_elapsed(date(2024, 1, 8)), 1);
        assert_eq!(range.weeks_elapsed(date(2024, 1, 15)), 2);
    }

    #[test]
    fn weeks_in_effect_stop_at_end() {
        let range = DateRange::new(date(2024, 1, 1), Some(date(2024, 1, 15)));
        assert_eq!(range.weeks_in_effect(date(2024, 1, 8)), 1);
        assert_eq!(range.weeks_in_effect(date(2024, 6, 3)), 2);

        let inverted = DateRange::new(date(2024, 3, 1), Some(date(2024, 2, 1)));
        assert_eq!(inverted.weeks_in_effect(date(2024, 6, 3)), 0);
    }
}
