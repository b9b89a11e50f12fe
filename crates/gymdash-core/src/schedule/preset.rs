use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::weekday::{Weekday, WeekdaySet};

/// Shortcut for a fixed set of active days. Applying a preset replaces the
/// current selection outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayPreset {
    Weekdays,
    Weekends,
    AllDays,
    MonWedFri,
    TueThuSat,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown day preset {0:?} (expected weekdays, weekends, all, mwf or tts)")]
pub struct ParsePresetError(pub String);

impl DayPreset {
    pub const ALL: [DayPreset; 5] = [
        DayPreset::Weekdays,
        DayPreset::Weekends,
        DayPreset::AllDays,
        DayPreset::MonWedFri,
        DayPreset::TueThuSat,
    ];

    pub fn days(self) -> WeekdaySet {
        use Weekday::*;
        match self {
            Self::Weekdays => [Monday, Tuesday, Wednesday, Thursday, Friday]
                .into_iter()
                .collect(),
            Self::Weekends => [Saturday, Sunday].into_iter().collect(),
            Self::AllDays => WeekdaySet::ALL,
            Self::MonWedFri => [Monday, Wednesday, Friday].into_iter().collect(),
            Self::TueThuSat => [Tuesday, Thursday, Saturday].into_iter().collect(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Weekdays => "Weekdays",
            Self::Weekends => "Weekends",
            Self::AllDays => "All Days",
            Self::MonWedFri => "Mon/Wed/Fri",
            Self::TueThuSat => "Tue/Thu/Sat",
        }
    }
}

impl fmt::Display for DayPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DayPreset {
    type Err = ParsePresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekdays" => Ok(Self::Weekdays),
            "weekends" => Ok(Self::Weekends),
            "all" | "all-days" | "all days" => Ok(Self::AllDays),
            "mwf" | "mon-wed-fri" | "mon/wed/fri" => Ok(Self::MonWedFri),
            "tts" | "tue-thu-sat" | "tue/thu/sat" => Ok(Self::TueThuSat),
            _ => Err(ParsePresetError(s.to_owned())),
        }
    }
}

/// Human label for a set of active days.
pub fn describe_active_days(days: WeekdaySet) -> String {
    if days.is_empty() {
        return "Not set".to_owned();
    }
    if days == WeekdaySet::ALL {
        return "All Days".to_owned();
    }
    if days == DayPreset::Weekdays.days() {
        return "Weekdays".to_owned();
    }
    if days == DayPreset::Weekends.days() {
        return "Weekends".to_owned();
    }
    days.iter()
        .map(Weekday::short_label)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekends_preset_replaces_selection() {
        let mut current = DayPreset::MonWedFri.days();
        assert_eq!(current.len(), 3);
        current = DayPreset::Weekends.days();
        assert_eq!(
            current,
            [Weekday::Saturday, Weekday::Sunday].into_iter().collect()
        );
    }

    #[test]
    fn presets_have_expected_sizes() {
        let sizes: Vec<usize> = DayPreset::ALL.iter().map(|p| p.days().len()).collect();
        assert_eq!(sizes, vec![5, 2, 7, 3, 3]);
    }

    #[test]
    fn describe_uses_named_sets() {
        assert_eq!(describe_active_days(WeekdaySet::EMPTY), "Not set");
        assert_eq!(describe_active_days(WeekdaySet::ALL), "All Days");
        assert_eq!(describe_active_days(DayPreset::Weekdays.days()), "Weekdays");
        assert_eq!(describe_active_days(DayPreset::Weekends.days()), "Weekends");
        assert_eq!(
            describe_active_days(DayPreset::MonWedFri.days()),
            "Mon, Wed, Fri"
        );
    }

    #[test]
    fn parse_aliases() {
        assert_eq!("MWF".parse::<DayPreset>().unwrap(), DayPreset::MonWedFri);
        assert_eq!("all".parse::<DayPreset>().unwrap(), DayPreset::AllDays);
        assert!("fortnight".parse::<DayPreset>().is_err());
    }
}
