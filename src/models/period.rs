use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use std::fmt;
use std::str::FromStr;

/// How transactions are grouped into periods for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum PeriodMode {
    Monthly,
    Weekly,
}

impl PeriodMode {
    pub fn toggle(self) -> Self {
        match self {
            PeriodMode::Monthly => PeriodMode::Weekly,
            PeriodMode::Weekly => PeriodMode::Monthly,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PeriodMode::Monthly => "Monthly",
            PeriodMode::Weekly => "Weekly",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            PeriodMode::Monthly => "month",
            PeriodMode::Weekly => "week",
        }
    }
}

impl fmt::Display for PeriodMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for PeriodMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "month" => Ok(PeriodMode::Monthly),
            "weekly" | "week" => Ok(PeriodMode::Weekly),
            other => Err(format!("Unknown mode '{}'. Use 'monthly' or 'weekly'.", other)),
        }
    }
}

/// Shape of the weekly period key.
///
/// `Iso` qualifies the ISO week with its ISO week-based year. `Number` keeps
/// only the week number, so the same week of two different years lands in
/// one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum WeekKey {
    #[default]
    Iso,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PeriodKey {
    Month { year: i32, month: u32 },
    Week { year: i32, week: u32 },
    WeekNumber(u32),
}

impl PeriodKey {
    /// Derives the period a date falls in. Never stored, always recomputed.
    pub fn for_date(date: NaiveDate, mode: PeriodMode, week_key: WeekKey) -> Self {
        match mode {
            PeriodMode::Monthly => PeriodKey::Month {
                year: date.year(),
                month: date.month(),
            },
            PeriodMode::Weekly => {
                let iso = date.iso_week();
                match week_key {
                    WeekKey::Iso => PeriodKey::Week {
                        year: iso.year(),
                        week: iso.week(),
                    },
                    WeekKey::Number => PeriodKey::WeekNumber(iso.week()),
                }
            }
        }
    }

    /// Whether this key has the shape `for_date` produces under the given
    /// grouping.
    pub fn fits(self, mode: PeriodMode, week_key: WeekKey) -> bool {
        matches!(
            (self, mode, week_key),
            (PeriodKey::Month { .. }, PeriodMode::Monthly, _)
                | (PeriodKey::Week { .. }, PeriodMode::Weekly, WeekKey::Iso)
                | (PeriodKey::WeekNumber(_), PeriodMode::Weekly, WeekKey::Number)
        )
    }

    /// Parses a user-typed key and rejects one that can never match a
    /// transaction under the given grouping.
    pub fn parse_for(raw: &str, mode: PeriodMode, week_key: WeekKey) -> Result<Self, String> {
        let key = raw.parse::<PeriodKey>()?;
        if key.fits(mode, week_key) {
            return Ok(key);
        }
        let expected = match (mode, week_key) {
            (PeriodMode::Monthly, _) => "YYYY-MM",
            (PeriodMode::Weekly, WeekKey::Iso) => "YYYY-Www",
            (PeriodMode::Weekly, WeekKey::Number) => "a week number",
        };
        Err(format!(
            "Period '{}' does not fit {} mode. Use {}.",
            raw.trim(),
            mode.unit(),
            expected
        ))
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKey::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
            PeriodKey::Week { year, week } => write!(f, "{:04}-W{:02}", year, week),
            PeriodKey::WeekNumber(week) => write!(f, "{}", week),
        }
    }
}

impl FromStr for PeriodKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || {
            format!(
                "Invalid period '{}'. Use YYYY-MM, YYYY-Www or a week number.",
                s
            )
        };

        if let Some((year, week)) = s.split_once("-W").or_else(|| s.split_once("-w")) {
            let year = year.parse::<i32>().map_err(|_| invalid())?;
            let week = parse_week(week).ok_or_else(invalid)?;
            return Ok(PeriodKey::Week { year, week });
        }

        if let Some((year, month)) = s.split_once('-') {
            let year = year.parse::<i32>().map_err(|_| invalid())?;
            let month = month
                .parse::<u32>()
                .ok()
                .filter(|m| (1..=12).contains(m))
                .ok_or_else(invalid)?;
            return Ok(PeriodKey::Month { year, month });
        }

        parse_week(s).map(PeriodKey::WeekNumber).ok_or_else(invalid)
    }
}

fn parse_week(s: &str) -> Option<u32> {
    s.parse::<u32>().ok().filter(|w| (1..=53).contains(w))
}
