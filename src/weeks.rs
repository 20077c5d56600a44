use crate::month::TargetMonth;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

pub const DEFAULT_WEEK_START: Weekday = Weekday::Sat;

/// Seven consecutive days, `start..=end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Week {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Week {
    pub fn starting(start: NaiveDate) -> Option<Self> {
        let end = start.checked_add_days(Days::new(6))?;
        Some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn overlaps(&self, target: &TargetMonth) -> bool {
        self.start <= target.last_day() && target.first_day() <= self.end
    }

    /// Sheet label such as `Feb 01 - Feb 07`.
    pub fn label(&self) -> String {
        format!("{} - {}", self.start.format("%b %d"), self.end.format("%b %d"))
    }
}

fn days_back_to(date: NaiveDate, weekday: Weekday) -> u64 {
    let from = date.weekday().num_days_from_monday();
    let to = weekday.num_days_from_monday();
    ((from + 7 - to) % 7) as u64
}

fn days_forward_to(date: NaiveDate, weekday: Weekday) -> u64 {
    let from = date.weekday().num_days_from_monday();
    let to = weekday.num_days_from_monday();
    ((to + 7 - from) % 7) as u64
}

/// Every `week_start`-aligned week that shares at least one day with `target`.
///
/// The first week starts on or before the 1st and the last one ends on or after
/// the final day, so the outer weeks may spill into neighbouring months.
pub fn weeks_for_month(target: &TargetMonth, week_start: Weekday) -> Vec<Week> {
    let week_end = week_start.pred();

    let first = target.first_day();
    let last = target.last_day();

    let Some(first_start) = first.checked_sub_days(Days::new(days_back_to(first, week_start)))
    else {
        return Vec::new();
    };
    let Some(last_end) = last.checked_add_days(Days::new(days_forward_to(last, week_end))) else {
        return Vec::new();
    };

    let mut weeks = Vec::new();
    let mut current = first_start;
    while current <= last_end {
        let Some(week) = Week::starting(current) else {
            break;
        };
        weeks.push(week);
        match current.checked_add_days(Days::new(7)) {
            Some(next) => current = next,
            None => break,
        }
    }

    weeks
}
