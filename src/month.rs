//! Target month inference.
//!
//! Each source contributes one `(month, year)` estimate, taken from its label,
//! its first row, or the clock, in that order. The estimates are sorted and the
//! one at index `N / 2` wins. With the usual three monthly exports (previous,
//! current, next) this picks the middle month. The rule only reads well for a
//! small odd N, and callers rely on it exactly as stated.

use crate::dates::{first_day_of_month, last_day_of_month, parse_date, same_month};
use crate::error::{Result, YahrzeitError};
use crate::ingestion::SourceTable;
use chrono::{Datelike, NaiveDate};
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Full names are tried before abbreviations; the first substring hit wins.
const MONTH_NAMES: [(&str, u32); 23] = [
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("oct", 10),
    ("nov", 11),
    ("dec", 12),
];

const YEAR_PATTERN: &str = r"20\d{2}";

/// A validated calendar month that a run is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTargetMonth")]
pub struct TargetMonth {
    year: i32,
    month: u32,
}

/// Unchecked wire form; deserialization goes through [`TargetMonth::new`].
#[derive(Deserialize)]
struct RawTargetMonth {
    year: i32,
    month: u32,
}

impl TryFrom<RawTargetMonth> for TargetMonth {
    type Error = YahrzeitError;

    fn try_from(raw: RawTargetMonth) -> Result<Self> {
        Self::new(raw.year, raw.month)
    }
}

impl TargetMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if first_day_of_month(year, month).is_none() || last_day_of_month(year, month).is_none() {
            return Err(YahrzeitError::InvalidTargetMonth { month, year });
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // Both bounds were checked in `new`.
        first_day_of_month(self.year, self.month).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        last_day_of_month(self.year, self.month).unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        same_month(date, self.year, self.month)
    }

    pub fn month_name(&self) -> String {
        self.first_day().format("%B").to_string()
    }

    /// Output title, e.g. `5 May 2025`.
    pub fn title(&self) -> String {
        format!("{} {} {}", self.month, self.month_name(), self.year)
    }
}

impl fmt::Display for TargetMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateSource {
    Label,
    FirstRow,
    Clock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthEstimate {
    pub month: u32,
    pub year: i32,
    pub month_from: EstimateSource,
    pub year_from: EstimateSource,
}

/// Finds a `20xx` year and a month name inside a source label.
pub fn parse_label(label: &str) -> Result<(Option<u32>, Option<i32>)> {
    let lowered = label.to_lowercase();

    let year_re = Regex::new(YEAR_PATTERN)?;
    let year = year_re
        .find(&lowered)
        .and_then(|m| m.as_str().parse::<i32>().ok());

    let month = MONTH_NAMES
        .iter()
        .find(|(name, _)| lowered.contains(name))
        .map(|(_, num)| *num);

    Ok((month, year))
}

pub fn estimate_month(source: &SourceTable, today: NaiveDate) -> Result<MonthEstimate> {
    let (label_month, label_year) = parse_label(&source.label)?;

    let mut month = label_month.map(|m| (m, EstimateSource::Label));
    let mut year = label_year.map(|y| (y, EstimateSource::Label));

    if month.is_none() || year.is_none() {
        if let Some(date) = source.first_date_label().and_then(parse_date) {
            month = month.or(Some((date.month(), EstimateSource::FirstRow)));
            year = year.or(Some((date.year(), EstimateSource::FirstRow)));
        }
    }

    let (month, month_from) = month.unwrap_or((today.month(), EstimateSource::Clock));
    let (year, year_from) = year.unwrap_or((today.year(), EstimateSource::Clock));

    Ok(MonthEstimate {
        month,
        year,
        month_from,
        year_from,
    })
}

/// Picks the estimate at sorted position `N / 2`. Equal estimates keep their
/// input order.
pub fn select_middle(estimates: &[MonthEstimate]) -> Result<TargetMonth> {
    if estimates.is_empty() {
        return Err(YahrzeitError::NoSources);
    }

    let mut sorted = estimates.to_vec();
    sorted.sort_by_key(|e| (e.year, e.month));

    let middle = sorted[sorted.len() / 2];
    TargetMonth::new(middle.year, middle.month)
}

pub fn select_target_month(sources: &[SourceTable], today: NaiveDate) -> Result<TargetMonth> {
    let mut estimates = Vec::with_capacity(sources.len());
    for source in sources {
        let estimate = estimate_month(source, today)?;
        debug!(
            "Source '{}' estimated as {}/{} (month from {:?}, year from {:?})",
            source.label, estimate.month, estimate.year, estimate.month_from, estimate.year_from
        );
        estimates.push(estimate);
    }

    let target = select_middle(&estimates)?;
    info!("Middle month determined: {}", target);
    Ok(target)
}
