use chrono::{Datelike, Days, NaiveDate};

/// Formats seen in yahrzeit exports, most specific first.
pub const DATE_FORMATS: [&str; 4] = [
    "%d-%b-%y", // 01-Jun-25
    "%b %d, %Y", // May 11, 2025
    "%Y-%m-%d", // 2025-05-11
    "%B %d, %Y", // July 2, 2025
];

/// Day-number plus abbreviated month, e.g. `05-Jun`.
pub const DISPLAY_FORMAT: &str = "%d-%b";

/// Parses a date label against [`DATE_FORMATS`], returning the first match.
pub fn parse_date(label: &str) -> Option<NaiveDate> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

pub fn format_display_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format(DISPLAY_FORMAT).to_string(),
        None => String::new(),
    }
}

/// Reads a `05-Jun` display label back into a date. The display format carries
/// no year, so the caller supplies it.
pub fn parse_display_date(label: &str, year: i32) -> Option<NaiveDate> {
    let with_year = format!("{}-{}", label.trim(), year);
    NaiveDate::parse_from_str(&with_year, "%d-%b-%Y").ok()
}

pub fn first_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    first_day_of_month(year, month)?;
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.checked_sub_days(Days::new(1))
}

pub fn same_month(date: NaiveDate, year: i32, month: u32) -> bool {
    date.year() == year && date.month() == month
}
