use crate::dates::{format_display_date, parse_date};
use crate::month::TargetMonth;
use crate::schema::{DatedRecord, Record};
use crate::weeks::Week;
use log::debug;
use std::cmp::Ordering;

/// A week and the records dated inside it, in sorted order.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub week: Week,
    pub records: Vec<DatedRecord>,
}

impl Bucket {
    pub fn label(&self) -> String {
        self.week.label()
    }

    /// Plain records with the effective date dropped.
    pub fn into_records(self) -> Vec<Record> {
        self.records.into_iter().map(DatedRecord::into_record).collect()
    }
}

pub fn attach_dates(records: Vec<Record>) -> Vec<DatedRecord> {
    records
        .into_iter()
        .map(|record| {
            let effective_date = parse_date(&record.date);
            DatedRecord {
                record,
                effective_date,
            }
        })
        .collect()
}

fn compare_records(a: &DatedRecord, b: &DatedRecord) -> Ordering {
    let by_date = match (a.effective_date, b.effective_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    by_date
        .then_with(|| a.record.deceased_last_name.cmp(&b.record.deceased_last_name))
        .then_with(|| {
            a.record
                .deceased_first_name
                .cmp(&b.record.deceased_first_name)
        })
}

/// Stable sort by date (undated last), then deceased last and first name.
pub fn sort_records(records: &mut [DatedRecord]) {
    records.sort_by(compare_records);
}

/// Rewrites the date label from the parsed date, e.g. `05-Jun`.
pub fn apply_display_date(record: &mut DatedRecord) {
    record.record.date = format_display_date(record.effective_date);
}

pub struct WeeklyBucketer {
    target: TargetMonth,
}

impl WeeklyBucketer {
    pub fn new(target: TargetMonth) -> Self {
        Self { target }
    }

    /// Assigns sorted records to weeks. A week is kept only when at least one
    /// of its records falls inside the target month; spillover alone is not
    /// enough.
    pub fn bucket(&self, sorted: &[DatedRecord], weeks: &[Week]) -> Vec<Bucket> {
        let mut buckets = Vec::new();

        for week in weeks {
            let mut records: Vec<DatedRecord> = sorted
                .iter()
                .filter(|r| r.effective_date.is_some_and(|d| week.contains(d)))
                .cloned()
                .collect();

            let in_month = records
                .iter()
                .any(|r| r.effective_date.is_some_and(|d| self.target.contains(d)));

            if !in_month {
                debug!(
                    "Skipping week {} ({} records, none in {})",
                    week.label(),
                    records.len(),
                    self.target
                );
                continue;
            }

            records.iter_mut().for_each(apply_display_date);
            buckets.push(Bucket {
                week: *week,
                records,
            });
        }

        buckets
    }
}
