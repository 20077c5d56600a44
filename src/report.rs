use crate::bucketer::{apply_display_date, Bucket};
use crate::cascade::apply_cascade;
use crate::month::TargetMonth;
use crate::schema::{DatedRecord, LabeledTable, Record, Table};
use log::warn;
use serde::{Deserialize, Serialize};

/// Label of the single table emitted when no week is retained.
pub const FALLBACK_LABEL: &str = "Complete List";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportWarning {
    /// Nothing was read from any source.
    EmptyInput,
    /// No week held a record from the target month; the fallback list was emitted.
    NoWeeksRetained,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub title: String,
    pub target: TargetMonth,
    pub master: Table,
    pub weeks: Vec<LabeledTable>,
    pub warnings: Vec<ReportWarning>,
}

impl WeeklyReport {
    pub fn empty(target: TargetMonth) -> Self {
        Self {
            title: target.title(),
            target,
            master: Vec::new(),
            weeks: Vec::new(),
            warnings: vec![ReportWarning::EmptyInput],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.master.is_empty() && self.weeks.is_empty()
    }

    pub fn is_fallback(&self) -> bool {
        self.warnings.contains(&ReportWarning::NoWeeksRetained)
    }
}

/// Cascades each bucket and joins them, in week order, into the master table.
///
/// With no buckets the master is every sorted record, dated for display but
/// not cascaded, and it is also the only labelled table.
pub fn assemble_report(
    target: TargetMonth,
    buckets: Vec<Bucket>,
    sorted: &[DatedRecord],
) -> WeeklyReport {
    if buckets.is_empty() {
        warn!(
            "No weeks with records from {} - emitting a single '{}' table",
            target, FALLBACK_LABEL
        );
        let master: Table = sorted
            .iter()
            .cloned()
            .map(|mut r| {
                apply_display_date(&mut r);
                r.into_record()
            })
            .collect();

        return WeeklyReport {
            title: target.title(),
            target,
            weeks: vec![LabeledTable {
                label: FALLBACK_LABEL.to_string(),
                rows: master.clone(),
            }],
            master,
            warnings: vec![ReportWarning::NoWeeksRetained],
        };
    }

    let weeks: Vec<LabeledTable> = buckets
        .into_iter()
        .map(|bucket| {
            let label = bucket.label();
            let mut rows: Vec<Record> = bucket.into_records();
            apply_cascade(&mut rows);
            LabeledTable { label, rows }
        })
        .collect();

    let master: Table = weeks.iter().flat_map(|w| w.rows.iter().cloned()).collect();

    WeeklyReport {
        title: target.title(),
        target,
        master,
        weeks,
        warnings: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucketer::{attach_dates, sort_records, WeeklyBucketer};
    use crate::weeks::weeks_for_month;
    use chrono::Weekday;

    fn rec(date: &str, last: &str, mourner: &str) -> Record {
        Record {
            day_of_week: "Mon".to_string(),
            date: date.to_string(),
            deceased_first_name: "Sam".to_string(),
            deceased_last_name: last.to_string(),
            mourner_first_name: mourner.to_string(),
            ..Default::default()
        }
    }

    fn build(records: Vec<Record>, target: TargetMonth) -> WeeklyReport {
        let mut sorted = attach_dates(records);
        sort_records(&mut sorted);
        let weeks = weeks_for_month(&target, Weekday::Sat);
        let buckets = WeeklyBucketer::new(target).bucket(&sorted, &weeks);
        assemble_report(target, buckets, &sorted)
    }

    #[test]
    fn test_master_is_weeks_in_order() {
        let target = TargetMonth::new(2025, 6).unwrap();
        let report = build(
            vec![
                rec("2025-06-16", "Katz", "Dan"),
                rec("2025-06-02", "Cohen", "Eli"),
                rec("2025-06-02", "Cohen", "Avi"),
            ],
            target,
        );

        assert_eq!(report.title, "6 June 2025");
        assert_eq!(report.weeks.len(), 2);
        assert_eq!(report.weeks[0].label, "May 31 - Jun 06");
        assert_eq!(report.weeks[1].label, "Jun 14 - Jun 20");

        let concatenated: Vec<Record> = report
            .weeks
            .iter()
            .flat_map(|w| w.rows.clone())
            .collect();
        assert_eq!(report.master, concatenated);

        // second Cohen row is cascaded down to the mourner
        assert_eq!(report.master[1].date, "");
        assert_eq!(report.master[1].mourner_first_name, "Avi");
        assert_eq!(report.master[2].date, "16-Jun");
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_fallback_when_no_week_has_target_records() {
        let target = TargetMonth::new(2025, 6).unwrap();
        let report = build(
            vec![
                rec("2025-08-16", "Katz", "Dan"),
                rec("2025-08-16", "Katz", "Dan"),
                rec("unknown", "Stern", "Ira"),
            ],
            target,
        );

        assert!(report.is_fallback());
        assert_eq!(report.weeks.len(), 1);
        assert_eq!(report.weeks[0].label, FALLBACK_LABEL);
        assert_eq!(report.master.len(), 3);
        // no cascade in the fallback list
        assert_eq!(report.master[1].date, "16-Aug");
        assert_eq!(report.master[2].date, "");
        assert_eq!(report.master[2].deceased_last_name, "Stern");
    }

    #[test]
    fn test_empty_report() {
        let report = WeeklyReport::empty(TargetMonth::new(2025, 6).unwrap());
        assert!(report.is_empty());
        assert_eq!(report.warnings, vec![ReportWarning::EmptyInput]);
    }
}
