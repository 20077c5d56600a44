use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};
use yahrzeit_list_builder::*;

const HEADER: &str = "Yahrzeit Day of the Week,Yahrzeit Long Date,Hebrew Day,Observance Hebrew Month,Deceased First Name,Deceased Last Name,Deceased Name Hebrew,First Name,Last Name,Relationship deceased to mourner,Tribe";

fn export_row(
    day: &str,
    date: &str,
    hebrew_day: &str,
    hebrew_month: &str,
    deceased: (&str, &str),
    mourner: (&str, &str),
    relationship: &str,
) -> String {
    format!(
        "{},{},{},{},{},{},,{},{},{},",
        day, date, hebrew_day, hebrew_month, deceased.0, deceased.1, mourner.0, mourner.1, relationship
    )
}

fn write_export(dir: &Path, name: &str, rows: &[String]) -> std::io::Result<()> {
    let mut body = String::from(HEADER);
    body.push('\n');
    for row in rows {
        body.push_str(row);
        body.push('\n');
    }
    fs::write(dir.join(name), body)
}

fn set_mtime(path: &Path, secs_after_epoch: u64) -> std::io::Result<()> {
    let file = File::options().write(true).open(path)?;
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs_after_epoch))
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn one_row_source(label: &str, date: &str) -> SourceTable {
    SourceTable::new(
        label,
        vec![BTreeMap::from([(
            "Yahrzeit Long Date".to_string(),
            date.to_string(),
        )])],
    )
}

#[test]
fn test_middle_month_of_three_labelled_exports() {
    let sources = vec![
        one_row_source("April2025.csv", "14-Apr-25"),
        one_row_source("may_2025.csv", "14-May-25"),
        one_row_source("June-2025.csv", "14-Jun-25"),
    ];
    let target = select_target_month(&sources, today()).unwrap();
    assert_eq!((target.month(), target.year()), (5, 2025));
}

#[test]
fn test_first_row_decides_when_labels_are_opaque() {
    let sources = vec![
        one_row_source("export (1).csv", "July 2, 2025"),
        one_row_source("export (2).csv", "2025-05-11"),
        one_row_source("export (3).csv", "Jun 9, 2025"),
    ];
    let target = select_target_month(&sources, today()).unwrap();
    assert_eq!((target.month(), target.year()), (6, 2025));
}

#[test]
fn test_weeks_for_every_month_are_contiguous_saturday_weeks() {
    for year in 2020..=2030 {
        for month in 1..=12 {
            let target = TargetMonth::new(year, month).unwrap();
            let weeks = weeks_for_month(&target, Weekday::Sat);
            for w in &weeks {
                assert_eq!(w.start.weekday(), Weekday::Sat);
                assert_eq!(w.end.weekday(), Weekday::Fri);
                assert!(w.overlaps(&target));
            }
            for pair in weeks.windows(2) {
                assert_eq!(pair[0].end.succ_opt().unwrap(), pair[1].start);
            }
        }
    }
}

#[test]
fn test_display_dates_reparse_to_the_original_day() {
    let target = TargetMonth::new(2024, 2).unwrap();
    let sources = vec![SourceTable::new(
        "february_2024.csv",
        ["2024-02-01", "Feb 29, 2024", "15-Feb-24", "March 1, 2024"]
            .iter()
            .map(|d| BTreeMap::from([("Yahrzeit Long Date".to_string(), d.to_string())]))
            .collect(),
    )];

    let report = process_sources(&sources, today()).unwrap();
    assert_eq!(report.target, target);

    let originals: Vec<NaiveDate> = ["2024-02-01", "2024-02-15", "2024-02-29", "2024-03-01"]
        .iter()
        .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap())
        .collect();
    let shown: Vec<NaiveDate> = report
        .master
        .iter()
        .map(|r| parse_display_date(&r.date, 2024).unwrap())
        .collect();
    assert_eq!(shown, originals);
}

#[test]
fn test_week_with_only_previous_month_records_is_dropped() {
    // July 2025 starts on a Tuesday, so the first week is Sat June 28 - Fri July 4
    let sources = vec![SourceTable::new(
        "july_2025.csv",
        ["28-Jun-25", "30-Jun-25", "08-Jul-25"]
            .iter()
            .map(|d| BTreeMap::from([("Yahrzeit Long Date".to_string(), d.to_string())]))
            .collect(),
    )];

    let report = process_sources(&sources, today()).unwrap();
    assert_eq!(report.weeks.len(), 1);
    assert_eq!(report.weeks[0].label, "Jul 05 - Jul 11");
    assert_eq!(report.master.len(), 1);
    assert_eq!(report.master[0].date, "08-Jul");
}

#[test]
fn test_folder_run_with_cascade_and_delivery() -> anyhow::Result<()> {
    let input = tempfile::tempdir()?;
    let output = tempfile::tempdir()?;

    write_export(
        input.path(),
        "Yahrzeits_April_2025.csv",
        &[export_row("Wednesday", "30-Apr-25", "2", "Iyar", ("Leah", "Baum"), ("Noa", "Baum"), "MOTHER")],
    )?;
    write_export(
        input.path(),
        "Yahrzeits_May_2025.csv",
        &[
            export_row("Monday", "05-May-25", "7", "Iyar", ("Abraham", "Cohen"), ("Sarah", "Levi"), "father"),
            export_row("Monday", "05-May-25", "7", "Iyar", ("Abraham", "Cohen"), ("David", "Levi"), "father"),
            export_row("Monday", "05-May-25", "7", "Iyar", ("Abraham", "Katz"), ("David", "Levi"), "uncle"),
            export_row("Tuesday", "13-May-25", "15", "Iyar", ("Rivka", "Adler"), ("Tova", "Adler"), "none"),
        ],
    )?;
    write_export(
        input.path(),
        "Yahrzeits_June_2025.csv",
        &[export_row("Monday", "02-Jun-25", "6", "Sivan", ("Moshe", "Gold"), ("Ari", "Gold"), "brother")],
    )?;

    let config = ProcessorConfig {
        csv_folder: input.path().to_path_buf(),
        ..ProcessorConfig::default()
    };
    let report = YahrzeitListProcessor::new(config).process_folder(today())?;

    assert_eq!(report.title, "5 May 2025");
    let labels: Vec<&str> = report.weeks.iter().map(|w| w.label.as_str()).collect();
    // Apr 26 - May 02 has the April 30th record only, so it is dropped
    assert_eq!(labels, vec!["May 03 - May 09", "May 10 - May 16"]);

    let first_week = &report.weeks[0].rows;
    assert_eq!(first_week.len(), 3);
    assert_eq!(first_week[0].day_of_week, "Mon");
    assert_eq!(first_week[0].date, "05-May");
    assert_eq!(first_week[0].relationship, "Father");
    // same deceased, second mourner
    assert_eq!(first_week[1].deceased_last_name, "");
    assert_eq!(first_week[1].mourner_first_name, "David");
    // same date, different deceased: date columns blank, deceased and mourner reprinted
    assert_eq!(first_week[2].date, "");
    assert_eq!(first_week[2].hebrew_month, "");
    assert_eq!(first_week[2].deceased_first_name, "");
    assert_eq!(first_week[2].deceased_last_name, "Katz");
    assert_eq!(first_week[2].mourner_first_name, "David");
    assert_eq!(first_week[2].relationship, "Uncle");

    assert_eq!(report.weeks[1].rows[0].relationship, "none");
    assert_eq!(report.master.len(), 4);

    let mut delivery = CsvDirectoryDelivery::new(DeliveryConfig {
        output_dir: output.path().to_path_buf(),
        ..DeliveryConfig::default()
    });
    deliver(&report, &mut delivery)?;

    let manifest_path = delivery.last_manifest().expect("manifest written").to_path_buf();
    let manifest: DeliveryManifest = serde_json::from_str(&fs::read_to_string(&manifest_path)?)?;
    assert_eq!(manifest.title, "5 May 2025");
    let names: Vec<&str> = manifest.sheets.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Master", "May 03 - May 09", "May 10 - May 16"]);
    assert_eq!(manifest.sheets[0].rows, 4);

    let master_csv = fs::read_to_string(output.path().join("5 May 2025").join("Master.csv"))?;
    let mut lines = master_csv.lines();
    assert!(lines.next().unwrap().starts_with("Day of the Week,Date,Hebrew Day"));
    assert!(lines.next().unwrap().starts_with("Mon,05-May,7,Iyar,Abraham,Cohen"));
    Ok(())
}

#[test]
fn test_folder_with_too_few_exports() -> anyhow::Result<()> {
    let input = tempfile::tempdir()?;
    write_export(input.path(), "may_2025.csv", &[])?;
    write_export(input.path(), "june_2025.csv", &[])?;

    let config = ProcessorConfig {
        csv_folder: input.path().to_path_buf(),
        ..ProcessorConfig::default()
    };
    let err = discover_sources(&config).unwrap_err();
    assert!(matches!(
        err,
        YahrzeitError::NotEnoughSources { found: 2, required: 3, .. }
    ));
    Ok(())
}

#[test]
fn test_missing_folder() {
    let config = ProcessorConfig {
        csv_folder: "/definitely/not/here".into(),
        ..ProcessorConfig::default()
    };
    assert!(matches!(
        discover_sources(&config),
        Err(YahrzeitError::SourceFolderMissing(_))
    ));
}

#[test]
fn test_only_most_recent_exports_are_used() -> anyhow::Result<()> {
    let input = tempfile::tempdir()?;
    let names = [
        ("march_2025.csv", 1_000),
        ("april_2025.csv", 2_000),
        ("may_2025.csv", 3_000),
        ("june_2025.csv", 4_000),
    ];
    for (name, mtime) in names {
        write_export(input.path(), name, &[])?;
        set_mtime(&input.path().join(name), mtime)?;
    }
    fs::write(input.path().join("notes.txt"), "ignored")?;

    let config = ProcessorConfig {
        csv_folder: input.path().to_path_buf(),
        ..ProcessorConfig::default()
    };
    let sources = discover_sources(&config)?;
    let labels: Vec<&str> = sources.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["june_2025.csv", "may_2025.csv", "april_2025.csv"]);

    let target = select_target_month(&sources, today())?;
    assert_eq!(target.month(), 5);
    Ok(())
}

#[test]
fn test_undated_records_survive_only_in_fallback() {
    let sources = vec![SourceTable::new(
        "may_2025.csv",
        vec![
            BTreeMap::from([
                ("Yahrzeit Long Date".to_string(), "sometime".to_string()),
                ("Deceased Last Name".to_string(), "Unknown".to_string()),
            ]),
            BTreeMap::from([
                ("Yahrzeit Long Date".to_string(), "2025-09-01".to_string()),
                ("Deceased Last Name".to_string(), "Later".to_string()),
            ]),
        ],
    )];

    let report = process_sources(&sources, today()).unwrap();
    assert!(report.is_fallback());
    assert_eq!(report.weeks.len(), 1);
    assert_eq!(report.weeks[0].label, FALLBACK_LABEL);
    let names: Vec<&str> = report.master.iter().map(|r| r.deceased_last_name.as_str()).collect();
    assert_eq!(names, vec!["Later", "Unknown"]);
    assert_eq!(report.master[0].date, "01-Sep");
    assert_eq!(report.master[1].date, "");
}
