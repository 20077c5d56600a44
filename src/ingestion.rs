use crate::config::ProcessorConfig;
use crate::error::{Result, YahrzeitError};
use crate::schema::{Column, Record};
use glob::glob;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Relationship value that is left exactly as exported.
pub const NO_RELATIONSHIP: &str = "none";

/// One input export: its identifying label and its rows keyed by raw header.
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    pub label: String,
    pub modified: Option<SystemTime>,
    pub rows: Vec<BTreeMap<String, String>>,
}

impl SourceTable {
    pub fn new(label: impl Into<String>, rows: Vec<BTreeMap<String, String>>) -> Self {
        Self {
            label: label.into(),
            modified: None,
            rows,
        }
    }

    pub fn from_reader<R: Read>(label: impl Into<String>, reader: R) -> Result<Self> {
        let label = label.into();
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result.map_err(|e| YahrzeitError::SourceRead {
                label: label.clone(),
                details: e.to_string(),
            })?;
            let row: BTreeMap<String, String> = headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.clone(), v.to_string()))
                .collect();
            rows.push(row);
        }

        debug!("Read {} rows from '{}'", rows.len(), label);
        Ok(Self {
            label,
            modified: None,
            rows,
        })
    }

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let label = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| YahrzeitError::SourceRead {
                label: path.display().to_string(),
                details: "Invalid file name".to_string(),
            })?
            .to_string();

        let modified = fs::metadata(path)?.modified().ok();
        let file = File::open(path)?;
        let mut table = Self::from_reader(label, file)?;
        table.modified = modified;
        Ok(table)
    }

    /// Date label of the first data row, under either the export or the
    /// canonical header.
    pub fn first_date_label(&self) -> Option<&str> {
        let row = self.rows.first()?;
        raw_value(row, Column::Date)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

fn raw_value(row: &BTreeMap<String, String>, column: Column) -> Option<&str> {
    row.get(column.export_header())
        .or_else(|| row.get(column.header()))
        .map(String::as_str)
}

/// Finds the CSV exports in the configured folder.
///
/// Fewer than `min_sources` files is an error. When there are more than
/// `max_sources`, only the most recently modified ones are kept, newest first.
pub fn discover_sources(config: &ProcessorConfig) -> Result<Vec<SourceTable>> {
    let folder = &config.csv_folder;
    if !folder.is_dir() {
        return Err(YahrzeitError::SourceFolderMissing(folder.clone()));
    }

    info!("Scanning for CSV files in '{}'", folder.display());
    let pattern = format!("{}/*.csv", folder.display());
    let mut paths: Vec<PathBuf> = glob(&pattern)?.filter_map(|p| p.ok()).collect();

    if paths.len() < config.min_sources {
        return Err(YahrzeitError::NotEnoughSources {
            found: paths.len(),
            required: config.min_sources,
            folder: folder.clone(),
        });
    }

    if paths.len() > config.max_sources {
        warn!(
            "Found {} CSV files - using the {} most recent",
            paths.len(),
            config.max_sources
        );
        let mut stamped: Vec<(SystemTime, PathBuf)> = paths
            .into_iter()
            .map(|p| {
                let modified = fs::metadata(&p)
                    .and_then(|m| m.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                (modified, p)
            })
            .collect();
        stamped.sort_by(|a, b| b.0.cmp(&a.0));
        stamped.truncate(config.max_sources);
        paths = stamped.into_iter().map(|(_, p)| p).collect();
    }

    let sources = paths
        .iter()
        .map(|p| SourceTable::from_csv_path(p))
        .collect::<Result<Vec<_>>>()?;

    info!(
        "Selected files: {}",
        sources
            .iter()
            .map(|s| s.label.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(sources)
}

/// Maps a raw row onto the canonical schema. Absent fields become empty.
pub fn map_row(row: &BTreeMap<String, String>) -> Record {
    let mut record = Record::default();
    for column in Column::ALL {
        if let Some(value) = raw_value(row, column) {
            *record.get_mut(column) = value.to_string();
        }
    }
    record
}

/// Concatenates every source's rows in order and normalizes them.
pub fn merge_sources(sources: &[SourceTable]) -> Vec<Record> {
    let records: Vec<Record> = sources
        .iter()
        .flat_map(|s| s.rows.iter())
        .map(|row| {
            let mut record = map_row(row);
            normalize_record(&mut record);
            record
        })
        .collect();

    debug!(
        "Merged {} records from {} sources",
        records.len(),
        sources.len()
    );
    records
}

/// Replaces each run of line breaks with a single space and trims the ends.
pub fn clean_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_break = false;
    for ch in value.chars() {
        if ch == '\n' || ch == '\r' {
            if !in_break {
                out.push(' ');
            }
            in_break = true;
        } else {
            out.push(ch);
            in_break = false;
        }
    }
    out.trim().to_string()
}

/// Upper-cases the first character and lower-cases the rest. A first
/// character whose upper-case form is more than one character (`ß`) is kept
/// as is, so capitalizing twice changes nothing.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    let mut upper = first.to_uppercase();
    let head = match (upper.next(), upper.next()) {
        (Some(single), None) => single,
        _ => first,
    };

    std::iter::once(head)
        .chain(chars.flat_map(|c| c.to_lowercase()))
        .collect()
}

pub fn normalize_record(record: &mut Record) {
    for column in Column::ALL {
        let field = record.get_mut(column);
        *field = clean_text(field);
    }

    if !record.relationship.eq_ignore_ascii_case(NO_RELATIONSHIP) {
        record.relationship = capitalize(&record.relationship);
    }

    record.day_of_week = record.day_of_week.chars().take(3).collect();
}
