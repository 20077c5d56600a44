//! Hand-off of finished tables to an output collaborator.
//!
//! The core only produces tables. Remote spreadsheets, authentication and
//! styling are up to whoever implements [`Delivery`].

use crate::config::DeliveryConfig;
use crate::error::{Result, YahrzeitError};
use crate::schema::{Column, LabeledTable, Record, Table};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

pub trait Delivery {
    fn deliver(&mut self, master: &Table, weeks: &[LabeledTable], title: &str) -> Result<()>;
}

/// Header row followed by one row of strings per record.
pub fn value_grid(table: &[Record]) -> Vec<Vec<String>> {
    let mut values = Vec::with_capacity(table.len() + 1);
    values.push(Column::headers().into_iter().map(String::from).collect());
    values.extend(table.iter().map(Record::values));
    values
}

/// Replaces characters that are not safe in file names.
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetEntry {
    pub name: String,
    pub file: String,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryManifest {
    pub title: String,
    pub sheets: Vec<SheetEntry>,
}

/// Writes each table as a CSV file under `<output_dir>/<title>/`, plus a
/// `manifest.json` listing the sheets in order.
pub struct CsvDirectoryDelivery {
    config: DeliveryConfig,
    last_manifest: Option<PathBuf>,
}

impl CsvDirectoryDelivery {
    pub fn new(config: DeliveryConfig) -> Self {
        Self {
            config,
            last_manifest: None,
        }
    }

    pub fn last_manifest(&self) -> Option<&Path> {
        self.last_manifest.as_deref()
    }

    fn write_table(&self, dir: &Path, name: &str, table: &[Record]) -> Result<SheetEntry> {
        let file_name = format!("{}.csv", sanitize_name(name));
        let path = dir.join(&file_name);

        let mut writer = csv::Writer::from_writer(File::create(&path)?);
        for row in value_grid(table) {
            writer.write_record(&row)?;
        }
        writer.flush()?;

        Ok(SheetEntry {
            name: name.to_string(),
            file: file_name,
            rows: table.len(),
        })
    }
}

impl Delivery for CsvDirectoryDelivery {
    fn deliver(&mut self, master: &Table, weeks: &[LabeledTable], title: &str) -> Result<()> {
        // Nothing is written when any sheet would overwrite the master.
        let master_file = sanitize_name(&self.config.master_sheet_name);
        if let Some(week) = weeks.iter().find(|w| {
            w.label == self.config.master_sheet_name || sanitize_name(&w.label) == master_file
        }) {
            return Err(YahrzeitError::DeliveryError(format!(
                "Week label '{}' collides with the master sheet name",
                week.label
            )));
        }

        let dir = self.config.output_dir.join(sanitize_name(title));
        fs::create_dir_all(&dir)?;

        let mut sheets = Vec::with_capacity(weeks.len() + 1);
        sheets.push(self.write_table(&dir, &self.config.master_sheet_name, master)?);
        for week in weeks {
            sheets.push(self.write_table(&dir, &week.label, &week.rows)?);
        }

        let manifest = DeliveryManifest {
            title: title.to_string(),
            sheets,
        };
        let manifest_path = dir.join("manifest.json");
        fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)?;

        info!(
            "Delivered '{}' ({} sheets) to {}",
            title,
            manifest.sheets.len(),
            dir.display()
        );
        self.last_manifest = Some(manifest_path);
        Ok(())
    }
}
