//! # Yahrzeit List Builder
//!
//! A library for turning a handful of monthly yahrzeit exports into weekly
//! memorial lists laid out for printing.
//!
//! ## Core Concepts
//!
//! - **Sources**: monthly CSV exports; the middle month of the set is the target
//! - **Weeks**: Saturday-to-Friday spans covering the target month, including
//!   spillover days from neighbouring months
//! - **Buckets**: the records dated inside each week; weeks without a single
//!   target-month record are dropped
//! - **Cascade**: repeated leading fields are blanked so each date, deceased and
//!   mourner is printed once
//! - **Master**: all weekly tables joined in week order
//!
//! ## Example
//!
//! ```rust,ignore
//! use yahrzeit_list_builder::*;
//!
//! let processor = YahrzeitListProcessor::new(ProcessorConfig::from_env()?);
//! let report = processor.process_folder(chrono::Local::now().date_naive())?;
//!
//! let mut delivery = CsvDirectoryDelivery::new(DeliveryConfig::from_env()?);
//! deliver(&report, &mut delivery)?;
//! ```

pub mod bucketer;
pub mod cascade;
pub mod config;
pub mod dates;
pub mod delivery;
pub mod error;
pub mod ingestion;
pub mod month;
pub mod report;
pub mod schema;
pub mod weeks;

pub use bucketer::{attach_dates, sort_records, Bucket, WeeklyBucketer};
pub use cascade::{apply_cascade, cascaded};
pub use config::{DeliveryConfig, ProcessorConfig};
pub use dates::{format_display_date, parse_date, parse_display_date};
pub use delivery::{value_grid, CsvDirectoryDelivery, Delivery, DeliveryManifest};
pub use error::{Result, YahrzeitError};
pub use ingestion::{discover_sources, merge_sources, normalize_record, SourceTable};
pub use month::{select_target_month, TargetMonth};
pub use report::{assemble_report, ReportWarning, WeeklyReport, FALLBACK_LABEL};
pub use schema::{Column, DatedRecord, LabeledTable, Record, Table};
pub use weeks::{weeks_for_month, Week};

use chrono::NaiveDate;
use log::{debug, info, warn};

pub struct YahrzeitListProcessor {
    config: ProcessorConfig,
}

impl YahrzeitListProcessor {
    pub fn new(config: ProcessorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Runs the whole pipeline over already loaded sources. `today` is the
    /// last-resort month estimate for sources that carry no date hints.
    pub fn process(&self, sources: &[SourceTable], today: NaiveDate) -> Result<WeeklyReport> {
        let records = merge_sources(sources);
        let mut dated = attach_dates(records);

        let target = select_target_month(sources, today)?;

        if dated.is_empty() {
            warn!("No data found in the {} sources", sources.len());
            return Ok(WeeklyReport::empty(target));
        }

        info!("Data loaded successfully: {} records", dated.len());
        let unparsed = dated.iter().filter(|r| r.effective_date.is_none()).count();
        if unparsed > 0 {
            debug!("{} records have an unreadable date and sort last", unparsed);
        }

        sort_records(&mut dated);

        let weeks = weeks_for_month(&target, self.config.week_start);
        debug!("{} weeks cover {}", weeks.len(), target);

        let buckets = WeeklyBucketer::new(target).bucket(&dated, &weeks);
        info!("{} of {} weeks hold records from {}", buckets.len(), weeks.len(), target);

        Ok(assemble_report(target, buckets, &dated))
    }

    /// Discovers the exports in the configured folder, then runs [`Self::process`].
    pub fn process_folder(&self, today: NaiveDate) -> Result<WeeklyReport> {
        self.config.validate()?;
        let sources = discover_sources(&self.config)?;
        self.process(&sources, today)
    }
}

pub fn process_sources(sources: &[SourceTable], today: NaiveDate) -> Result<WeeklyReport> {
    YahrzeitListProcessor::new(ProcessorConfig::default()).process(sources, today)
}

/// Passes the master table, the labelled weeks and the title to `delivery`.
pub fn deliver<D: Delivery>(report: &WeeklyReport, delivery: &mut D) -> Result<()> {
    delivery.deliver(&report.master, &report.weeks, &report.title)
}
