use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The canonical columns of a yahrzeit list, in printed order.
///
/// The order doubles as the grouping hierarchy used by the cascade: a change in
/// an earlier column restarts grouping in every later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    DayOfWeek,
    Date,
    HebrewDay,
    HebrewMonth,
    DeceasedFirstName,
    DeceasedLastName,
    DeceasedHebrewName,
    MournerFirstName,
    MournerLastName,
    Relationship,
    Tribe,
}

impl Column {
    pub const ALL: [Column; 11] = [
        Column::DayOfWeek,
        Column::Date,
        Column::HebrewDay,
        Column::HebrewMonth,
        Column::DeceasedFirstName,
        Column::DeceasedLastName,
        Column::DeceasedHebrewName,
        Column::MournerFirstName,
        Column::MournerLastName,
        Column::Relationship,
        Column::Tribe,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::DayOfWeek => "Day of the Week",
            Column::Date => "Date",
            Column::HebrewDay => "Hebrew Day",
            Column::HebrewMonth => "Hebrew Month",
            Column::DeceasedFirstName => "Deceased First Name",
            Column::DeceasedLastName => "Deceased Last Name",
            Column::DeceasedHebrewName => "Deceased Hebrew Name",
            Column::MournerFirstName => "Mourner First Name",
            Column::MournerLastName => "Mourner Last Name",
            Column::Relationship => "Relationship to mourner",
            Column::Tribe => "Tribe",
        }
    }

    /// Header used by the synagogue-management export for this column.
    pub fn export_header(self) -> &'static str {
        match self {
            Column::DayOfWeek => "Yahrzeit Day of the Week",
            Column::Date => "Yahrzeit Long Date",
            Column::HebrewDay => "Hebrew Day",
            Column::HebrewMonth => "Observance Hebrew Month",
            Column::DeceasedFirstName => "Deceased First Name",
            Column::DeceasedLastName => "Deceased Last Name",
            Column::DeceasedHebrewName => "Deceased Name Hebrew",
            Column::MournerFirstName => "First Name",
            Column::MournerLastName => "Last Name",
            Column::Relationship => "Relationship deceased to mourner",
            Column::Tribe => "Tribe",
        }
    }

    pub fn headers() -> Vec<&'static str> {
        Column::ALL.iter().map(|c| c.header()).collect()
    }
}

/// One deceased/mourner pairing. Every field is always present; unresolved
/// values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Record {
    #[serde(rename = "Day of the Week")]
    pub day_of_week: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Hebrew Day")]
    pub hebrew_day: String,
    #[serde(rename = "Hebrew Month")]
    pub hebrew_month: String,
    #[serde(rename = "Deceased First Name")]
    pub deceased_first_name: String,
    #[serde(rename = "Deceased Last Name")]
    pub deceased_last_name: String,
    #[serde(rename = "Deceased Hebrew Name")]
    pub deceased_hebrew_name: String,
    #[serde(rename = "Mourner First Name")]
    pub mourner_first_name: String,
    #[serde(rename = "Mourner Last Name")]
    pub mourner_last_name: String,
    #[serde(rename = "Relationship to mourner")]
    pub relationship: String,
    #[serde(rename = "Tribe")]
    pub tribe: String,
}

impl Record {
    pub fn get(&self, column: Column) -> &str {
        match column {
            Column::DayOfWeek => &self.day_of_week,
            Column::Date => &self.date,
            Column::HebrewDay => &self.hebrew_day,
            Column::HebrewMonth => &self.hebrew_month,
            Column::DeceasedFirstName => &self.deceased_first_name,
            Column::DeceasedLastName => &self.deceased_last_name,
            Column::DeceasedHebrewName => &self.deceased_hebrew_name,
            Column::MournerFirstName => &self.mourner_first_name,
            Column::MournerLastName => &self.mourner_last_name,
            Column::Relationship => &self.relationship,
            Column::Tribe => &self.tribe,
        }
    }

    pub fn get_mut(&mut self, column: Column) -> &mut String {
        match column {
            Column::DayOfWeek => &mut self.day_of_week,
            Column::Date => &mut self.date,
            Column::HebrewDay => &mut self.hebrew_day,
            Column::HebrewMonth => &mut self.hebrew_month,
            Column::DeceasedFirstName => &mut self.deceased_first_name,
            Column::DeceasedLastName => &mut self.deceased_last_name,
            Column::DeceasedHebrewName => &mut self.deceased_hebrew_name,
            Column::MournerFirstName => &mut self.mourner_first_name,
            Column::MournerLastName => &mut self.mourner_last_name,
            Column::Relationship => &mut self.relationship,
            Column::Tribe => &mut self.tribe,
        }
    }

    pub fn values(&self) -> Vec<String> {
        Column::ALL.iter().map(|&c| self.get(c).to_string()).collect()
    }
}

/// A record carrying its parsed date while it moves through sorting and
/// bucketing. Only the inner [`Record`] ever reaches an output table.
#[derive(Debug, Clone, PartialEq)]
pub struct DatedRecord {
    pub record: Record,
    pub effective_date: Option<NaiveDate>,
}

impl DatedRecord {
    pub fn into_record(self) -> Record {
        self.record
    }
}

pub type Table = Vec<Record>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledTable {
    pub label: String,
    pub rows: Table,
}
