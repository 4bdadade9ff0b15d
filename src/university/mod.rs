pub mod filter;
pub mod normalize;
pub mod source;
pub mod stats;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::university::normalize::{normalize_currency, normalize_percent};
use crate::university::source::{RawUniversityRow, UniversitySource};

pub use filter::{unique_categories, unique_programs, RecordFilter};
pub use source::{BuiltinSource, CsvFileSource};
pub use stats::ApplicationStats;

pub const BASE_COLUMNS: [&str; 9] = [
    "University",
    "Category",
    "Program",
    "Deadlines",
    "Application_Fee",
    "Requirements",
    "Expected_Qualities",
    "Apply_Link",
    "Program_Fee",
];

pub const EXTENDED_COLUMNS: [&str; 7] = [
    "Tuition_Per_Year",
    "Living_Costs_Yearly",
    "Total_Cost_2Years",
    "Avg_Starting_Salary",
    "ROI_5Year",
    "Acceptance_Rate",
    "Placement_Rate",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    #[serde(rename = "Self Apply")]
    SelfApply,
    #[serde(rename = "IDP Consultancy")]
    IdpConsultancy,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::SelfApply, Category::IdpConsultancy];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::SelfApply => "self-apply",
            Self::IdpConsultancy => "idp",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::SelfApply => "Self Apply",
            Self::IdpConsultancy => "IDP Consultancy",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown application category: {0}")]
pub struct CategoryParseError(pub String);

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "self apply" | "selfapply" | "self" => Ok(Self::SelfApply),
            "idp consultancy" | "idp" | "consultancy" => Ok(Self::IdpConsultancy),
            _ => Err(CategoryParseError(s.to_string())),
        }
    }
}

/// One university row after normalization. Monetary cells hold `"$48,000"`
/// style text and percentage cells always end in `%`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UniversityRecord {
    #[serde(rename = "University")]
    pub university: String,
    #[serde(rename = "Category")]
    pub category: Category,
    #[serde(rename = "Program")]
    pub program: String,
    #[serde(rename = "Deadlines")]
    pub deadlines: String,
    #[serde(rename = "Application_Fee")]
    pub application_fee: String,
    #[serde(rename = "Requirements")]
    pub requirements: String,
    #[serde(rename = "Expected_Qualities")]
    pub expected_qualities: String,
    #[serde(rename = "Apply_Link")]
    pub apply_link: String,
    #[serde(rename = "Program_Fee")]
    pub program_fee: String,
    #[serde(rename = "Tuition_Per_Year", skip_serializing_if = "Option::is_none", default)]
    pub tuition_per_year: Option<String>,
    #[serde(rename = "Living_Costs_Yearly", skip_serializing_if = "Option::is_none", default)]
    pub living_costs_yearly: Option<String>,
    #[serde(rename = "Total_Cost_2Years", skip_serializing_if = "Option::is_none", default)]
    pub total_cost_2years: Option<String>,
    #[serde(rename = "Avg_Starting_Salary", skip_serializing_if = "Option::is_none", default)]
    pub avg_starting_salary: Option<String>,
    #[serde(rename = "ROI_5Year", skip_serializing_if = "Option::is_none", default)]
    pub roi_5year: Option<String>,
    #[serde(rename = "Acceptance_Rate", skip_serializing_if = "Option::is_none", default)]
    pub acceptance_rate: Option<String>,
    #[serde(rename = "Placement_Rate", skip_serializing_if = "Option::is_none", default)]
    pub placement_rate: Option<String>,
}

impl UniversityRecord {
    /// Cells in [`BASE_COLUMNS`] order.
    pub fn base_values(&self) -> [String; 9] {
        [
            self.university.clone(),
            self.category.to_string(),
            self.program.clone(),
            self.deadlines.clone(),
            self.application_fee.clone(),
            self.requirements.clone(),
            self.expected_qualities.clone(),
            self.apply_link.clone(),
            self.program_fee.clone(),
        ]
    }

    /// Cells in [`EXTENDED_COLUMNS`] order.
    pub fn extended_values(&self) -> [Option<&str>; 7] {
        [
            self.tuition_per_year.as_deref(),
            self.living_costs_yearly.as_deref(),
            self.total_cost_2years.as_deref(),
            self.avg_starting_salary.as_deref(),
            self.roi_5year.as_deref(),
            self.acceptance_rate.as_deref(),
            self.placement_rate.as_deref(),
        ]
    }

    pub fn has_extended_columns(&self) -> bool {
        self.extended_values().iter().any(Option::is_some)
    }
}

#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("failed reading university data from {origin}: {source}")]
    Source {
        origin: String,
        #[source]
        source: csv::Error,
    },
    #[error("row {row}: {source}")]
    InvalidCategory {
        row: usize,
        #[source]
        source: CategoryParseError,
    },
    #[error("row {row}: {column} is not a monetary amount: {value:?}")]
    InvalidCurrency {
        row: usize,
        column: &'static str,
        value: String,
    },
}

/// Reads every row from `source` and normalizes it. A single bad cell fails
/// the whole load so the table is never partially populated.
pub fn load_universities(
    source: &dyn UniversitySource,
) -> Result<Vec<UniversityRecord>, DataLoadError> {
    let rows = source.rows()?;
    let mut records = Vec::with_capacity(rows.len());
    for (idx, raw) in rows.into_iter().enumerate() {
        records.push(normalize_row(idx + 1, raw)?);
    }
    info!(
        "loaded {} university records from {}",
        records.len(),
        source.describe()
    );
    Ok(records)
}

fn normalize_row(row: usize, raw: RawUniversityRow) -> Result<UniversityRecord, DataLoadError> {
    let currency = |column: &'static str, value: String| {
        normalize_currency(&value).map_err(|_| DataLoadError::InvalidCurrency { row, column, value })
    };
    let optional_currency = |column: &'static str, value: Option<String>| {
        present(value).map(|v| currency(column, v)).transpose()
    };
    let optional_percent = |value: Option<String>| present(value).map(|v| normalize_percent(&v));

    let category = raw
        .category
        .parse::<Category>()
        .map_err(|source| DataLoadError::InvalidCategory { row, source })?;
    debug!("normalizing row {row}: {}", raw.university);

    Ok(UniversityRecord {
        category,
        application_fee: currency("Application_Fee", raw.application_fee)?,
        program_fee: currency("Program_Fee", raw.program_fee)?,
        tuition_per_year: optional_currency("Tuition_Per_Year", raw.tuition_per_year)?,
        living_costs_yearly: optional_currency("Living_Costs_Yearly", raw.living_costs_yearly)?,
        total_cost_2years: optional_currency("Total_Cost_2Years", raw.total_cost_2years)?,
        avg_starting_salary: optional_currency("Avg_Starting_Salary", raw.avg_starting_salary)?,
        roi_5year: optional_percent(raw.roi_5year),
        acceptance_rate: optional_percent(raw.acceptance_rate),
        placement_rate: optional_percent(raw.placement_rate),
        university: raw.university,
        program: raw.program,
        deadlines: raw.deadlines,
        requirements: raw.requirements,
        expected_qualities: raw.expected_qualities,
        apply_link: raw.apply_link,
    })
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
