use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::core::{AppError, Result};

/// Display vocabulary of a report type: transaction-flavoured types speak
/// "Transaction"/"TPS", request-flavoured types speak "Request"/"RPS" in
/// every column header and narrative sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vocabulary {
    Transaction,
    Request,
}

impl Vocabulary {
    pub fn noun(&self) -> &'static str {
        match self {
            Vocabulary::Transaction => "Transaction",
            Vocabulary::Request => "Request",
        }
    }

    pub fn noun_lower(&self) -> &'static str {
        match self {
            Vocabulary::Transaction => "transaction",
            Vocabulary::Request => "request",
        }
    }

    pub fn rate(&self) -> &'static str {
        match self {
            Vocabulary::Transaction => "TPS",
            Vocabulary::Request => "RPS",
        }
    }
}

/// Maps logical aggregation roles to concrete record field names
#[derive(Debug, Clone, Deserialize)]
pub struct FieldMapping {
    /// Event timestamp field, also the pagination cursor
    #[serde(default = "default_timestamp_field")]
    pub timestamp: String,

    /// Field the per-day maximum and 95th percentile are computed from
    pub max: String,

    /// Field the per-day mean is computed from
    pub avg: String,

    /// Field the per-day and per-month totals are summed from
    pub total: String,

    /// Field the nominal (debit-equivalent) sums are computed from,
    /// for types that report nominal amounts
    #[serde(default)]
    pub total_debit: Option<String>,

    /// Sub-population tag field (e.g. internal/external),
    /// required for types with split reporting
    #[serde(default)]
    pub sub_type: Option<String>,
}

fn default_timestamp_field() -> String {
    "@timestamp".to_string()
}

/// Per-type report descriptor: search target, field mapping, grouping
/// policy and presentation vocabulary. Loaded once at startup; every
/// downstream component consumes this instead of branching on type names.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportTypeConfig {
    /// Type identifier used in user selections and file names
    pub name: String,

    /// Search index (or index pattern) holding this type's records
    pub index: String,

    pub vocabulary: Vocabulary,

    /// Partition day/month rollups by the sub-type tag and render one
    /// table/summary pair per sub-population
    #[serde(default)]
    pub split_sub_types: bool,

    pub fields: FieldMapping,

    /// Page size for the cursor-paginated fetch
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Cap on chart rows (days) per comparison chart
    #[serde(default = "default_chart_days")]
    pub chart_days: usize,

    /// Base query document; the builder fills in `size` and the
    /// timestamp range filter
    pub query: Value,
}

fn default_page_size() -> usize {
    10_000
}

fn default_chart_days() -> usize {
    20
}

impl ReportTypeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::configuration("report type name must not be empty"));
        }
        if self.index.trim().is_empty() {
            return Err(AppError::configuration(format!(
                "report type `{}` has an empty index",
                self.name
            )));
        }
        if self.page_size == 0 {
            return Err(AppError::configuration(format!(
                "report type `{}` has page_size 0",
                self.name
            )));
        }
        if self.chart_days == 0 || self.chart_days > 31 {
            return Err(AppError::configuration(format!(
                "report type `{}` has chart_days outside 1..=31",
                self.name
            )));
        }
        if self.split_sub_types && self.fields.sub_type.is_none() {
            return Err(AppError::configuration(format!(
                "report type `{}` splits sub-types but maps no sub_type field",
                self.name
            )));
        }
        // Surface malformed query templates at startup rather than on the
        // first user request.
        crate::modules::search::query::build_query(
            &self.query,
            self.page_size,
            &self.fields.timestamp,
            "1970-01-01T00:00:00+07:00",
            "1970-01-02T00:00:00+07:00",
            crate::modules::search::query::LowerBound::Inclusive,
        )?;
        Ok(())
    }
}

/// Read-only registry of configured report types, keyed by name
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: HashMap<String, ReportTypeConfig>,
}

impl TypeRegistry {
    pub fn new(types: Vec<ReportTypeConfig>) -> Result<Self> {
        if types.is_empty() {
            return Err(AppError::configuration("no report types configured"));
        }
        let mut map = HashMap::with_capacity(types.len());
        for report_type in types {
            report_type.validate()?;
            if map.insert(report_type.name.clone(), report_type).is_some() {
                return Err(AppError::configuration("duplicate report type name"));
            }
        }
        Ok(Self { types: map })
    }

    pub fn get(&self, name: &str) -> Option<&ReportTypeConfig> {
        self.types.get(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Configured type names, sorted for stable display
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
