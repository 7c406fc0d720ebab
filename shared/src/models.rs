use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::utils::{brazilian_format, standard_format};

/// One row of the sales CSV.
///
/// The core fields hold the text exactly as read from the file. Typed values
/// (quantity, unit price, date) are derived when a view needs them, so a
/// malformed field only fails the computations that touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub product: String,
    pub quantity: String,
    pub unit_price: String,
    pub date: String,
    /// Columns other than the core four, keyed by header name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl SaleRecord {
    pub fn new(
        product: impl Into<String>,
        quantity: impl Into<String>,
        unit_price: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            product: product.into(),
            quantity: quantity.into(),
            unit_price: unit_price.into(),
            date: date.into(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_extra(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(column.into(), value.into());
        self
    }
}

/// Header names of the four columns every sales file must carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub product: String,
    pub quantity: String,
    pub unit_price: String,
    pub date: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            product: "Produto".to_string(),
            quantity: "Quantidade".to_string(),
            unit_price: "Preço Unitário".to_string(),
            date: "Data".to_string(),
        }
    }
}

impl ColumnNames {
    pub fn as_array(&self) -> [&str; 4] {
        [&self.product, &self.quantity, &self.unit_price, &self.date]
    }

    pub fn is_core(&self, header: &str) -> bool {
        self.as_array().contains(&header)
    }
}

/// A loaded sales file: records in file order plus the header layout needed
/// to render or write them back.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesDataset {
    pub columns: ColumnNames,
    /// Passthrough column names, in file order.
    pub extra_headers: Vec<String>,
    pub records: Vec<SaleRecord>,
}

impl SalesDataset {
    pub fn new(columns: ColumnNames, extra_headers: Vec<String>, records: Vec<SaleRecord>) -> Self {
        Self { columns, extra_headers, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Core columns first, then passthrough columns.
    pub fn headers(&self) -> Vec<String> {
        self.columns
            .as_array()
            .iter()
            .map(|h| h.to_string())
            .chain(self.extra_headers.iter().cloned())
            .collect()
    }

    /// Field values of `record` in the order of [`SalesDataset::headers`].
    /// Passthrough columns missing from the record render as empty strings.
    pub fn row(&self, record: &SaleRecord) -> Vec<String> {
        let mut values = vec![
            record.product.clone(),
            record.quantity.clone(),
            record.unit_price.clone(),
            record.date.clone(),
        ];
        values.extend(
            self.extra_headers
                .iter()
                .map(|h| record.extra.get(h).cloned().unwrap_or_default()),
        );
        values
    }
}

/// Inclusive calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// How numbers are written in the CSV and in reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberFormat {
    /// `1234.56`
    #[default]
    Standard,
    /// `1.234,56`
    Brazilian,
}

impl NumberFormat {
    pub fn parse_decimal(self, s: &str) -> anyhow::Result<f64> {
        match self {
            NumberFormat::Standard => standard_format::parse_decimal(s),
            NumberFormat::Brazilian => brazilian_format::parse_decimal(s),
        }
    }

    pub fn parse_integer(self, s: &str) -> anyhow::Result<i64> {
        match self {
            NumberFormat::Standard => standard_format::parse_integer(s),
            NumberFormat::Brazilian => brazilian_format::parse_integer(s),
        }
    }

    pub fn format_decimal(self, value: f64, decimals: usize) -> String {
        match self {
            NumberFormat::Standard => standard_format::format_decimal(value, decimals),
            NumberFormat::Brazilian => brazilian_format::format_decimal(value, decimals),
        }
    }
}

impl fmt::Display for NumberFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberFormat::Standard => write!(f, "standard"),
            NumberFormat::Brazilian => write!(f, "brazilian"),
        }
    }
}

impl FromStr for NumberFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(NumberFormat::Standard),
            "brazilian" | "br" | "pt-br" => Ok(NumberFormat::Brazilian),
            other => Err(format!(
                "unknown number format '{}' (expected 'standard' or 'brazilian')",
                other
            )),
        }
    }
}
