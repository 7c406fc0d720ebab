//! Derived views over sales records: totals, per-product aggregation and filters.
//!
//! Every operation is pure given its inputs. Records are validated lazily: a
//! view fails with [`ValidationError`] on the first record it cannot compute,
//! and never returns a partial result.

use chrono::NaiveDate;
use shared::models::{DateRange, NumberFormat, SaleRecord};
use std::collections::BTreeMap;

use crate::config::DataSettings;
use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq)]
pub struct SalesTransformer {
    number_format: NumberFormat,
    date_format: String,
}

impl Default for SalesTransformer {
    fn default() -> Self {
        Self::new(NumberFormat::Standard, "%Y-%m-%d")
    }
}

impl SalesTransformer {
    pub fn new(number_format: NumberFormat, date_format: impl Into<String>) -> Self {
        Self {
            number_format,
            date_format: date_format.into(),
        }
    }

    pub fn from_settings(settings: &DataSettings) -> Self {
        Self::new(settings.number_format, settings.date_format.clone())
    }

    pub fn number_format(&self) -> NumberFormat {
        self.number_format
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    pub fn parse_quantity(&self, record: &SaleRecord) -> Result<u64, ValidationError> {
        let invalid = |reason: String| ValidationError::InvalidQuantity {
            product: record.product.clone(),
            value: record.quantity.clone(),
            reason,
        };
        let quantity = self
            .number_format
            .parse_integer(&record.quantity)
            .map_err(|e| invalid(e.to_string()))?;
        u64::try_from(quantity).map_err(|_| invalid("quantity must not be negative".to_string()))
    }

    pub fn parse_unit_price(&self, record: &SaleRecord) -> Result<f64, ValidationError> {
        let invalid = |reason: String| ValidationError::InvalidUnitPrice {
            product: record.product.clone(),
            value: record.unit_price.clone(),
            reason,
        };
        let price = self
            .number_format
            .parse_decimal(&record.unit_price)
            .map_err(|e| invalid(e.to_string()))?;
        if !price.is_finite() {
            return Err(invalid("unit price must be a finite number".to_string()));
        }
        if price < 0.0 {
            return Err(invalid("unit price must not be negative".to_string()));
        }
        Ok(price)
    }

    pub fn parse_date(&self, value: &str) -> Result<NaiveDate, ValidationError> {
        NaiveDate::parse_from_str(value.trim(), &self.date_format).map_err(|e| {
            ValidationError::InvalidDate {
                value: value.to_string(),
                format: self.date_format.clone(),
                reason: e.to_string(),
            }
        })
    }

    /// `quantity * unit_price` for a single record.
    pub fn total_of(&self, record: &SaleRecord) -> Result<f64, ValidationError> {
        let quantity = self.parse_quantity(record)?;
        let unit_price = self.parse_unit_price(record)?;
        let total = quantity as f64 * unit_price;
        if !total.is_finite() {
            return Err(ValidationError::InvalidTotal {
                product: record.product.clone(),
                quantity,
                unit_price,
            });
        }
        Ok(total)
    }

    /// Sum of [`SalesTransformer::total_of`] over all records; 0 for no records.
    pub fn grand_total(&self, records: &[SaleRecord]) -> Result<f64, ValidationError> {
        let total = records.iter().map(|r| self.total_of(r)).sum::<Result<f64, _>>()?;
        tracing::debug!(records = records.len(), total, "Computed grand total");
        Ok(total)
    }

    /// Records whose total is strictly greater than `threshold`, in input order.
    pub fn above_threshold<'a>(
        &self,
        records: &'a [SaleRecord],
        threshold: f64,
    ) -> Result<Vec<&'a SaleRecord>, ValidationError> {
        if !threshold.is_finite() {
            return Err(ValidationError::InvalidThreshold(threshold));
        }
        let mut selected = Vec::new();
        for record in records {
            if self.total_of(record)? > threshold {
                selected.push(record);
            }
        }
        tracing::debug!(threshold, matched = selected.len(), of = records.len(), "Applied threshold filter");
        Ok(selected)
    }

    /// Number of records per product.
    pub fn count_by_product(&self, records: &[SaleRecord]) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in records {
            *counts.entry(record.product.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Sum of record totals per product.
    pub fn total_by_product(&self, records: &[SaleRecord]) -> Result<BTreeMap<String, f64>, ValidationError> {
        let mut totals = BTreeMap::new();
        for record in records {
            let total = self.total_of(record)?;
            *totals.entry(record.product.clone()).or_insert(0.0) += total;
        }
        Ok(totals)
    }

    /// Records dated within `[start, end]`, both bounds given in the configured date format.
    pub fn in_date_range<'a>(
        &self,
        records: &'a [SaleRecord],
        start: &str,
        end: &str,
    ) -> Result<Vec<&'a SaleRecord>, ValidationError> {
        let range = self.date_range(start, end)?;
        self.between_dates(records, range)
    }

    /// Parses and checks a pair of bounds.
    pub fn date_range(&self, start: &str, end: &str) -> Result<DateRange, ValidationError> {
        let start = self.parse_date(start)?;
        let end = self.parse_date(end)?;
        if start > end {
            return Err(ValidationError::InvertedRange { start, end });
        }
        Ok(DateRange { start, end })
    }

    pub fn between_dates<'a>(
        &self,
        records: &'a [SaleRecord],
        range: DateRange,
    ) -> Result<Vec<&'a SaleRecord>, ValidationError> {
        if range.start > range.end {
            return Err(ValidationError::InvertedRange {
                start: range.start,
                end: range.end,
            });
        }
        let mut selected = Vec::new();
        for record in records {
            if range.contains(self.parse_date(&record.date)?) {
                selected.push(record);
            }
        }
        tracing::debug!(start = %range.start, end = %range.end, matched = selected.len(), "Applied date filter");
        Ok(selected)
    }
}
