// All views of one sales file computed together, for the summary report, the dashboard and --json
use serde::Serialize;
use shared::models::{DateRange, SaleRecord};
use std::collections::BTreeMap;

use super::transformer::SalesTransformer;
use crate::error::ValidationError;

#[derive(Debug, Clone, Serialize)]
pub struct SalesOverview<'a> {
    pub records: usize,
    pub grand_total: f64,
    pub threshold: f64,
    pub above_threshold: Vec<&'a SaleRecord>,
    pub count_by_product: BTreeMap<String, usize>,
    pub total_by_product: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_date_range: Option<Vec<&'a SaleRecord>>,
}

impl<'a> SalesOverview<'a> {
    pub fn compute(
        transformer: &SalesTransformer,
        records: &'a [SaleRecord],
        threshold: f64,
        date_range: Option<DateRange>,
    ) -> Result<Self, ValidationError> {
        let in_date_range = date_range
            .map(|range| transformer.between_dates(records, range))
            .transpose()?;

        Ok(SalesOverview {
            records: records.len(),
            grand_total: transformer.grand_total(records)?,
            threshold,
            above_threshold: transformer.above_threshold(records, threshold)?,
            count_by_product: transformer.count_by_product(records),
            total_by_product: transformer.total_by_product(records)?,
            date_range,
            in_date_range,
        })
    }
}
