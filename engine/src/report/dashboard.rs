//! Console renderings of sales views.
//!
//! [`ReportRenderer::render_summary`] prints the batch report (grand total,
//! sales above a limit, count per product, sales in a date range) and
//! [`ReportRenderer::render_dashboard`] lays the same data out as a text
//! dashboard with a preview of the file and a bar chart of totals per product.

use shared::models::{SaleRecord, SalesDataset};
use shared::utils::format_currency;
use std::collections::BTreeMap;

use super::chart::BarChart;
use super::table::render_table;
use crate::config::ReportSettings;
use crate::error::ValidationError;
use crate::services::{SalesOverview, SalesTransformer};

const TOTAL_HEADER: &str = "Total";

pub struct ReportRenderer<'a> {
    settings: &'a ReportSettings,
    transformer: &'a SalesTransformer,
}

impl<'a> ReportRenderer<'a> {
    pub fn new(settings: &'a ReportSettings, transformer: &'a SalesTransformer) -> Self {
        Self { settings, transformer }
    }

    pub fn money(&self, value: f64) -> String {
        format_currency(&self.settings.currency_symbol, value, self.transformer.number_format())
    }

    /// Rows in file layout, optionally followed by their computed total.
    pub fn records_table(
        &self,
        dataset: &SalesDataset,
        records: &[&SaleRecord],
        with_total: bool,
    ) -> Result<String, ValidationError> {
        let mut headers = dataset.headers();
        if with_total {
            headers.push(TOTAL_HEADER.to_string());
        }

        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let mut row = dataset.row(record);
            if with_total {
                let total = self.transformer.total_of(record)?;
                row.push(self.transformer.number_format().format_decimal(total, 2));
            }
            rows.push(row);
        }

        let right_aligned: &[usize] = if with_total { &[headers.len() - 1] } else { &[] };
        Ok(render_table(&headers, &rows, right_aligned))
    }

    pub fn render_records(
        &self,
        dataset: &SalesDataset,
        records: &[&SaleRecord],
        with_total: bool,
    ) -> Result<String, ValidationError> {
        if records.is_empty() {
            return Ok("(no records)\n".to_string());
        }
        self.records_table(dataset, records, with_total)
    }

    pub fn render_counts(&self, counts: &BTreeMap<String, usize>) -> String {
        counts
            .iter()
            .map(|(product, count)| format!("{}: {}\n", product, count))
            .collect()
    }

    pub fn render_product_totals(&self, totals: &BTreeMap<String, f64>) -> String {
        if totals.is_empty() {
            return "(no records)\n".to_string();
        }
        let headers = vec!["Product".to_string(), TOTAL_HEADER.to_string()];
        let rows: Vec<Vec<String>> = totals
            .iter()
            .map(|(product, total)| vec![product.clone(), self.money(*total)])
            .collect();
        render_table(&headers, &rows, &[1])
    }

    /// Batch report: grand total, sales above the threshold, count per
    /// product and, when the overview carries one, sales in the date range.
    pub fn render_summary(&self, dataset: &SalesDataset, overview: &SalesOverview) -> Result<String, ValidationError> {
        let mut out = String::new();
        out.push_str(&format!("Total of all sales: {}\n", self.money(overview.grand_total)));

        out.push_str(&format!("\nSales above {}:\n", self.money(overview.threshold)));
        out.push_str(&self.render_records(dataset, &overview.above_threshold, true)?);

        out.push_str("\nSales count by product:\n");
        out.push_str(&self.render_counts(&overview.count_by_product));

        if let (Some(range), Some(records)) = (&overview.date_range, &overview.in_date_range) {
            out.push_str(&format!(
                "\nSales between {} and {}:\n",
                range.start.format(self.transformer.date_format()),
                range.end.format(self.transformer.date_format())
            ));
            out.push_str(&self.render_records(dataset, records, false)?);
        }
        Ok(out)
    }

    pub fn render_dashboard(&self, dataset: &SalesDataset, overview: &SalesOverview) -> Result<String, ValidationError> {
        let mut out = String::new();
        let rule = "=".repeat(self.settings.title.chars().count().max(20));
        out.push_str(&format!("{}\n{}\n{}\n", rule, self.settings.title, rule));

        out.push_str(&format!(
            "\nFirst rows of the CSV file ({} of {}):\n",
            dataset.len().min(self.settings.preview_rows),
            dataset.len()
        ));
        let preview: Vec<&SaleRecord> = dataset.records.iter().take(self.settings.preview_rows).collect();
        out.push_str(&self.render_records(dataset, &preview, false)?);

        out.push_str(&format!("\nTotal sales: {}\n", self.money(overview.grand_total)));

        let entries: Vec<(String, f64)> = overview
            .total_by_product
            .iter()
            .map(|(product, total)| (product.clone(), *total))
            .collect();
        let chart = BarChart::new("Total Sales by Product", self.settings.chart_width);
        out.push('\n');
        out.push_str(&chart.render(&entries, &self.settings.currency_symbol, self.transformer.number_format()));

        out.push_str(&format!("\nSales above {}:\n", self.money(overview.threshold)));
        out.push_str(&self.render_records(dataset, &overview.above_threshold, true)?);

        out.push_str("\nTotal sales by product:\n");
        out.push_str(&self.render_product_totals(&overview.total_by_product));
        Ok(out)
    }
}
