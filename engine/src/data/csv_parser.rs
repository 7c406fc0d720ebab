use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use shared::models::{SaleRecord, SalesDataset};
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::config::DataSettings;
use crate::error::EngineError;

pub struct SalesCsvParser;

impl SalesCsvParser {
    // CSV Header: Produto,Quantidade,Preço Unitário,Data[,extra columns...]
    // Example Row: Notebook,2,3500.00,2023-03-10
    pub fn load_sales_from_csv(file_path: impl AsRef<Path>, settings: &DataSettings) -> Result<SalesDataset, EngineError> {
        let file_path = file_path.as_ref();
        let file = File::open(file_path)?;
        let dataset = Self::load_sales_from_reader(BufReader::new(file), settings)?;
        tracing::info!(
            path = %file_path.display(),
            records = dataset.len(),
            extra_columns = dataset.extra_headers.len(),
            "Loaded sales CSV"
        );
        Ok(dataset)
    }

    /// Reads the sales rows as text. Numbers and dates are not checked here;
    /// the transformer validates them when a view needs them.
    pub fn load_sales_from_reader<R: Read>(reader: R, settings: &DataSettings) -> Result<SalesDataset, EngineError> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(settings.delimiter_byte()?)
            .has_headers(true)
            .from_reader(reader);

        let headers: StringRecord = rdr
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim())
            .collect();
        if headers.is_empty() || headers.iter().all(str::is_empty) {
            return Err(EngineError::CsvDataFormatError("CSV file has no header row".to_string()));
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = headers.iter().find(|h| !seen.insert(*h)) {
            return Err(EngineError::CsvDataFormatError(format!(
                "Duplicate '{}' column in CSV header",
                duplicate
            )));
        }

        let columns = &settings.columns;
        let product_idx = Self::column_index(&headers, &columns.product)?;
        let quantity_idx = Self::column_index(&headers, &columns.quantity)?;
        let unit_price_idx = Self::column_index(&headers, &columns.unit_price)?;
        let date_idx = Self::column_index(&headers, &columns.date)?;

        let extra_columns: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !columns.is_core(h))
            .map(|(i, h)| (i, h.to_string()))
            .collect();

        let mut records = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let line = idx + 2;
            let record = result?;
            if record.iter().all(|field| field.trim().is_empty()) {
                tracing::debug!(line, "Skipping blank CSV row");
                continue;
            }

            let field = |pos: usize| record.get(pos).unwrap_or_default().to_string();
            let extra: BTreeMap<String, String> = extra_columns
                .iter()
                .map(|(pos, name)| (name.clone(), field(*pos)))
                .collect();

            records.push(SaleRecord {
                product: field(product_idx),
                quantity: field(quantity_idx),
                unit_price: field(unit_price_idx),
                date: field(date_idx),
                extra,
            });
        }

        let extra_headers = extra_columns.into_iter().map(|(_, name)| name).collect();
        Ok(SalesDataset::new(columns.clone(), extra_headers, records))
    }

    /// Writes `records` as CSV in the dataset's header layout. Returns the number of rows written.
    pub fn write_sales_csv<'a>(
        file_path: impl AsRef<Path>,
        dataset: &SalesDataset,
        records: impl IntoIterator<Item = &'a SaleRecord>,
        settings: &DataSettings,
    ) -> Result<usize, EngineError> {
        let file_path = file_path.as_ref();
        let file = File::create(file_path)?;
        let written = Self::write_sales_to_writer(BufWriter::new(file), dataset, records, settings)?;
        tracing::info!(path = %file_path.display(), records = written, "Wrote sales CSV");
        Ok(written)
    }

    pub fn write_sales_to_writer<'a, W: Write>(
        writer: W,
        dataset: &SalesDataset,
        records: impl IntoIterator<Item = &'a SaleRecord>,
        settings: &DataSettings,
    ) -> Result<usize, EngineError> {
        let mut wtr = WriterBuilder::new()
            .delimiter(settings.delimiter_byte()?)
            .from_writer(writer);

        wtr.write_record(dataset.headers())?;
        let mut written = 0;
        for record in records {
            wtr.write_record(dataset.row(record))?;
            written += 1;
        }
        wtr.flush()?;
        Ok(written)
    }

    fn column_index(headers: &StringRecord, name: &str) -> Result<usize, EngineError> {
        headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| EngineError::CsvDataFormatError(format!("Missing '{}' column in CSV header", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::NumberFormat;
    use tempfile::NamedTempFile;

    fn create_test_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_load_sales_from_csv_valid_data() {
        let csv_content = "\
Produto,Quantidade,Preço Unitário,Data
Notebook,2,3500.00,2023-03-10
Mouse,10,45.90,2023-06-15";
        let tmp_file = create_test_csv(csv_content);
        let dataset = SalesCsvParser::load_sales_from_csv(tmp_file.path(), &DataSettings::default()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records[0], SaleRecord::new("Notebook", "2", "3500.00", "2023-03-10"));
        assert_eq!(dataset.records[1].product, "Mouse");
        assert_eq!(dataset.records[1].unit_price, "45.90");
        assert!(dataset.extra_headers.is_empty());
    }

    #[test]
    fn test_load_sales_passes_extra_columns_through() {
        let csv_content = "\
Vendedor,Produto,Quantidade,Preço Unitário,Data,Loja
Ana,Notebook,2,3500.00,2023-03-10,Centro";
        let dataset = SalesCsvParser::load_sales_from_reader(csv_content.as_bytes(), &DataSettings::default()).unwrap();

        assert_eq!(dataset.extra_headers, vec!["Vendedor", "Loja"]);
        let record = &dataset.records[0];
        assert_eq!(record.product, "Notebook");
        assert_eq!(record.extra.get("Vendedor").map(String::as_str), Some("Ana"));
        assert_eq!(record.extra.get("Loja").map(String::as_str), Some("Centro"));
    }

    #[test]
    fn test_load_sales_keeps_malformed_values_as_text() {
        let csv_content = "\
Produto,Quantidade,Preço Unitário,Data
Notebook,dois,abc,ontem";
        let dataset = SalesCsvParser::load_sales_from_reader(csv_content.as_bytes(), &DataSettings::default()).unwrap();
        assert_eq!(dataset.records[0].quantity, "dois");
        assert_eq!(dataset.records[0].date, "ontem");
    }

    #[test]
    fn test_load_sales_from_csv_empty_file() {
        let csv_content = "Produto,Quantidade,Preço Unitário,Data"; // Only header
        let tmp_file = create_test_csv(csv_content);
        let dataset = SalesCsvParser::load_sales_from_csv(tmp_file.path(), &DataSettings::default()).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_load_sales_strips_bom() {
        let csv_content = "\u{feff}Produto,Quantidade,Preço Unitário,Data\nMouse,1,45.90,2023-06-15";
        let dataset = SalesCsvParser::load_sales_from_reader(csv_content.as_bytes(), &DataSettings::default()).unwrap();
        assert_eq!(dataset.records[0].product, "Mouse");
    }

    #[test]
    fn test_load_sales_skips_blank_rows() {
        let csv_content = "Produto,Quantidade,Preço Unitário,Data\nMouse,1,45.90,2023-06-15\n,,,\nTeclado,1,150.00,2023-07-01";
        let dataset = SalesCsvParser::load_sales_from_reader(csv_content.as_bytes(), &DataSettings::default()).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_load_sales_from_csv_missing_column() {
        let csv_content = "\
Produto,Quantidade,Data
Notebook,2,2023-03-10"; // Missing Preço Unitário
        let tmp_file = create_test_csv(csv_content);
        let result = SalesCsvParser::load_sales_from_csv(tmp_file.path(), &DataSettings::default());
        let err = result.unwrap_err();
        assert!(matches!(err, EngineError::CsvDataFormatError(_)));
        assert!(err.to_string().contains("Missing 'Preço Unitário' column"));
    }

    #[test]
    fn test_load_sales_duplicate_header_rejected() {
        let csv_content = "\
Produto,Quantidade,Preço Unitário,Data,Loja, Loja
Notebook,2,3500.00,2023-03-10,Centro,Norte";
        let err = SalesCsvParser::load_sales_from_reader(csv_content.as_bytes(), &DataSettings::default()).unwrap_err();
        assert!(matches!(err, EngineError::CsvDataFormatError(_)));
        assert!(err.to_string().contains("Duplicate 'Loja' column"));

        let core_twice = "Produto,Produto,Quantidade,Preço Unitário,Data\nA,B,1,1.00,2023-01-01";
        let result = SalesCsvParser::load_sales_from_reader(core_twice.as_bytes(), &DataSettings::default());
        assert!(matches!(result, Err(EngineError::CsvDataFormatError(_))));
    }

    #[test]
    fn test_load_sales_ragged_row_is_csv_error() {
        let csv_content = "Produto,Quantidade,Preço Unitário,Data\nNotebook,2,3500.00";
        let result = SalesCsvParser::load_sales_from_reader(csv_content.as_bytes(), &DataSettings::default());
        assert!(matches!(result, Err(EngineError::CsvSystemError { .. })));
    }

    #[test]
    fn test_load_sales_missing_file_is_io_error() {
        let result = SalesCsvParser::load_sales_from_csv("/nonexistent/vendas.csv", &DataSettings::default());
        match result {
            Err(EngineError::IoError { source }) => assert_eq!(source.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected IoError, got {:?}", other),
        }
    }

    #[test]
    fn test_load_sales_brazilian_semicolon_file() {
        let settings = DataSettings {
            csv_delimiter: ";".to_string(),
            number_format: NumberFormat::Brazilian,
            date_format: "%d/%m/%Y".to_string(),
            ..DataSettings::default()
        };
        let csv_content = "Produto;Quantidade;Preço Unitário;Data\nNotebook;2;3.500,00;10/03/2023";
        let dataset = SalesCsvParser::load_sales_from_reader(csv_content.as_bytes(), &settings).unwrap();
        assert_eq!(dataset.records[0].unit_price, "3.500,00");
        assert_eq!(dataset.records[0].date, "10/03/2023");
    }

    #[test]
    fn test_write_sales_keeps_layout() {
        let csv_content = "\
Vendedor,Produto,Quantidade,Preço Unitário,Data
Ana,Notebook,2,3500.00,2023-03-10
Bruno,Mouse,10,45.90,2023-06-15";
        let settings = DataSettings::default();
        let dataset = SalesCsvParser::load_sales_from_reader(csv_content.as_bytes(), &settings).unwrap();

        let mut out = Vec::new();
        let written = SalesCsvParser::write_sales_to_writer(&mut out, &dataset, dataset.records.iter().skip(1), &settings).unwrap();
        assert_eq!(written, 1);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "Produto,Quantidade,Preço Unitário,Data,Vendedor\nMouse,10,45.90,2023-06-15,Bruno\n");
    }

    #[test]
    fn test_write_sales_csv_file_reloads() {
        let settings = DataSettings::default();
        let dataset = SalesDataset::new(
            settings.columns.clone(),
            Vec::new(),
            vec![SaleRecord::new("Cabo HDMI", "3", "19.90", "2023-08-01")],
        );
        let out_file = NamedTempFile::new().unwrap();
        SalesCsvParser::write_sales_csv(out_file.path(), &dataset, &dataset.records, &settings).unwrap();

        let reloaded = SalesCsvParser::load_sales_from_csv(out_file.path(), &settings).unwrap();
        assert_eq!(reloaded.records, dataset.records);
    }
}
