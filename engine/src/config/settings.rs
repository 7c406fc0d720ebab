// Application settings, loaded from the embedded default.json or a user JSON file
use serde::Deserialize;
use shared::models::{ColumnNames, NumberFormat};
use std::path::Path;

use crate::error::EngineError;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppSettings {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub report: ReportSettings,
}

/// How sales files are read.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DataSettings {
    pub csv_delimiter: String, // Should be a single byte, but a JSON string is easier
    pub number_format: NumberFormat,
    pub date_format: String,
    pub columns: ColumnNames,
}

/// How console reports and the dashboard are rendered.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ReportSettings {
    pub title: String,
    pub currency_symbol: String,
    pub preview_rows: usize,
    pub chart_width: usize,
    pub default_threshold: f64,
    pub default_start_date: String,
    pub default_end_date: String,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl Default for DataSettings {
    fn default() -> Self {
        DataSettings {
            csv_delimiter: ",".to_string(),
            number_format: NumberFormat::Standard,
            date_format: "%Y-%m-%d".to_string(),
            columns: ColumnNames::default(),
        }
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            title: "Sales Analysis Dashboard".to_string(),
            currency_symbol: "R$".to_string(),
            preview_rows: 5,
            chart_width: 40,
            default_threshold: 500.0,
            default_start_date: "2023-01-01".to_string(),
            default_end_date: "2023-12-31".to_string(),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            version: default_version(),
            data: DataSettings::default(),
            report: ReportSettings::default(),
        }
    }
}

impl DataSettings {
    /// The delimiter as the single byte the csv crate expects.
    pub fn delimiter_byte(&self) -> Result<u8, EngineError> {
        match self.csv_delimiter.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(EngineError::ConfigError(format!(
                "csv_delimiter must be a single ASCII character, got '{}'",
                self.csv_delimiter
            ))),
        }
    }
}

impl AppSettings {
    pub fn load_default() -> Result<Self, EngineError> {
        let config_str = include_str!("../../assets/config/default.json");
        Self::from_json(config_str)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&config_str).map_err(|e| match e {
            EngineError::ConfigError(msg) => {
                EngineError::ConfigError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;
        tracing::info!(path = %path.display(), version = %settings.version, "Loaded settings file");
        Ok(settings)
    }

    pub fn from_json(config_str: &str) -> Result<Self, EngineError> {
        let settings: AppSettings = serde_json::from_str(config_str)
            .map_err(|e| EngineError::ConfigError(format!("invalid settings JSON: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.data.delimiter_byte()?;
        if self.data.date_format.trim().is_empty() {
            return Err(EngineError::ConfigError("date_format must not be empty".to_string()));
        }
        let columns = self.data.columns.as_array();
        for (i, name) in columns.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(EngineError::ConfigError("column names must not be empty".to_string()));
            }
            if columns[..i].contains(name) {
                return Err(EngineError::ConfigError(format!("column name '{}' is used twice", name)));
            }
        }
        if self.report.chart_width == 0 {
            return Err(EngineError::ConfigError("chart_width must be greater than 0".to_string()));
        }
        if !self.report.default_threshold.is_finite() {
            return Err(EngineError::ConfigError("default_threshold must be a finite number".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_embedded_default_matches_default_impl() {
        let settings = AppSettings::load_default().unwrap();
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = AppSettings::from_json(r#"{ "data": { "csv_delimiter": ";", "number_format": "brazilian" } }"#).unwrap();
        assert_eq!(settings.data.delimiter_byte().unwrap(), b';');
        assert_eq!(settings.data.number_format, NumberFormat::Brazilian);
        assert_eq!(settings.data.date_format, "%Y-%m-%d");
        assert_eq!(settings.data.columns.product, "Produto");
        assert_eq!(settings.report, ReportSettings::default());
    }

    #[test]
    fn test_multi_char_delimiter_rejected() {
        let result = AppSettings::from_json(r#"{ "data": { "csv_delimiter": ";;" } }"#);
        assert!(matches!(result, Err(EngineError::ConfigError(_))));
    }

    #[test]
    fn test_duplicate_column_names_rejected() {
        let result = AppSettings::from_json(
            r#"{ "data": { "columns": { "product": "Data", "date": "Data" } } }"#,
        );
        let err = result.unwrap_err();
        assert!(err.to_string().contains("used twice"));
    }

    #[test]
    fn test_zero_chart_width_rejected() {
        let result = AppSettings::from_json(r#"{ "report": { "chart_width": 0 } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let result = AppSettings::from_json("{ not json");
        assert!(matches!(result, Err(EngineError::ConfigError(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "report": {{ "currency_symbol": "US$", "preview_rows": 3 }} }}"#).unwrap();
        let settings = AppSettings::load_from_file(file.path()).unwrap();
        assert_eq!(settings.report.currency_symbol, "US$");
        assert_eq!(settings.report.preview_rows, 3);
        assert_eq!(settings.report.chart_width, 40);
    }

    #[test]
    fn test_load_from_missing_file_is_io_error() {
        let result = AppSettings::load_from_file("/nonexistent/settings.json");
        assert!(matches!(result, Err(EngineError::IoError { .. })));
    }
}
