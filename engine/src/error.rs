use chrono::NaiveDate;
use thiserror::Error;

/// A record or argument that cannot take part in a computation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid quantity '{value}' for product '{product}': {reason}")]
    InvalidQuantity {
        product: String,
        value: String,
        reason: String,
    },

    #[error("Invalid unit price '{value}' for product '{product}': {reason}")]
    InvalidUnitPrice {
        product: String,
        value: String,
        reason: String,
    },

    #[error("Total of {quantity} x {unit_price} for product '{product}' is not a finite number")]
    InvalidTotal {
        product: String,
        quantity: u64,
        unit_price: f64,
    },

    #[error("Invalid date '{value}' (expected format '{format}'): {reason}")]
    InvalidDate {
        value: String,
        format: String,
        reason: String,
    },

    #[error("Invalid date range: start {start} is after end {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid threshold {0}: must be a finite number")]
    InvalidThreshold(f64),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV data format error: {0}")]
    CsvDataFormatError(String),

    #[error("Validation error: {source}")]
    Validation {
        #[from]
        source: ValidationError,
    },

    #[error("JSON error: {source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },
}

impl EngineError {
    /// Process exit status the `sales` binary reports for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            EngineError::ConfigError(_) => 78,
            EngineError::IoError { .. } => 74,
            EngineError::CsvSystemError { .. } | EngineError::CsvDataFormatError(_) => 65,
            EngineError::Validation { .. } => 65,
            EngineError::JsonError { .. } => 70,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_converts_into_engine_error() {
        let err: EngineError = ValidationError::InvalidThreshold(f64::NAN).into();
        assert!(matches!(err, EngineError::Validation { .. }));
        assert!(err.to_string().contains("finite"));
        assert_eq!(err.exit_code(), 65);
    }

    #[test]
    fn test_io_error_keeps_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "vendas.csv");
        let err: EngineError = io.into();
        match &err {
            EngineError::IoError { source } => assert_eq!(source.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected error variant: {:?}", other),
        }
        assert_eq!(err.exit_code(), 74);
    }

    #[test]
    fn test_invalid_quantity_message() {
        let err = ValidationError::InvalidQuantity {
            product: "Mouse".into(),
            value: "dez".into(),
            reason: "not a number".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Mouse"));
        assert!(msg.contains("dez"));
    }
}
