// Sales data loading and writing
pub mod csv_parser;
