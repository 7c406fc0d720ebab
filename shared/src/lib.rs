//! Data model shared by the sales engine: records, dataset layout and number formats.

pub mod models;
pub mod utils;
