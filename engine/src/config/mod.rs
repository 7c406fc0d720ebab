// Engine configuration module
pub mod settings;

pub use settings::{AppSettings, DataSettings, ReportSettings};
