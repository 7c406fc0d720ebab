// Console output: tables, the bar chart and the report layouts built from them
pub mod chart;
pub mod dashboard;
pub mod table;

pub use dashboard::ReportRenderer;
