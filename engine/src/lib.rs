// Engine library root
// This file declares the modules for the engine crate.

pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod services;

pub use error::{EngineError, ValidationError};
pub use services::{SalesOverview, SalesTransformer};
