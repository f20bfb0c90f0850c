//! Potability screening core: parameter validation, rubric scoring, and dataset ingestion.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
