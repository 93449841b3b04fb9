//! Weekly cohort progress reports: survey export rows are mapped to student
//! records, derived, classified into risk tiers and rendered to a workbook.

pub mod derive;
pub mod error;
pub mod mapping;
pub mod models;
pub mod phase;
pub mod processor;
pub mod report;
pub mod risk;
pub mod summary;
pub mod workbook;

pub use error::TrackerError;
pub use models::{ProcessingResult, StudentRecord, TrackerReport};
pub use processor::{process, try_process};
