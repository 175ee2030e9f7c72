//! Data models for a single planning request
//!
//! - Trip: the submitted request and its budget
//! - Report: research categories, their reports and the final itinerary

pub mod report;
pub mod trip;

pub use report::{Category, CategoryOutcome, CategoryReport, FinalItinerary, ReportSet};
pub use trip::{Budget, TripRequest, download_file_name, parse_start_date};
