//! `TripSage` - agent-driven travel itinerary planning
//!
//! A trip request is split into five research tasks (destination, events,
//! weather, flights, hotels), each handed to a language-model agent. The
//! five markdown reports are then merged into a single itinerary.

pub mod agents;
pub mod aggregator;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod instructions;
pub mod logging;
pub mod markdown;
pub mod models;
pub mod planner;
pub mod tools;
pub mod web;

// Re-export core types for public API
pub use agents::{AgentKind, AgentProfile, AgentRoster};
pub use config::TripSageConfig;
pub use dispatch::{ChatDispatcher, Dispatcher};
pub use error::TripSageError;
pub use markdown::normalize_image_urls;
pub use models::{Category, CategoryOutcome, CategoryReport, FinalItinerary, TripRequest};
pub use planner::{PlanEvent, TripPlan, TripPlanner};
pub use tools::ReferenceSource;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripSageError>;
