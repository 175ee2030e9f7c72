//! Data-fetch wrappers
//!
//! Each wrapper is a single outbound call (or a short fixed chain) whose
//! result is plain text appended to the context of the categories it
//! serves. Lookups are best effort: the planner logs and skips failures.

pub mod flights;
pub mod geocoding;
pub mod images;
pub mod weather;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::ToolsConfig;
use crate::http;
use crate::models::{Category, TripRequest};

pub use flights::FlightSearch;
pub use geocoding::{Geocoder, Place};
pub use images::ImageSearch;
pub use weather::WeatherForecaster;

/// A provider of reference data for one or more research categories
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    /// Name shown in the reference heading
    fn name(&self) -> &str;

    /// Whether this source has data for the category
    fn serves(&self, category: Category) -> bool;

    /// Fetch reference text for a trip. `Ok(None)` means nothing useful was found.
    async fn lookup(&self, trip: &TripRequest) -> crate::Result<Option<String>>;
}

/// Build the enabled reference sources, sharing one HTTP client
pub fn from_config(config: &ToolsConfig) -> crate::Result<Vec<Arc<dyn ReferenceSource>>> {
    let client = http::build_client(config.timeout_seconds, config.max_retries)?;
    let mut sources: Vec<Arc<dyn ReferenceSource>> = Vec::new();

    if config.images_enabled {
        sources.push(Arc::new(ImageSearch::new(
            client.clone(),
            &config.wikipedia_base_url,
        )));
    }
    if config.weather_enabled {
        let geocoder = Geocoder::new(client.clone(), &config.geocoding_base_url);
        sources.push(Arc::new(WeatherForecaster::new(
            client.clone(),
            &config.weather_base_url,
            geocoder,
        )));
    }
    if let Some(amadeus) = &config.amadeus {
        sources.push(Arc::new(FlightSearch::new(client, amadeus.clone())));
    }

    info!(
        "Reference sources enabled: [{}]",
        sources.iter().map(|s| s.name()).collect::<Vec<_>>().join(", ")
    );
    Ok(sources)
}

/// Append a reference block after the user fields of a context
#[must_use]
pub fn append_reference(context: &str, source: &str, data: &str) -> String {
    format!("{context}\n\nReference data ({source}):\n{}", data.trim())
}
