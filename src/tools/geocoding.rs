//! Open-Meteo geocoding

use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::{TripSageError, http};

const TOOL: &str = "geocoding";

/// A resolved place
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Place {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    /// First-level administrative area (state, region)
    pub admin1: Option<String>,
    pub timezone: Option<String>,
}

impl Place {
    /// "Paris, Île-de-France, France"
    #[must_use]
    pub fn display_name(&self) -> String {
        [Some(self.name.as_str()), self.admin1.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<Place>>,
}

/// Client for the Open-Meteo geocoding search
#[derive(Clone)]
pub struct Geocoder {
    client: ClientWithMiddleware,
    base_url: String,
}

impl Geocoder {
    #[must_use]
    pub fn new(client: ClientWithMiddleware, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Search for places matching a name, best match first
    #[instrument(skip(self))]
    pub async fn search(&self, name: &str) -> crate::Result<Vec<Place>> {
        let url = format!(
            "{}/search?name={}&count=5&language=en&format=json",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(name.trim())
        );

        let response = self.client.get(&url).send().await?;
        let body = http::read_body(response)
            .await
            .map_err(|message| TripSageError::tool(TOOL, message))?;

        let places = parse_places(&body)?;
        if places.is_empty() {
            warn!("No results found for location '{}'", name);
        } else {
            debug!(
                "Geocoding results: {:?}",
                places
                    .iter()
                    .map(|p| format!("{} ({})", p.name, p.format_coordinates()))
                    .collect::<Vec<_>>()
            );
        }
        Ok(places)
    }

    /// Resolve a name to its best match
    pub async fn locate(&self, name: &str) -> crate::Result<Place> {
        self.search(name)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| TripSageError::tool(TOOL, format!("Location not found: {name}")))
    }
}

fn parse_places(body: &str) -> crate::Result<Vec<Place>> {
    let response: GeocodingResponse = serde_json::from_str(body).map_err(|e| {
        TripSageError::tool(TOOL, format!("Invalid geocoding data received: {e}"))
    })?;
    Ok(response.results.unwrap_or_default())
}
