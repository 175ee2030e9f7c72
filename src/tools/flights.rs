//! Amadeus flight offers search
//!
//! Three calls per lookup: a client-credentials token (cached until shortly
//! before it expires), a city code lookup for both ends of the trip, and
//! the offers search itself for the first parseable departure date.

use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use super::ReferenceSource;
use crate::config::AmadeusConfig;
use crate::models::{Category, TripRequest, parse_start_date};
use crate::{TripSageError, http};

const TOOL: &str = "flights";

/// Tokens are refreshed this long before the reported expiry
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

static ISO_DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?$").unwrap());

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct LocationsResponse {
    #[serde(default)]
    data: Vec<Location>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Location {
    iata_code: String,
}

#[derive(Debug, Deserialize)]
struct OffersResponse {
    #[serde(default)]
    data: Vec<FlightOffer>,
    dictionaries: Option<Dictionaries>,
}

#[derive(Debug, Default, Deserialize)]
struct Dictionaries {
    #[serde(default)]
    carriers: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct FlightOffer {
    itineraries: Vec<Itinerary>,
    price: Price,
}

#[derive(Debug, Deserialize)]
struct Itinerary {
    duration: Option<String>,
    segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Segment {
    departure: Endpoint,
    arrival: Endpoint,
    carrier_code: String,
    number: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Endpoint {
    iata_code: String,
    at: String,
}

#[derive(Debug, Deserialize)]
struct Price {
    currency: String,
    total: String,
}

/// One flight offer reduced to what a report needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightSummary {
    pub airline: String,
    pub flight_number: String,
    pub route: String,
    pub departure: String,
    pub arrival: String,
    pub duration: String,
    pub stops: usize,
    pub price: String,
}

impl FlightSummary {
    #[must_use]
    pub fn format_line(&self) -> String {
        let stops = match self.stops {
            0 => "non-stop".to_string(),
            1 => "1 stop".to_string(),
            n => format!("{n} stops"),
        };
        format!(
            "- {} {}: {}, departs {}, arrives {}, {} ({}), {}",
            self.airline,
            self.flight_number,
            self.route,
            self.departure,
            self.arrival,
            self.duration,
            stops,
            self.price
        )
    }
}

/// "PT10H30M" -> "10h 30m"
fn format_iso_duration(iso: &str) -> String {
    let Some(caps) = ISO_DURATION.captures(iso) else {
        return iso.to_string();
    };
    let hours = caps.get(1).map(|m| m.as_str());
    let minutes = caps.get(2).map(|m| m.as_str());
    match (hours, minutes) {
        (Some(h), Some(m)) => format!("{h}h {m}m"),
        (Some(h), None) => format!("{h}h"),
        (None, Some(m)) => format!("{m}m"),
        (None, None) => iso.to_string(),
    }
}

fn parse_offers(body: &str) -> crate::Result<Vec<FlightSummary>> {
    let response: OffersResponse = serde_json::from_str(body)
        .map_err(|e| TripSageError::tool(TOOL, format!("Invalid flight offers data: {e}")))?;
    let carriers = response.dictionaries.unwrap_or_default().carriers;

    Ok(response
        .data
        .into_iter()
        .filter_map(|offer| {
            let outbound = offer.itineraries.into_iter().next()?;
            let first = outbound.segments.first()?;
            let last = outbound.segments.last()?;
            let airline = carriers
                .get(&first.carrier_code)
                .cloned()
                .unwrap_or_else(|| first.carrier_code.clone());
            Some(FlightSummary {
                airline,
                flight_number: format!("{}{}", first.carrier_code, first.number),
                route: format!("{} → {}", first.departure.iata_code, last.arrival.iata_code),
                departure: first.departure.at.clone(),
                arrival: last.arrival.at.clone(),
                duration: outbound
                    .duration
                    .as_deref()
                    .map_or_else(|| "unknown duration".to_string(), format_iso_duration),
                stops: outbound.segments.len().saturating_sub(1),
                price: format!("{} {}", offer.price.total, offer.price.currency),
            })
        })
        .collect())
}

/// Flight search backed by the Amadeus self-service API
pub struct FlightSearch {
    client: ClientWithMiddleware,
    config: AmadeusConfig,
    token: Mutex<Option<CachedToken>>,
}

impl FlightSearch {
    #[must_use]
    pub fn new(client: ClientWithMiddleware, config: AmadeusConfig) -> Self {
        Self {
            client,
            config,
            token: Mutex::new(None),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn access_token(&self) -> crate::Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref()
            && token.expires_at > Instant::now()
        {
            return Ok(token.value.clone());
        }

        let form = format!(
            "grant_type=client_credentials&client_id={}&client_secret={}",
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.client_secret)
        );
        let response = self
            .client
            .post(self.url("/v1/security/oauth2/token"))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await?;
        let body = http::read_body(response)
            .await
            .map_err(|message| TripSageError::tool(TOOL, format!("Token request failed: {message}")))?;
        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| TripSageError::tool(TOOL, format!("Invalid token response: {e}")))?;

        debug!("Obtained Amadeus token valid for {}s", token.expires_in);
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }

    async fn get(&self, url: &str) -> crate::Result<String> {
        let token = self.access_token().await?;
        let response = self.client.get(url).bearer_auth(token).send().await?;
        http::read_body(response)
            .await
            .map_err(|message| TripSageError::tool(TOOL, message))
    }

    /// IATA code of the city (or airport) best matching a name
    #[instrument(skip(self))]
    pub async fn city_code(&self, city: &str) -> crate::Result<String> {
        let url = self.url(&format!(
            "/v1/reference-data/locations?subType=CITY,AIRPORT&keyword={}&page%5Blimit%5D=1",
            urlencoding::encode(city.trim())
        ));
        let body = self.get(&url).await?;
        let locations: LocationsResponse = serde_json::from_str(&body)
            .map_err(|e| TripSageError::tool(TOOL, format!("Invalid location data: {e}")))?;
        locations
            .data
            .into_iter()
            .next()
            .map(|l| l.iata_code)
            .ok_or_else(|| TripSageError::tool(TOOL, format!("No airport found for {city}")))
    }

    /// Cheapest one-way offers for a single adult
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        origin: &str,
        destination: &str,
        date: NaiveDate,
    ) -> crate::Result<Vec<FlightSummary>> {
        let start_time = Instant::now();
        let url = self.url(&format!(
            "/v2/shopping/flight-offers?originLocationCode={origin}&destinationLocationCode={destination}&departureDate={date}&adults=1&currencyCode={}&max={}",
            urlencoding::encode(&self.config.currency),
            self.config.max_offers
        ));
        let body = self.get(&url).await?;
        let offers = parse_offers(&body)?;
        info!(
            "Found {} flight offers {} -> {} in {:.3}s",
            offers.len(),
            origin,
            destination,
            start_time.elapsed().as_secs_f64()
        );
        Ok(offers)
    }
}

#[async_trait]
impl ReferenceSource for FlightSearch {
    fn name(&self) -> &str {
        "Amadeus flight offers"
    }

    fn serves(&self, category: Category) -> bool {
        category == Category::Flights
    }

    async fn lookup(&self, trip: &TripRequest) -> crate::Result<Option<String>> {
        let Some(date) = parse_start_date(&trip.dates) else {
            debug!("No departure date recognised in '{}'", trip.dates);
            return Ok(None);
        };

        let origin = self.city_code(&trip.departure_city).await?;
        let destination = self.city_code(&trip.destination_city).await?;
        let offers = self.search(&origin, &destination, date).await?;
        if offers.is_empty() {
            return Ok(None);
        }

        let lines: Vec<String> = offers.iter().map(FlightSummary::format_line).collect();
        Ok(Some(format!(
            "Flight offers {origin} → {destination} on {date}:\n{}",
            lines.join("\n")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const OFFERS: &str = r#"{
        "meta": {"count": 2},
        "data": [
            {
                "id": "1",
                "itineraries": [{
                    "duration": "PT10H30M",
                    "segments": [
                        {"departure": {"iataCode": "BOM", "at": "2024-12-20T02:15:00"},
                         "arrival": {"iataCode": "CDG", "at": "2024-12-20T08:15:00"},
                         "carrierCode": "AF", "number": "217"}
                    ]
                }],
                "price": {"currency": "INR", "total": "48250.00"}
            },
            {
                "id": "2",
                "itineraries": [{
                    "duration": "PT14H",
                    "segments": [
                        {"departure": {"iataCode": "BOM", "at": "2024-12-20T03:00:00"},
                         "arrival": {"iataCode": "DXB", "at": "2024-12-20T04:45:00"},
                         "carrierCode": "EK", "number": "501"},
                        {"departure": {"iataCode": "DXB", "at": "2024-12-20T07:30:00"},
                         "arrival": {"iataCode": "CDG", "at": "2024-12-20T12:30:00"},
                         "carrierCode": "EK", "number": "73"}
                    ]
                }],
                "price": {"currency": "INR", "total": "39900.00"}
            }
        ],
        "dictionaries": {"carriers": {"AF": "AIR FRANCE"}}
    }"#;

    #[test]
    fn test_parse_offers() {
        let offers = parse_offers(OFFERS).unwrap();
        assert_eq!(offers.len(), 2);
        assert_eq!(
            offers[0].format_line(),
            "- AIR FRANCE AF217: BOM → CDG, departs 2024-12-20T02:15:00, \
             arrives 2024-12-20T08:15:00, 10h 30m (non-stop), 48250.00 INR"
        );
        // carrier missing from the dictionary falls back to its code
        assert_eq!(offers[1].airline, "EK");
        assert_eq!(offers[1].route, "BOM → CDG");
        assert_eq!(offers[1].stops, 1);
    }

    #[test]
    fn test_parse_offers_empty() {
        assert!(parse_offers(r#"{"data": []}"#).unwrap().is_empty());
        assert!(parse_offers("not json").is_err());
    }

    #[rstest]
    #[case("PT10H30M", "10h 30m")]
    #[case("PT2H", "2h")]
    #[case("PT45M", "45m")]
    #[case("P1DT2H", "P1DT2H")]
    fn test_format_iso_duration(#[case] iso: &str, #[case] expected: &str) {
        assert_eq!(format_iso_duration(iso), expected);
    }
}
