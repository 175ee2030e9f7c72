//! Open-Meteo daily forecast lookup for the weather task

use std::time::Instant;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use super::ReferenceSource;
use super::geocoding::{Geocoder, Place};
use crate::models::{Category, TripRequest, parse_start_date};
use crate::{TripSageError, http};

const TOOL: &str = "weather";

/// Open-Meteo serves daily forecasts up to this many days ahead
const FORECAST_HORIZON_DAYS: i64 = 15;
const TRIP_FORECAST_DAYS: i64 = 7;

/// Daily forecast response from Open-Meteo
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: Option<DailyData>,
}

#[derive(Debug, Deserialize)]
struct DailyData {
    time: Vec<String>,
    #[serde(rename = "temperature_2m_max")]
    temperature_max: Option<Vec<Option<f32>>>,
    #[serde(rename = "temperature_2m_min")]
    temperature_min: Option<Vec<Option<f32>>>,
    #[serde(rename = "precipitation_probability_max")]
    precipitation_probability: Option<Vec<Option<u8>>>,
    #[serde(rename = "weathercode")]
    weather_code: Option<Vec<Option<u8>>>,
}

/// Forecast for a single day
#[derive(Debug, Clone, PartialEq)]
pub struct DailyWeather {
    pub date: String,
    pub description: &'static str,
    pub temperature_min: Option<f32>,
    pub temperature_max: Option<f32>,
    pub precipitation_probability: Option<u8>,
}

impl DailyWeather {
    /// One markdown bullet, e.g. `- 2024-12-20: Overcast, 3.1 to 8.4 °C, rain chance 40%`
    #[must_use]
    pub fn format_line(&self) -> String {
        let mut line = format!("- {}: {}", self.date, self.description);
        match (self.temperature_min, self.temperature_max) {
            (Some(min), Some(max)) => line.push_str(&format!(", {min:.1} to {max:.1} °C")),
            (None, Some(max)) => line.push_str(&format!(", high {max:.1} °C")),
            (Some(min), None) => line.push_str(&format!(", low {min:.1} °C")),
            (None, None) => {}
        }
        if let Some(chance) = self.precipitation_probability {
            line.push_str(&format!(", rain chance {chance}%"));
        }
        line
    }
}

/// Convert `OpenMeteo` weather code to human-readable description
#[must_use]
pub fn weather_code_to_description(code: u8) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

fn daily_from_response(response: ForecastResponse) -> Vec<DailyWeather> {
    let Some(daily) = response.daily else {
        return Vec::new();
    };

    fn at<T: Copy>(values: &Option<Vec<Option<T>>>, i: usize) -> Option<T> {
        values.as_ref().and_then(|v| v.get(i).copied().flatten())
    }

    daily
        .time
        .iter()
        .enumerate()
        .map(|(i, date)| DailyWeather {
            date: date.clone(),
            description: at(&daily.weather_code, i)
                .map_or("Unknown", weather_code_to_description),
            temperature_min: at(&daily.temperature_min, i),
            temperature_max: at(&daily.temperature_max, i),
            precipitation_probability: at(&daily.precipitation_probability, i),
        })
        .collect()
}

/// The forecast window for a trip: its first week when the start date is
/// within the forecast horizon, otherwise `None` (next 7 days are used).
fn trip_window(start: Option<NaiveDate>, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let start = start?;
    let horizon = today + Duration::days(FORECAST_HORIZON_DAYS);
    if start < today || start > horizon {
        return None;
    }
    let end = (start + Duration::days(TRIP_FORECAST_DAYS - 1)).min(horizon);
    Some((start, end))
}

/// Daily forecast lookup for a destination
#[derive(Clone)]
pub struct WeatherForecaster {
    client: ClientWithMiddleware,
    base_url: String,
    geocoder: Geocoder,
}

impl WeatherForecaster {
    #[must_use]
    pub fn new(client: ClientWithMiddleware, base_url: impl Into<String>, geocoder: Geocoder) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            geocoder,
        }
    }

    /// Fetch the daily forecast for a place, for the trip window when known
    #[instrument(skip(self, place), fields(place = %place.name))]
    pub async fn daily_forecast(
        &self,
        place: &Place,
        window: Option<(NaiveDate, NaiveDate)>,
    ) -> crate::Result<Vec<DailyWeather>> {
        let start_time = Instant::now();
        let range = match window {
            Some((start, end)) => format!("&start_date={start}&end_date={end}"),
            None => format!("&forecast_days={TRIP_FORECAST_DAYS}"),
        };
        let url = format!(
            "{}/forecast?latitude={}&longitude={}&daily=weathercode,temperature_2m_max,temperature_2m_min,precipitation_probability_max&timezone=auto{}",
            self.base_url.trim_end_matches('/'),
            place.latitude,
            place.longitude,
            range
        );
        debug!("OpenMeteo API request URL: {}", url);

        let response = self.client.get(&url).send().await?;
        let body = http::read_body(response)
            .await
            .map_err(|message| TripSageError::tool(TOOL, message))?;
        let forecast: ForecastResponse = serde_json::from_str(&body).map_err(|e| {
            TripSageError::tool(TOOL, format!("Invalid forecast data received: {e}"))
        })?;

        let days = daily_from_response(forecast);
        info!(
            "Retrieved {} forecast days in {:.3}s",
            days.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(days)
    }
}

#[async_trait]
impl ReferenceSource for WeatherForecaster {
    fn name(&self) -> &str {
        "Open-Meteo forecast"
    }

    fn serves(&self, category: Category) -> bool {
        category == Category::Weather
    }

    async fn lookup(&self, trip: &TripRequest) -> crate::Result<Option<String>> {
        let place = self.geocoder.locate(&trip.destination_city).await?;
        let window = trip_window(parse_start_date(&trip.dates), Utc::now().date_naive());
        let days = self.daily_forecast(&place, window).await?;
        if days.is_empty() {
            return Ok(None);
        }

        let heading = match window {
            Some(_) => format!("Daily forecast for {}:", place.display_name()),
            None => format!(
                "Travel dates are beyond the forecast range; next {} days for {}:",
                TRIP_FORECAST_DAYS,
                place.display_name()
            ),
        };
        let lines: Vec<String> = days.iter().map(DailyWeather::format_line).collect();
        Ok(Some(format!("{heading}\n{}", lines.join("\n"))))
    }
}
