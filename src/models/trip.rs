//! Trip request model: the five form fields of one planning request

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::TripSageError;

/// Fixed conversion rate used to give agents a USD reference for INR budgets
pub const INR_PER_USD: f64 = 83.0;

/// Symbol for the currency the budget is entered in
pub const BUDGET_CURRENCY_SYMBOL: &str = "₹";

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").unwrap());

// "Dec 20-25, 2024", "December 20, 2024"
static MONTH_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z]{3,9})\.?\s+(\d{1,2})(?:\s*[-–]\s*\d{1,2})?,?\s+(\d{4})").unwrap()
});

// "20-25 Dec 2024", "20 December, 2024"
static DAY_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})(?:\s*[-–]\s*\d{1,2})?\s+([A-Za-z]{3,9})\.?,?\s+(\d{4})").unwrap()
});

/// Budget as typed by the user, tagged as INR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    raw: String,
    amount: f64,
}

impl Budget {
    /// Parse a numeric budget, keeping the original text for verbatim display
    pub fn parse(raw: &str) -> crate::Result<Self> {
        let amount: f64 = raw.trim().parse().map_err(|_| {
            TripSageError::validation(format!("Budget must be a number, got '{raw}'"))
        })?;

        if !amount.is_finite() || amount < 0.0 {
            return Err(TripSageError::validation(format!(
                "Budget must be a positive amount, got '{raw}'"
            )));
        }

        Ok(Self {
            raw: raw.to_string(),
            amount,
        })
    }

    /// The budget exactly as entered
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// USD reference figure at [`INR_PER_USD`], rounded to 2 decimals
    #[must_use]
    pub fn usd_equivalent(&self) -> f64 {
        (self.amount / INR_PER_USD * 100.0).round() / 100.0
    }

    /// Format budget with currency symbol, e.g. `₹80000`
    #[must_use]
    pub fn format_inr(&self) -> String {
        format!("{BUDGET_CURRENCY_SYMBOL}{}", self.raw)
    }

    /// Format the USD reference figure, e.g. `$963.86`
    #[must_use]
    pub fn format_usd(&self) -> String {
        format!("${:.2}", self.usd_equivalent())
    }
}

/// A submitted planning request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    /// City the traveller departs from
    pub departure_city: String,
    /// City the trip is planned for
    pub destination_city: String,
    /// Free-text date range, e.g. "Dec 20-25, 2024"
    pub dates: String,
    /// Free-text interests, e.g. "museums, food"
    pub interests: String,
    /// Total budget in INR
    pub budget: Budget,
}

impl TripRequest {
    /// Build a request from raw form fields.
    ///
    /// Every field must be non-blank and the budget numeric. Field text is
    /// kept verbatim; no semantic validation of cities or dates happens here.
    pub fn from_fields(
        departure_city: &str,
        destination_city: &str,
        dates: &str,
        interests: &str,
        budget: &str,
    ) -> crate::Result<Self> {
        let fields = [
            ("Departure City", departure_city),
            ("Destination City", destination_city),
            ("Travel Dates", dates),
            ("Your Interests", interests),
            ("Your Budget", budget),
        ];

        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(label, _)| *label)
            .collect();

        if !missing.is_empty() {
            return Err(TripSageError::validation(format!(
                "Please fill in all required fields: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            departure_city: departure_city.to_string(),
            destination_city: destination_city.to_string(),
            dates: dates.to_string(),
            interests: interests.to_string(),
            budget: Budget::parse(budget)?,
        })
    }

    /// Name of the downloadable itinerary file for this trip
    #[must_use]
    pub fn download_file_name(&self) -> String {
        download_file_name(&self.destination_city)
    }
}

/// `travel_plan_<destination>.md`, destination lowercased with spaces as underscores
#[must_use]
pub fn download_file_name(destination: &str) -> String {
    format!(
        "travel_plan_{}.md",
        destination.to_lowercase().replace(' ', "_")
    )
}

/// Best-effort extraction of the first date in a free-text date range.
///
/// Accepts `2024-12-20`, `Dec 20-25, 2024`, `December 20, 2024` and
/// `20-25 Dec 2024`. Returns `None` when nothing recognisable is found.
#[must_use]
pub fn parse_start_date(text: &str) -> Option<NaiveDate> {
    if let Some(caps) = ISO_DATE.captures(text) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    let month_first = MONTH_FIRST.captures_iter(text).find_map(|caps| {
        let month = month_number(&caps[1])?;
        let day = caps[2].parse().ok()?;
        let year = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    });
    if month_first.is_some() {
        return month_first;
    }

    DAY_FIRST.captures_iter(text).find_map(|caps| {
        let day = caps[1].parse().ok()?;
        let month = month_number(&caps[2])?;
        let year = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn trip() -> TripRequest {
        TripRequest::from_fields("Mumbai", "Paris", "Dec 20-25, 2024", "museums, food", "80000")
            .unwrap()
    }

    #[test]
    fn test_from_fields_keeps_text_verbatim() {
        let trip = TripRequest::from_fields(
            "Mumbai",
            "  New York ",
            "Dec 20-25, 2024",
            "museums, food",
            "80000",
        )
        .unwrap();
        assert_eq!(trip.destination_city, "  New York ");
        assert_eq!(trip.budget.raw(), "80000");
        assert_eq!(trip.budget.amount(), 80000.0);
    }

    #[test]
    fn test_from_fields_reports_every_missing_field() {
        let err = TripRequest::from_fields("Mumbai", "", "  ", "food", "").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Destination City"));
        assert!(message.contains("Travel Dates"));
        assert!(message.contains("Your Budget"));
        assert!(!message.contains("Departure City"));
    }

    #[rstest]
    #[case("eighty thousand")]
    #[case("-5")]
    #[case("NaN")]
    #[case("inf")]
    fn test_budget_rejects_non_numeric_or_negative(#[case] raw: &str) {
        assert!(matches!(
            Budget::parse(raw),
            Err(TripSageError::Validation { .. })
        ));
    }

    #[test]
    fn test_budget_usd_conversion() {
        let budget = trip().budget;
        assert_eq!(budget.usd_equivalent(), 963.86);
        assert_eq!(budget.format_inr(), "₹80000");
        assert_eq!(budget.format_usd(), "$963.86");

        let even = Budget::parse("8300").unwrap();
        assert_eq!(even.format_usd(), "$100.00");
    }

    #[rstest]
    #[case("Paris", "travel_plan_paris.md")]
    #[case("New York City", "travel_plan_new_york_city.md")]
    #[case("São Paulo", "travel_plan_são_paulo.md")]
    fn test_download_file_name(#[case] destination: &str, #[case] expected: &str) {
        assert_eq!(download_file_name(destination), expected);
    }

    #[rstest]
    #[case("Dec 20-25, 2024", Some((2024, 12, 20)))]
    #[case("December 3, 2025", Some((2025, 12, 3)))]
    #[case("2024-12-20 to 2024-12-25", Some((2024, 12, 20)))]
    #[case("20-25 Dec 2024", Some((2024, 12, 20)))]
    #[case("from 5 March, 2025 for a week", Some((2025, 3, 5)))]
    #[case("sometime next summer", None)]
    #[case("Feb 30, 2025", None)]
    fn test_parse_start_date(#[case] text: &str, #[case] expected: Option<(i32, u32, u32)>) {
        let expected = expected.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
        assert_eq!(parse_start_date(text), expected);
    }
}
