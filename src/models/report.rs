//! Research categories, their reports and the final itinerary

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::TripSageError;

/// One research sub-task of a planning request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Destination,
    Events,
    Weather,
    Flights,
    Hotels,
}

impl Category {
    /// All categories in the fixed aggregation order
    pub const ALL: [Category; 5] = [
        Category::Destination,
        Category::Events,
        Category::Weather,
        Category::Flights,
        Category::Hotels,
    ];

    /// Position in [`Category::ALL`]
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Category::Destination => "destination",
            Category::Events => "events",
            Category::Weather => "weather",
            Category::Flights => "flights",
            Category::Hotels => "hotels",
        }
    }

    /// Section title shown to the user
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Category::Destination => "📍 Destination Information",
            Category::Events => "🎯 Events & Activities",
            Category::Weather => "☀️ Weather Forecast",
            Category::Flights => "✈️ Flight Options",
            Category::Hotels => "🏨 Hotel Recommendations",
        }
    }

    /// Section title without the leading icon
    #[must_use]
    pub fn title_text(self) -> &'static str {
        let title = self.title();
        title.split_once(' ').map_or(title, |(_, text)| text)
    }

    /// Heading used for this category in the aggregation context
    #[must_use]
    pub fn report_label(self) -> &'static str {
        match self {
            Category::Destination => "Destination Report",
            Category::Events => "Events Report",
            Category::Weather => "Weather Report",
            Category::Flights => "Flight Report",
            Category::Hotels => "Hotel Report",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Markdown produced by one research sub-task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub category: Category,
    pub markdown: String,
}

impl CategoryReport {
    #[must_use]
    pub fn new(category: Category, markdown: String) -> Self {
        Self { category, markdown }
    }
}

/// Result of researching one category
#[derive(Debug)]
pub enum CategoryOutcome {
    Completed(CategoryReport),
    Failed {
        category: Category,
        error: TripSageError,
    },
}

impl CategoryOutcome {
    #[must_use]
    pub fn category(&self) -> Category {
        match self {
            CategoryOutcome::Completed(report) => report.category,
            CategoryOutcome::Failed { category, .. } => *category,
        }
    }

    #[must_use]
    pub fn report(&self) -> Option<&CategoryReport> {
        match self {
            CategoryOutcome::Completed(report) => Some(report),
            CategoryOutcome::Failed { .. } => None,
        }
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, CategoryOutcome::Completed(_))
    }
}

/// All five category reports of one request, one per category.
///
/// Only constructible when every category has a report, so an itinerary can
/// never be synthesised from a partial set.
#[derive(Debug, Clone)]
pub struct ReportSet {
    destination: String,
    events: String,
    weather: String,
    flights: String,
    hotels: String,
}

impl ReportSet {
    /// Collect reports in any order. Fails with the missing categories when
    /// any of the five is absent.
    pub fn collect<I>(reports: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = CategoryReport>,
    {
        let mut slots: [Option<String>; 5] = Default::default();
        for report in reports {
            slots[report.category.index()] = Some(report.markdown);
        }

        let missing: Vec<Category> = Category::ALL
            .iter()
            .zip(slots.iter())
            .filter(|(_, slot)| slot.is_none())
            .map(|(category, _)| *category)
            .collect();

        match slots {
            [
                Some(destination),
                Some(events),
                Some(weather),
                Some(flights),
                Some(hotels),
            ] => Ok(Self {
                destination,
                events,
                weather,
                flights,
                hotels,
            }),
            _ => Err(TripSageError::IncompleteReports { missing }),
        }
    }

    /// Collect the completed reports out of per-category outcomes
    pub fn from_outcomes<'a, I>(outcomes: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = &'a CategoryOutcome>,
    {
        Self::collect(
            outcomes
                .into_iter()
                .filter_map(CategoryOutcome::report)
                .cloned(),
        )
    }

    #[must_use]
    pub fn get(&self, category: Category) -> &str {
        match category {
            Category::Destination => &self.destination,
            Category::Events => &self.events,
            Category::Weather => &self.weather,
            Category::Flights => &self.flights,
            Category::Hotels => &self.hotels,
        }
    }

    /// Reports paired with their category, in the fixed aggregation order
    pub fn iter(&self) -> impl Iterator<Item = (Category, &str)> {
        Category::ALL.into_iter().map(|c| (c, self.get(c)))
    }
}

/// The synthesised itinerary of a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalItinerary {
    markdown: String,
}

impl FinalItinerary {
    pub(crate) fn new(markdown: String) -> Self {
        Self { markdown }
    }

    #[must_use]
    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    #[must_use]
    pub fn into_markdown(self) -> String {
        self.markdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(category: Category) -> CategoryReport {
        CategoryReport::new(category, format!("{} body", category.id()))
    }

    #[test]
    fn test_titles() {
        assert_eq!(Category::Flights.title(), "✈️ Flight Options");
        assert_eq!(Category::Flights.title_text(), "Flight Options");
        assert_eq!(Category::Events.title_text(), "Events & Activities");
    }

    #[test]
    fn test_collect_orders_reports() {
        let mut reports: Vec<CategoryReport> = Category::ALL.into_iter().map(report).collect();
        reports.reverse();

        let set = ReportSet::collect(reports).unwrap();
        let order: Vec<Category> = set.iter().map(|(c, _)| c).collect();
        assert_eq!(order, Category::ALL.to_vec());
        assert_eq!(set.get(Category::Weather), "weather body");
    }

    #[test]
    fn test_collect_names_missing_categories() {
        let reports = vec![report(Category::Destination), report(Category::Weather)];
        match ReportSet::collect(reports) {
            Err(TripSageError::IncompleteReports { missing }) => assert_eq!(
                missing,
                vec![Category::Events, Category::Flights, Category::Hotels]
            ),
            other => panic!("expected incomplete reports, got {other:?}"),
        }
    }

    #[test]
    fn test_from_outcomes_skips_failures() {
        let outcomes: Vec<CategoryOutcome> = Category::ALL
            .into_iter()
            .map(|c| {
                if c == Category::Hotels {
                    CategoryOutcome::Failed {
                        category: c,
                        error: TripSageError::dispatch("timeout"),
                    }
                } else {
                    CategoryOutcome::Completed(report(c))
                }
            })
            .collect();

        assert!(matches!(
            ReportSet::from_outcomes(&outcomes),
            Err(TripSageError::IncompleteReports { ref missing }) if missing == &vec![Category::Hotels]
        ));
    }
}
