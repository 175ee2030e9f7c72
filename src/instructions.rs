//! Task instructions for each research category
//!
//! Every builder is a pure function of the trip request. User input goes
//! verbatim into the context; the instruction carries the fixed guidance
//! (plus derived figures such as the hotel budget conversion).

use serde::Serialize;

use crate::agents::AgentKind;
use crate::models::{Category, TripRequest};

/// Image guidance shared by every section that should be illustrated
const IMAGE_GUIDANCE: &str = "Include 2-3 high-quality images per section using valid image markdown \
     format: ![Alt Text](https://full-image-url). Image URLs must be complete and start with \
     https:// or http://. Add a short caption below each image.";

/// A task ready to hand to the dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskPrompt {
    pub agent: AgentKind,
    pub instruction: String,
    pub context: String,
}

/// The agent responsible for a research category
#[must_use]
pub fn agent_for(category: Category) -> AgentKind {
    match category {
        Category::Destination | Category::Events => AgentKind::WebResearch,
        Category::Weather | Category::Flights | Category::Hotels => AgentKind::Travel,
    }
}

/// Build the task for one research category
#[must_use]
pub fn build(category: Category, trip: &TripRequest) -> TaskPrompt {
    match category {
        Category::Destination => research_destination(trip),
        Category::Events => research_events(trip),
        Category::Weather => research_weather(trip),
        Category::Flights => search_flights(trip),
        Category::Hotels => search_hotels(trip),
    }
}

#[must_use]
pub fn research_destination(trip: &TripRequest) -> TaskPrompt {
    let instruction = format!(
        "Create a comprehensive report about the destination in the context with the following:\n\
         1. {IMAGE_GUIDANCE}\n\
         2. Show key attractions in the images.\n\
         3. Cover top attractions and activities relevant to the traveller's interests.\n\
         4. Format the whole response in clean markdown sections with proper headers."
    );
    let context = format!(
        "Destination: {}\nInterests: {}",
        trip.destination_city, trip.interests
    );
    task(Category::Destination, instruction, context)
}

#[must_use]
pub fn research_events(trip: &TripRequest) -> TaskPrompt {
    let instruction = format!(
        "List events taking place at the destination during the travel dates that match the \
         traveller's interests. Give each event a short description with date, venue and \
         price if known. {IMAGE_GUIDANCE} Format the response in markdown with proper headers."
    );
    let context = format!(
        "Destination: {}\nTravel dates: {}\nInterests: {}",
        trip.destination_city, trip.dates, trip.interests
    );
    task(Category::Events, instruction, context)
}

#[must_use]
pub fn research_weather(trip: &TripRequest) -> TaskPrompt {
    let instruction = "Provide a weather forecast for the destination and travel dates, \
         including temperature range, rain chances and packing tips. \
         Format the response in markdown with proper headers."
        .to_string();
    let context = format!(
        "Destination: {}\nTravel dates: {}",
        trip.destination_city, trip.dates
    );
    task(Category::Weather, instruction, context)
}

#[must_use]
pub fn search_flights(trip: &TripRequest) -> TaskPrompt {
    let instruction = "Find the top 3 affordable flights from the departure city to the \
         destination for the travel dates. Use bullet points with prices in INR (₹) and include \
         airline, departure time, duration and total price."
        .to_string();
    let context = format!(
        "From: {}\nTo: {}\nTravel dates: {}",
        trip.departure_city, trip.destination_city, trip.dates
    );
    task(Category::Flights, instruction, context)
}

#[must_use]
pub fn search_hotels(trip: &TripRequest) -> TaskPrompt {
    let budget = &trip.budget;
    let instruction = format!(
        "List 3 hotel stays at the destination within a total budget of {} (~{}) for the \
         travel dates. Include name, location, star rating and price in INR. {IMAGE_GUIDANCE}",
        budget.format_inr(),
        budget.format_usd()
    );
    let context = format!(
        "Destination: {}\nTravel dates: {}\nBudget: {}",
        trip.destination_city,
        trip.dates,
        budget.format_inr()
    );
    task(Category::Hotels, instruction, context)
}

fn task(category: Category, instruction: String, context: String) -> TaskPrompt {
    TaskPrompt {
        agent: agent_for(category),
        instruction,
        context,
    }
}
