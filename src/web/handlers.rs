use std::convert::Infallible;

use axum::{
    Json,
    body::Body,
    extract::{Form, State},
    http::{
        HeaderValue, StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{Html, IntoResponse, Response},
};
use futures::{StreamExt, channel::mpsc, future, stream};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::AppState;
use super::page::{self, FormValues};
use crate::models::{TripRequest, download_file_name};
use crate::planner::PlanEvent;

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

/// The five trip fields as submitted. Missing fields arrive as empty strings
/// so they are reported by validation rather than rejected by the extractor.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TripForm {
    pub departure_city: String,
    pub destination_city: String,
    pub dates: String,
    pub interests: String,
    pub budget: String,
}

impl TripForm {
    pub fn to_trip(&self) -> crate::Result<TripRequest> {
        TripRequest::from_fields(
            &self.departure_city,
            &self.destination_city,
            &self.dates,
            &self.interests,
            &self.budget,
        )
    }

    fn values(&self) -> FormValues<'_> {
        FormValues {
            departure_city: &self.departure_city,
            destination_city: &self.destination_city,
            dates: &self.dates,
            interests: &self.interests,
            budget: &self.budget,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DownloadForm {
    #[serde(default)]
    pub destination: String,
    pub markdown: String,
}

pub async fn index() -> Html<String> {
    Html(page::form_page(&FormValues::default(), None))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}

/// Validate the form, then stream the result page while the planner runs
pub async fn plan(State(state): State<AppState>, Form(form): Form<TripForm>) -> Response {
    let trip = match form.to_trip() {
        Ok(trip) => trip,
        Err(e) => {
            warn!("Rejected planning request: {}", e);
            let page = page::form_page(&form.values(), Some(&e.user_message()));
            return (StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response();
        }
    };

    info!(
        "Planning trip {} -> {} ({})",
        trip.departure_city, trip.destination_city, trip.dates
    );

    let (tx, rx) = mpsc::unbounded();
    let destination = trip.destination_city.clone();
    let planner = state.planner.clone();
    tokio::spawn(async move {
        planner.plan(&trip, Some(tx)).await;
    });

    let head = stream::iter([page::document_head(), page::result_intro().to_string()]);
    let sections = rx.map(move |event| render_event(&destination, &event));
    let tail = stream::once(future::ready(page::document_tail().to_string()));
    let body = head.chain(sections).chain(tail).map(Ok::<_, Infallible>);

    ([(CONTENT_TYPE, HTML_CONTENT_TYPE)], Body::from_stream(body)).into_response()
}

fn render_event(destination: &str, event: &PlanEvent) -> String {
    match event {
        PlanEvent::CategoryCompleted { category, markdown } => {
            page::category_section(*category, markdown)
        }
        PlanEvent::CategoryFailed { category, message } => {
            page::category_failure(*category, message)
        }
        PlanEvent::ItineraryCompleted { markdown } => {
            page::itinerary_section(destination, markdown)
        }
        PlanEvent::ItineraryFailed { message } => page::itinerary_failure(message),
    }
}

/// Attachment header for `file_name`. Non-ASCII names get an ASCII
/// `filename` fallback plus an RFC 5987 `filename*` parameter.
fn attachment_disposition(file_name: &str) -> HeaderValue {
    let ascii: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let value = if ascii == file_name {
        format!("attachment; filename=\"{ascii}\"")
    } else {
        format!(
            "attachment; filename=\"{ascii}\"; filename*=UTF-8''{}",
            urlencoding::encode(file_name)
        )
    };
    HeaderValue::from_str(&value)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"travel_plan.md\""))
}

/// Serve an itinerary as a markdown attachment
pub async fn download(Form(form): Form<DownloadForm>) -> Response {
    let disposition = attachment_disposition(&download_file_name(&form.destination));

    (
        [
            (CONTENT_TYPE, HeaderValue::from_static(MARKDOWN_CONTENT_TYPE)),
            (CONTENT_DISPOSITION, disposition),
        ],
        form.markdown,
    )
        .into_response()
}
