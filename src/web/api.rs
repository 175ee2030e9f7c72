//! JSON planning API

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::Serialize;
use tracing::warn;

use super::AppState;
use super::handlers::TripForm;
use crate::models::{Category, CategoryOutcome, TripRequest};
use crate::planner::TripPlan;

#[derive(Debug, Serialize)]
pub struct ApiReport {
    pub category: Category,
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiPlan {
    pub reports: Vec<ApiReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub itinerary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub itinerary_error: Option<String>,
    pub download_file_name: String,
}

impl ApiPlan {
    fn new(trip: &TripRequest, plan: TripPlan) -> Self {
        let reports = plan
            .reports
            .into_iter()
            .map(|outcome| match outcome {
                CategoryOutcome::Completed(report) => ApiReport {
                    category: report.category,
                    title: report.category.title(),
                    markdown: Some(report.markdown),
                    error: None,
                },
                CategoryOutcome::Failed { category, error } => ApiReport {
                    category,
                    title: category.title(),
                    markdown: None,
                    error: Some(error.user_message()),
                },
            })
            .collect();

        let (itinerary, itinerary_error) = match plan.itinerary {
            Ok(itinerary) => (Some(itinerary.into_markdown()), None),
            Err(e) => (None, Some(e.user_message())),
        };

        Self {
            reports,
            itinerary,
            itinerary_error,
            download_file_name: trip.download_file_name(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/plan", post(plan_trip))
}

async fn plan_trip(
    State(state): State<AppState>,
    Json(request): Json<TripForm>,
) -> Result<Json<ApiPlan>, (StatusCode, Json<ApiError>)> {
    let trip = request.to_trip().map_err(|e| {
        warn!("Rejected API planning request: {}", e);
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiError {
                error: e.user_message(),
            }),
        )
    })?;

    let plan = state.planner.plan(&trip, None).await;
    Ok(Json(ApiPlan::new(&trip, plan)))
}
