//! Request pipeline
//!
//! For each category: build the task, append reference data, dispatch to
//! the responsible agent and repair image URLs. When all five categories
//! succeed their reports are merged into the final itinerary.

use std::sync::Arc;
use std::time::Instant;

use futures::channel::mpsc::UnboundedSender;
use futures::future;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::agents::AgentRoster;
use crate::dispatch::Dispatcher;
use crate::markdown::normalize_image_urls;
use crate::models::{Category, CategoryOutcome, CategoryReport, FinalItinerary, ReportSet, TripRequest};
use crate::tools::{self, ReferenceSource};
use crate::{aggregator, instructions};

/// Progress notification, sent as soon as a step finishes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlanEvent {
    CategoryCompleted { category: Category, markdown: String },
    CategoryFailed { category: Category, message: String },
    ItineraryCompleted { markdown: String },
    ItineraryFailed { message: String },
}

impl PlanEvent {
    fn for_outcome(outcome: &CategoryOutcome) -> Self {
        match outcome {
            CategoryOutcome::Completed(report) => PlanEvent::CategoryCompleted {
                category: report.category,
                markdown: report.markdown.clone(),
            },
            CategoryOutcome::Failed { category, error } => PlanEvent::CategoryFailed {
                category: *category,
                message: error.user_message(),
            },
        }
    }

    fn for_itinerary(itinerary: &crate::Result<FinalItinerary>) -> Self {
        match itinerary {
            Ok(itinerary) => PlanEvent::ItineraryCompleted {
                markdown: itinerary.markdown().to_string(),
            },
            Err(e) => PlanEvent::ItineraryFailed {
                message: e.user_message(),
            },
        }
    }
}

/// Everything produced for one request
#[derive(Debug)]
pub struct TripPlan {
    /// One outcome per category, in the fixed category order
    pub reports: Vec<CategoryOutcome>,
    /// Fails with `IncompleteReports` when any category failed
    pub itinerary: crate::Result<FinalItinerary>,
}

impl TripPlan {
    #[must_use]
    pub fn completed(&self) -> impl Iterator<Item = &CategoryReport> {
        self.reports.iter().filter_map(CategoryOutcome::report)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.itinerary.is_ok()
    }
}

/// Drives the research agents and the synthesis step for trip requests
pub struct TripPlanner {
    dispatcher: Arc<dyn Dispatcher>,
    roster: AgentRoster,
    sources: Vec<Arc<dyn ReferenceSource>>,
    parallel: bool,
}

impl TripPlanner {
    #[must_use]
    pub fn new(dispatcher: Arc<dyn Dispatcher>, roster: AgentRoster) -> Self {
        Self {
            dispatcher,
            roster,
            sources: Vec::new(),
            parallel: false,
        }
    }

    /// Reference sources consulted before each dispatch
    #[must_use]
    pub fn with_sources(mut self, sources: Vec<Arc<dyn ReferenceSource>>) -> Self {
        self.sources = sources;
        self
    }

    /// Dispatch the five research tasks concurrently instead of one by one
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Plan a whole trip, reporting progress on the optional channel
    #[instrument(skip(self, trip, progress), fields(destination = %trip.destination_city, parallel = self.parallel))]
    pub async fn plan(
        &self,
        trip: &TripRequest,
        progress: Option<UnboundedSender<PlanEvent>>,
    ) -> TripPlan {
        let start_time = Instant::now();
        let progress = progress.as_ref();

        let reports = if self.parallel {
            future::join_all(
                Category::ALL.map(|category| self.research_and_report(category, trip, progress)),
            )
            .await
        } else {
            let mut reports = Vec::with_capacity(Category::ALL.len());
            for category in Category::ALL {
                reports.push(self.research_and_report(category, trip, progress).await);
            }
            reports
        };

        let itinerary = self.synthesize(&reports).await;
        emit(progress, PlanEvent::for_itinerary(&itinerary));

        let completed = reports.iter().filter(|o| o.is_completed()).count();
        info!(
            "Planned trip in {:.3}s ({}/{} categories, itinerary {})",
            start_time.elapsed().as_secs_f64(),
            completed,
            reports.len(),
            if itinerary.is_ok() { "ready" } else { "unavailable" }
        );

        TripPlan { reports, itinerary }
    }

    async fn research_and_report(
        &self,
        category: Category,
        trip: &TripRequest,
        progress: Option<&UnboundedSender<PlanEvent>>,
    ) -> CategoryOutcome {
        let outcome = self.research(category, trip).await;
        emit(progress, PlanEvent::for_outcome(&outcome));
        outcome
    }

    /// Produce the report of a single category. Never fails the request:
    /// a dispatch failure becomes a `Failed` outcome naming the category.
    #[instrument(skip(self, trip), fields(category = %category))]
    pub async fn research(&self, category: Category, trip: &TripRequest) -> CategoryOutcome {
        let task = instructions::build(category, trip);
        let context = self.enrich(category, trip, task.context).await;
        let agent = self.roster.get(task.agent);

        match self
            .dispatcher
            .dispatch(agent, &context, &task.instruction)
            .await
        {
            Ok(markdown) => {
                info!("{} report ready ({} bytes)", category, markdown.len());
                CategoryOutcome::Completed(CategoryReport::new(
                    category,
                    normalize_image_urls(&markdown).into_owned(),
                ))
            }
            Err(e) => {
                error!("{} research failed: {}", category, e);
                CategoryOutcome::Failed {
                    category,
                    error: e.for_category(category),
                }
            }
        }
    }

    /// Merge the five reports into the final itinerary
    pub async fn synthesize(&self, reports: &[CategoryOutcome]) -> crate::Result<FinalItinerary> {
        let reports = ReportSet::from_outcomes(reports).inspect_err(|e| {
            warn!("Skipping itinerary synthesis: {}", e);
        })?;

        let task = aggregator::build(&reports);
        let agent = self.roster.get(task.agent);
        let markdown = self
            .dispatcher
            .dispatch(agent, &task.context, &task.instruction)
            .await
            .inspect_err(|e| error!("Itinerary synthesis failed: {}", e))?;

        Ok(FinalItinerary::new(
            normalize_image_urls(&markdown).into_owned(),
        ))
    }

    async fn enrich(&self, category: Category, trip: &TripRequest, context: String) -> String {
        let mut context = context;
        for source in self.sources.iter().filter(|s| s.serves(category)) {
            match source.lookup(trip).await {
                Ok(Some(data)) if !data.trim().is_empty() => {
                    debug!("Adding reference data from {}", source.name());
                    context = tools::append_reference(&context, source.name(), &data);
                }
                Ok(_) => warn!("{} returned no data for {}", source.name(), category),
                Err(e) => warn!("{} lookup failed for {}: {}", source.name(), category, e),
            }
        }
        context
    }
}

fn emit(progress: Option<&UnboundedSender<PlanEvent>>, event: PlanEvent) {
    if let Some(sender) = progress
        && sender.unbounded_send(event).is_err()
    {
        debug!("Progress receiver dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TripSageError;
    use crate::agents::AgentProfile;
    use crate::config::TripSageConfig;
    use async_trait::async_trait;
    use futures::StreamExt;
    use futures::channel::mpsc;

    /// Echoes the agent and the first context line, fails on a marker
    struct EchoDispatcher;

    #[async_trait]
    impl Dispatcher for EchoDispatcher {
        async fn dispatch(
            &self,
            agent: &AgentProfile,
            context: &str,
            _instruction: &str,
        ) -> crate::Result<String> {
            if context.contains("FAIL") {
                return Err(TripSageError::dispatch("quota exceeded"));
            }
            Ok(format!(
                "# {}\n{}\n![pic](//img.example/x.jpg)",
                agent.kind,
                context.lines().next().unwrap_or_default()
            ))
        }
    }

    fn planner() -> TripPlanner {
        TripPlanner::new(
            Arc::new(EchoDispatcher),
            AgentRoster::from_config(&TripSageConfig::default()),
        )
    }

    fn trip(dates: &str) -> TripRequest {
        TripRequest::from_fields("Mumbai", "Paris", dates, "museums, food", "80000").unwrap()
    }

    #[tokio::test]
    async fn test_research_normalizes_images() {
        let outcome = planner().research(Category::Destination, &trip("Dec 20-25, 2024")).await;
        let report = outcome.report().unwrap();
        assert!(report.markdown.contains("![pic](https://img.example/x.jpg)"));
        assert!(report.markdown.starts_with("# web_research"));
    }

    #[tokio::test]
    async fn test_failure_is_scoped_to_category() {
        // only the date-bearing contexts carry the marker
        let plan = planner().plan(&trip("FAIL"), None).await;
        let failed: Vec<Category> = plan
            .reports
            .iter()
            .filter(|o| !o.is_completed())
            .map(CategoryOutcome::category)
            .collect();
        assert_eq!(failed, vec![Category::Events, Category::Weather, Category::Flights, Category::Hotels]);
        assert!(matches!(
            plan.itinerary,
            Err(TripSageError::IncompleteReports { .. })
        ));
    }

    #[tokio::test]
    async fn test_progress_events_follow_completion() {
        let (tx, rx) = mpsc::unbounded();
        let plan = planner().plan(&trip("Dec 20-25, 2024"), Some(tx)).await;
        let events: Vec<PlanEvent> = rx.collect().await;

        assert!(plan.is_complete());
        assert_eq!(events.len(), 6);
        assert!(matches!(
            events[0],
            PlanEvent::CategoryCompleted {
                category: Category::Destination,
                ..
            }
        ));
        assert!(matches!(events[5], PlanEvent::ItineraryCompleted { .. }));
    }

    #[tokio::test]
    async fn test_parallel_keeps_category_order() {
        let plan = planner().parallel(true).plan(&trip("Dec 20-25, 2024"), None).await;
        let order: Vec<Category> = plan.reports.iter().map(CategoryOutcome::category).collect();
        assert_eq!(order, Category::ALL.to_vec());
        assert!(plan.itinerary.unwrap().markdown().starts_with("# reporter"));
    }
}
