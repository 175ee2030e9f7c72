//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tripsage::{AgentKind, AgentProfile, AgentRoster, Dispatcher, TripPlanner, TripSageConfig, TripSageError};

/// One recorded dispatch
#[derive(Debug, Clone)]
pub struct Call {
    pub agent: AgentKind,
    pub context: String,
    pub instruction: String,
}

/// Dispatcher answering with canned markdown. Contexts containing any of
/// the `fail_on` markers fail with a dispatch error.
#[derive(Default)]
pub struct StubDispatcher {
    pub calls: Mutex<Vec<Call>>,
    pub fail_on: Vec<String>,
}

impl StubDispatcher {
    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_on: vec![marker.to_string()],
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Dispatcher for StubDispatcher {
    async fn dispatch(
        &self,
        agent: &AgentProfile,
        context: &str,
        instruction: &str,
    ) -> tripsage::Result<String> {
        self.calls.lock().unwrap().push(Call {
            agent: agent.kind,
            context: context.to_string(),
            instruction: instruction.to_string(),
        });

        if self.fail_on.iter().any(|marker| context.contains(marker.as_str())) {
            return Err(TripSageError::dispatch("rate limit exceeded"));
        }

        let heading = context.lines().next().unwrap_or_default();
        Ok(match agent.kind {
            AgentKind::Reporter => {
                "# Your Paris itinerary\n\n![Louvre](upload.wikimedia.org/louvre.jpg)\n*The Louvre*"
                    .to_string()
            }
            _ => format!("## {heading}\n\n![View](//img.example/{}.jpg)\nDetails.", agent.kind),
        })
    }
}

pub fn paris_trip() -> tripsage::TripRequest {
    tripsage::TripRequest::from_fields("Mumbai", "Paris", "Dec 20-25, 2024", "museums, food", "80000")
        .unwrap()
}

pub fn planner(dispatcher: Arc<StubDispatcher>) -> TripPlanner {
    TripPlanner::new(dispatcher, AgentRoster::from_config(&TripSageConfig::default()))
}
