//! Agent profiles
//!
//! Agents are plain configuration objects built once at startup and handed
//! to the planner by reference. A profile decides the persona (system
//! message), model and sampling temperature of every dispatch it serves.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::config::{AgentOverrides, TripSageConfig};

/// The three agents of the planning pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Researches destinations, attractions and events
    WebResearch,
    /// Handles weather, flights and accommodation
    Travel,
    /// Merges the research into the final itinerary
    Reporter,
}

impl AgentKind {
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            AgentKind::WebResearch => "web_research",
            AgentKind::Travel => "travel",
            AgentKind::Reporter => "reporter",
        }
    }
}

impl Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Persona and model settings of one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub kind: AgentKind,
    pub role: String,
    pub goal: String,
    pub attributes: String,
    pub model: String,
    pub temperature: f32,
}

impl AgentProfile {
    fn build(
        kind: AgentKind,
        role: &str,
        goal: &str,
        attributes: &str,
        overrides: &AgentOverrides,
        config: &TripSageConfig,
    ) -> Self {
        Self {
            kind,
            role: role.to_string(),
            goal: goal.to_string(),
            attributes: attributes.to_string(),
            model: overrides
                .model
                .clone()
                .unwrap_or_else(|| config.llm.model.clone()),
            temperature: overrides.temperature.unwrap_or(config.llm.temperature),
        }
    }

    /// System message sent with every task this agent handles
    #[must_use]
    pub fn system_prompt(&self) -> String {
        format!(
            "You are the {}.\nGoal: {}\nAttributes: {}\n\
             Answer in well-structured markdown only.",
            self.role, self.goal, self.attributes
        )
    }
}

/// The agents available to a planner
#[derive(Debug, Clone)]
pub struct AgentRoster {
    web_research: AgentProfile,
    travel: AgentProfile,
    reporter: AgentProfile,
}

impl AgentRoster {
    /// Build all agent profiles from configuration
    #[must_use]
    pub fn from_config(config: &TripSageConfig) -> Self {
        Self {
            web_research: AgentProfile::build(
                AgentKind::WebResearch,
                "Destination Research Specialist",
                "Research destinations, attractions, local culture and upcoming events, \
                 illustrated with real photographs",
                "thorough, visual, up to date, cites well-known sources",
                &config.agents.web_research,
                config,
            ),
            travel: AgentProfile::build(
                AgentKind::Travel,
                "Travel Logistics Agent",
                "Find weather expectations, flights and accommodation that fit the \
                 traveller's dates and budget",
                "practical, price-conscious, precise with times and amounts",
                &config.agents.travel,
                config,
            ),
            reporter: AgentProfile::build(
                AgentKind::Reporter,
                "Travel Report Writer",
                "Merge research findings into one coherent, easy to follow travel itinerary",
                "organised, faithful to source material, keeps every image and caption",
                &config.agents.reporter,
                config,
            ),
        }
    }

    #[must_use]
    pub fn get(&self, kind: AgentKind) -> &AgentProfile {
        match kind {
            AgentKind::WebResearch => &self.web_research,
            AgentKind::Travel => &self.travel,
            AgentKind::Reporter => &self.reporter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_use_default_model() {
        let config = TripSageConfig::default();
        let roster = AgentRoster::from_config(&config);

        for kind in [AgentKind::WebResearch, AgentKind::Travel, AgentKind::Reporter] {
            let profile = roster.get(kind);
            assert_eq!(profile.kind, kind);
            assert_eq!(profile.model, config.llm.model);
            assert_eq!(profile.temperature, config.llm.temperature);
        }
    }

    #[test]
    fn test_overrides_apply_per_agent() {
        let mut config = TripSageConfig::default();
        config.agents.reporter.model = Some("gpt-4o".to_string());
        config.agents.reporter.temperature = Some(0.2);

        let roster = AgentRoster::from_config(&config);
        assert_eq!(roster.get(AgentKind::Reporter).model, "gpt-4o");
        assert_eq!(roster.get(AgentKind::Reporter).temperature, 0.2);
        assert_eq!(roster.get(AgentKind::Travel).model, config.llm.model);
    }

    #[test]
    fn test_system_prompt_mentions_role_and_goal() {
        let roster = AgentRoster::from_config(&TripSageConfig::default());
        let prompt = roster.get(AgentKind::Travel).system_prompt();
        assert!(prompt.starts_with("You are the Travel Logistics Agent."));
        assert!(prompt.contains("Goal: Find weather expectations"));
    }
}
