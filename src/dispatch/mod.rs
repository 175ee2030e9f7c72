//! Task dispatch boundary
//!
//! A dispatcher hands one (context, instruction) pair to an agent and
//! returns the agent's markdown answer. Retries, timeouts and model
//! selection live behind this trait, never in the planner.

mod chat;

pub use chat::ChatDispatcher;

use async_trait::async_trait;

use crate::agents::AgentProfile;

#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Resolve a task into a markdown report
    async fn dispatch(
        &self,
        agent: &AgentProfile,
        context: &str,
        instruction: &str,
    ) -> crate::Result<String>;
}
