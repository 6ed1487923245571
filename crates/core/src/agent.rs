//! Game Agents
//!
//! The three LLM-backed roles in a round share one capability: take a
//! structured input, make one model call, and return a structured output.
//! That capability is the [`Agent`] trait; [`ContentCreator`],
//! [`AlgorithmSimulator`] and [`AudiencePersona`] are its implementations.

pub mod algorithm;
pub mod audience;
pub mod creator;

pub use algorithm::{AlgorithmSimulator, ScoringRequest};
pub use audience::{AudiencePersona, PersonaReaction, ReactionRequest};
pub use creator::{ContentCreator, CreatorBrief, RevisionFeedback};

use async_openai::error::OpenAIError;
use async_trait::async_trait;
use std::time::Duration;

/// Failure of a generation, scoring or reaction call. Any of these aborts the
/// current round.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Model request failed: {0}")]
    Api(#[from] OpenAIError),
    #[error("Model request timed out after {0:?}")]
    Timeout(Duration),
    #[error("{0} returned an empty response")]
    EmptyResponse(String),
    #[error("{agent} returned a malformed response: {reason}")]
    MalformedResponse { agent: String, reason: String },
}

/// One LLM-backed role in the game.
#[async_trait]
pub trait Agent: Send + Sync {
    type Input: Send + Sync;
    type Output: Send;

    /// Display name used in logs and error messages.
    fn name(&self) -> &str;

    async fn run(&self, input: &Self::Input) -> Result<Self::Output, AgentError>;
}

#[async_trait]
impl<T: Agent + ?Sized> Agent for &T {
    type Input = T::Input;
    type Output = T::Output;

    fn name(&self) -> &str {
        (**self).name()
    }

    async fn run(&self, input: &Self::Input) -> Result<Self::Output, AgentError> {
        (**self).run(input).await
    }
}

/// Rejects blank model output on behalf of `agent`.
pub(crate) fn non_empty(agent: &str, text: String) -> Result<String, AgentError> {
    if text.trim().is_empty() {
        Err(AgentError::EmptyResponse(agent.to_string()))
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_rejects_whitespace() {
        let err = non_empty("Content Creator", "  \n".into()).unwrap_err();
        assert_eq!(err.to_string(), "Content Creator returned an empty response");
        assert_eq!(non_empty("x", "post".into()).unwrap(), "post");
    }

    #[test]
    fn error_messages_are_user_readable() {
        let err = AgentError::Timeout(Duration::from_secs(60));
        assert_eq!(err.to_string(), "Model request timed out after 60s");

        let err = AgentError::MalformedResponse {
            agent: "Algorithm Simulator".into(),
            reason: "missing criterion 'hook_strength'".into(),
        };
        assert!(err.to_string().contains("missing criterion"));
    }
}
