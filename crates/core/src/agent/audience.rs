//! Audience Persona: reacts to a post as a member of the gaming community.

use super::{Agent, AgentError, non_empty};
use crate::llm_client::{CompletionRequest, LLMClient};
use crate::persona::Persona;
use crate::platform::Platform;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct ReactionRequest {
    pub topic: String,
    pub platform: Platform,
    pub post: String,
    pub persona: &'static Persona,
}

impl ReactionRequest {
    pub fn prompt(&self) -> String {
        format!(
            "You just saw this on your {platform} feed. It's about '{topic}'. \
             React naturally as yourself.\n\n--- THE POST ---\n{post}",
            platform = self.platform,
            topic = self.topic,
            post = self.post,
        )
    }
}

/// A reaction attributed to one persona.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaReaction {
    pub persona: &'static Persona,
    pub text: String,
}

pub struct AudiencePersona {
    llm: Arc<dyn LLMClient>,
}

impl AudiencePersona {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Agent for AudiencePersona {
    type Input = ReactionRequest;
    type Output = PersonaReaction;

    fn name(&self) -> &str {
        "Audience Persona"
    }

    async fn run(&self, request: &ReactionRequest) -> Result<PersonaReaction, AgentError> {
        info!(persona = request.persona.handle, "Collecting audience reaction");
        let reply = self
            .llm
            .complete(CompletionRequest::text(
                request.persona.system_prompt,
                request.prompt(),
            ))
            .await?;
        Ok(PersonaReaction {
            persona: request.persona,
            text: non_empty(request.persona.handle, reply)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::MockLLMClient;
    use crate::persona::{PersonaKind, PERSONAS};

    fn request(kind: PersonaKind) -> ReactionRequest {
        ReactionRequest {
            topic: "Silksong".into(),
            platform: Platform::Instagram,
            post: "the wait is over".into(),
            persona: Persona::of(kind),
        }
    }

    #[tokio::test]
    async fn reaction_uses_persona_system_prompt() {
        let mut llm = MockLLMClient::new();
        llm.expect_complete()
            .withf(|req| {
                req.system_prompt.starts_with("You are PixelPete")
                    && req.user_prompt.contains("your Instagram feed")
                    && req.user_prompt.ends_with("the wait is over")
            })
            .times(1)
            .returning(|_| Ok("this has soul".into()));

        let audience = AudiencePersona::new(Arc::new(llm));
        let reaction = audience
            .run(&request(PersonaKind::RetroIndieEnthusiast))
            .await
            .unwrap();
        assert_eq!(reaction.text, "this has soul");
        assert_eq!(reaction.persona, &PERSONAS[2]);
    }

    #[tokio::test]
    async fn blank_reaction_names_the_persona() {
        let mut llm = MockLLMClient::new();
        llm.expect_complete().returning(|_| Ok("\n".into()));

        let audience = AudiencePersona::new(Arc::new(llm));
        let err = audience
            .run(&request(PersonaKind::CompetitiveEsportsFan))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "TryHard_Tyler returned an empty response");
    }
}
