//! Content Creator: writes and revises platform-native gaming posts.

use super::{Agent, AgentError, non_empty};
use crate::llm_client::{CompletionRequest, LLMClient};
use crate::platform::Platform;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

const SYSTEM_PROMPT: &str = "You are the Content Creator, a trend-savvy gaming creator who \
knows every platform inside out and writes content that feels native to it.

Given a trending gaming topic and a target platform, write one complete, ready-to-post piece \
of content using this structure:

PLATFORM: <platform>
TOPIC: <topic>
FORMAT: <short-form video, tweet thread, carousel, ...>
HOOK: <the opening line or first three seconds>
MAIN CONTENT: <the caption, script or thread>
HASHTAGS: <platform-appropriate hashtags>
CREATOR NOTES: <one or two lines on why this angle and format>

Write TikToks as scripts with visual directions, tweets as punchy ratio-bait takes, YouTube as \
title + thumbnail concept + outline, and Instagram visual-first with a caption. Use real \
community language and references. Be bold; safe content does not go viral.

When you receive feedback from the Algorithm Simulator and an audience member, revise the post \
to address it while keeping the energy, and say briefly what you changed.";

/// Feedback from the previous attempt, used to steer a regeneration.
#[derive(Debug, Clone, PartialEq)]
pub struct RevisionFeedback {
    pub previous_post: String,
    pub algorithm_feedback: String,
    pub audience_handle: String,
    pub audience_feedback: String,
}

/// Everything the creator needs to write (or rewrite) a post.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatorBrief {
    pub topic: String,
    pub platform: Platform,
    pub format_hint: String,
    /// 1-based attempt number within the round.
    pub attempt: u32,
    pub max_attempts: u32,
    pub revision: Option<RevisionFeedback>,
}

impl CreatorBrief {
    pub fn prompt(&self) -> String {
        match &self.revision {
            None => format!(
                "Create a {platform} post about this trending gaming topic: {topic}\n\n\
                 Platform: {platform}\n\
                 Format hint: {hint}\n\n\
                 Make it feel native to {platform}. Go hard, safe content doesn't go viral.",
                platform = self.platform,
                topic = self.topic,
                hint = self.format_hint,
            ),
            Some(feedback) => format!(
                "REVISION REQUEST (attempt {attempt}/{max}):\n\n\
                 Your previous {platform} post about '{topic}':\n{previous}\n\n\
                 --- ALGORITHM FEEDBACK ---\n{algorithm}\n\n\
                 --- AUDIENCE FEEDBACK ({handle}) ---\n{audience}\n\n\
                 Revise the post to address their concerns. Keep what works, fix what doesn't, \
                 and note what you changed.",
                attempt = self.attempt,
                max = self.max_attempts,
                platform = self.platform,
                topic = self.topic,
                previous = feedback.previous_post,
                algorithm = feedback.algorithm_feedback,
                handle = feedback.audience_handle,
                audience = feedback.audience_feedback,
            ),
        }
    }
}

pub struct ContentCreator {
    llm: Arc<dyn LLMClient>,
}

impl ContentCreator {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Agent for ContentCreator {
    type Input = CreatorBrief;
    type Output = String;

    fn name(&self) -> &str {
        "Content Creator"
    }

    async fn run(&self, brief: &CreatorBrief) -> Result<String, AgentError> {
        info!(
            topic = %brief.topic,
            platform = %brief.platform,
            attempt = brief.attempt,
            revision = brief.revision.is_some(),
            "Generating candidate post"
        );
        let reply = self
            .llm
            .complete(CompletionRequest::text(SYSTEM_PROMPT, brief.prompt()))
            .await?;
        non_empty(self.name(), reply)
    }
}
