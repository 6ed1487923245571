//! Algorithm Simulator: scores a post the way a platform's recommendation
//! engine would, against that platform's rubric.

use super::{Agent, AgentError};
use async_trait::async_trait;
use crate::llm_client::{CompletionRequest, LLMClient};
use crate::platform::Rubric;
use crate::score::{OverallSignals, ScoreBreakdown, ScoreReport, clamp_score};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

const AGENT_NAME: &str = "Algorithm Simulator";

/// Used for overall signals the model leaves out.
const NEUTRAL_SIGNAL: f64 = 50.0;

const SYSTEM_PROMPT: &str = "You are the Algorithm Simulator, a cold, analytical system that \
evaluates content exactly like a social platform's recommendation algorithm. You think in \
signals, weights and distribution mechanics: completion rate, dwell time, engagement velocity, \
shares. You have no feelings about the content.

Score the post on every criterion of the platform rubric you are given, each from 0 to 100. \
Be brutally honest: a mediocre post scores 40-60, not 70-80, and every score must be justified \
by your reasoning.

Reply with a single JSON object and nothing else, shaped like:
{
  \"criteria\": { \"<criterion_key>\": <0-100>, ... },
  \"reach\": <0-100>,
  \"engagement\": <0-100>,
  \"virality\": <0-100>,
  \"analysis\": \"<2-3 sentences of cold, platform-specific distribution prediction>\",
  \"recommendation\": \"<the single most impactful change>\"
}
Use exactly the criterion keys from the rubric.";

/// A candidate post to score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringRequest {
    pub topic: String,
    pub post: String,
    pub rubric: Rubric,
}

impl ScoringRequest {
    pub fn prompt(&self) -> String {
        format!(
            "Evaluate this {platform} post about '{topic}' using the platform's scoring rubric.\n\n\
             --- SCORING RUBRIC ---\n{rubric}\n\n\
             --- CONTENT TO EVALUATE ---\n{post}",
            platform = self.rubric.platform,
            topic = self.topic,
            rubric = self.rubric.to_prompt(),
            post = self.post,
        )
    }
}

#[derive(Debug, Deserialize)]
struct RawScores {
    criteria: HashMap<String, f64>,
    #[serde(default)]
    reach: Option<f64>,
    #[serde(default)]
    engagement: Option<f64>,
    #[serde(default)]
    virality: Option<f64>,
    #[serde(default)]
    analysis: Option<String>,
    #[serde(default)]
    recommendation: Option<String>,
}

pub struct AlgorithmSimulator {
    llm: Arc<dyn LLMClient>,
}

impl AlgorithmSimulator {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Agent for AlgorithmSimulator {
    type Input = ScoringRequest;
    type Output = ScoreReport;

    fn name(&self) -> &str {
        AGENT_NAME
    }

    async fn run(&self, request: &ScoringRequest) -> Result<ScoreReport, AgentError> {
        let reply = self
            .llm
            .complete(CompletionRequest::json(SYSTEM_PROMPT, request.prompt()))
            .await?;
        let report = parse_report(&reply, &request.rubric)?;
        info!(
            platform = %request.rubric.platform,
            weighted_sum = report.weighted_sum,
            verdict = %report.verdict,
            "Scored candidate post"
        );
        Ok(report)
    }
}

/// Parses the simulator's JSON reply and recomputes the verdict locally.
///
/// Tolerates prose or Markdown fences around the object. Every rubric
/// criterion must be present; criterion keys are matched case-insensitively
/// with spaces and hyphens treated as underscores.
pub fn parse_report(reply: &str, rubric: &Rubric) -> Result<ScoreReport, AgentError> {
    if reply.trim().is_empty() {
        return Err(AgentError::EmptyResponse(AGENT_NAME.to_string()));
    }
    let json = extract_json_object(reply).ok_or_else(|| malformed("no JSON object found"))?;
    let raw: RawScores =
        serde_json::from_str(json).map_err(|e| malformed(&format!("invalid JSON: {e}")))?;

    let scores: HashMap<String, f64> = raw
        .criteria
        .into_iter()
        .map(|(key, score)| (normalize_key(&key), score))
        .collect();

    let mut breakdown = ScoreBreakdown::new();
    for criterion in &rubric.criteria {
        let score = scores
            .get(&normalize_key(&criterion.name))
            .copied()
            .ok_or_else(|| malformed(&format!("missing criterion '{}'", criterion.name)))?;
        breakdown.push(criterion.name.clone(), score);
    }
    if scores.len() > breakdown.len() {
        warn!(
            extra = scores.len() - breakdown.len(),
            "Ignoring criteria not in the rubric"
        );
    }

    let signal = |v: Option<f64>| clamp_score(v.unwrap_or(NEUTRAL_SIGNAL));
    let signals = OverallSignals {
        reach: signal(raw.reach),
        engagement: signal(raw.engagement),
        virality: signal(raw.virality),
    };

    Ok(ScoreReport::from_breakdown(
        rubric,
        breakdown,
        signals,
        raw.analysis.unwrap_or_default().trim().to_string(),
        raw.recommendation.unwrap_or_default().trim().to_string(),
    ))
}

fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (start < end).then(|| &reply[start..=end])
}

fn normalize_key(key: &str) -> String {
    key.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

fn malformed(reason: &str) -> AgentError {
    AgentError::MalformedResponse {
        agent: AGENT_NAME.to_string(),
        reason: reason.to_string(),
    }
}
