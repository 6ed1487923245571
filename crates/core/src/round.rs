//! Round State Machine and Game Loop
//!
//! A round moves through `AwaitingContent -> Scored -> (AwaitingContent | Locked)`.
//! `iteration_count` counts regeneration requests: the first post is written
//! at count 0, each "regenerate" answer bumps the count by one, and once a
//! scored iteration sits at the cap the round locks without asking again.

use crate::agent::{
    Agent, AgentError, CreatorBrief, PersonaReaction, ReactionRequest, RevisionFeedback,
    ScoringRequest,
};
use crate::persona::Persona;
use crate::platform::{Platform, Rubric, RubricError, RubricTable};
use crate::score::{ScoreReport, Verdict};
use tracing::info;

pub const DEFAULT_MAX_ITERATIONS: u32 = 3;

/// Process-wide game configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct GameSettings {
    pub rubrics: RubricTable,
    /// Maximum number of regenerations per round.
    pub max_iterations: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            rubrics: RubricTable::builtin(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    AwaitingContent,
    Scored,
    Locked,
}

/// What the player wants after seeing a scored iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Regenerate,
    LockIn,
    /// Abandon the round without a verdict.
    Quit,
}

/// The agent call currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Creating,
    Scoring,
    Reacting,
}

#[derive(Debug, thiserror::Error)]
pub enum RoundError {
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error(transparent)]
    Rubric(#[from] RubricError),
    #[error("Cannot {action} while the round is {state:?}")]
    InvalidTransition {
        state: RoundState,
        action: &'static str,
    },
    #[error("Regeneration limit of {0} reached")]
    IterationCapReached(u32),
    #[error("Round abandoned by the player")]
    Interrupted,
}

/// The outputs of one generate, score and react pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Iteration {
    pub candidate_post: String,
    pub score: ScoreReport,
    pub reaction: PersonaReaction,
}

/// A round in progress. Owned exclusively by the game loop.
#[derive(Debug, Clone)]
pub struct Round {
    topic: String,
    rubric: Rubric,
    persona: &'static Persona,
    max_iterations: u32,
    iteration_count: u32,
    state: RoundState,
    latest: Option<Iteration>,
}

impl Round {
    pub fn new(
        topic: impl Into<String>,
        rubric: Rubric,
        persona: &'static Persona,
        max_iterations: u32,
    ) -> Self {
        Self {
            topic: topic.into(),
            rubric,
            persona,
            max_iterations,
            iteration_count: 0,
            state: RoundState::AwaitingContent,
            latest: None,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn platform(&self) -> Platform {
        self.rubric.platform
    }

    pub fn rubric(&self) -> &Rubric {
        &self.rubric
    }

    pub fn persona(&self) -> &'static Persona {
        self.persona
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn iteration_count(&self) -> u32 {
        self.iteration_count
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// 1-based number of the post currently being written or shown.
    pub fn attempt(&self) -> u32 {
        self.iteration_count + 1
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_iterations + 1
    }

    pub fn latest(&self) -> Option<&Iteration> {
        self.latest.as_ref()
    }

    /// True once no further regeneration may be requested.
    pub fn at_cap(&self) -> bool {
        self.iteration_count >= self.max_iterations
    }

    /// Builds the creator's brief, including feedback from the last iteration
    /// when this is a regeneration.
    pub fn creator_brief(&self) -> CreatorBrief {
        CreatorBrief {
            topic: self.topic.clone(),
            platform: self.rubric.platform,
            format_hint: self.rubric.format_hint.clone(),
            attempt: self.attempt(),
            max_attempts: self.max_attempts(),
            revision: self.latest.as_ref().map(|it| RevisionFeedback {
                previous_post: it.candidate_post.clone(),
                algorithm_feedback: feedback_summary(&it.score),
                audience_handle: it.reaction.persona.handle.to_string(),
                audience_feedback: it.reaction.text.clone(),
            }),
        }
    }

    /// `AwaitingContent -> Scored`.
    pub fn record(&mut self, iteration: Iteration) -> Result<(), RoundError> {
        self.expect_state(RoundState::AwaitingContent, "record an iteration")?;
        self.latest = Some(iteration);
        self.state = RoundState::Scored;
        Ok(())
    }

    /// `Scored -> AwaitingContent`, spending one regeneration.
    pub fn regenerate(&mut self) -> Result<(), RoundError> {
        self.expect_state(RoundState::Scored, "regenerate")?;
        if self.at_cap() {
            return Err(RoundError::IterationCapReached(self.max_iterations));
        }
        self.iteration_count += 1;
        self.state = RoundState::AwaitingContent;
        Ok(())
    }

    /// `Scored -> Locked`. Consumes the round so the result can no longer change.
    pub fn lock(mut self, forced: bool) -> Result<LockedRound, RoundError> {
        self.expect_state(RoundState::Scored, "lock in")?;
        let iteration = self.latest.take().ok_or(RoundError::InvalidTransition {
            state: self.state,
            action: "lock in",
        })?;
        Ok(LockedRound {
            topic: self.topic,
            platform: self.rubric.platform,
            persona: self.persona,
            iteration_count: self.iteration_count,
            max_iterations: self.max_iterations,
            forced,
            iteration,
        })
    }

    fn expect_state(&self, expected: RoundState, action: &'static str) -> Result<(), RoundError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(RoundError::InvalidTransition {
                state: self.state,
                action,
            })
        }
    }
}

fn feedback_summary(score: &ScoreReport) -> String {
    let mut lines: Vec<String> = score
        .breakdown
        .iter()
        .map(|s| format!("- {}: {:.0}/100", s.criterion, s.score))
        .collect();
    lines.push(format!(
        "Weighted total: {:.1}/100 (needs {:.0}) -> {}",
        score.weighted_sum, score.pass_threshold, score.verdict
    ));
    if !score.analysis.is_empty() {
        lines.push(score.analysis.clone());
    }
    if !score.recommendation.is_empty() {
        lines.push(format!("Top recommendation: {}", score.recommendation));
    }
    lines.join("\n")
}

/// The final, immutable result of a round.
#[derive(Debug, Clone, PartialEq)]
pub struct LockedRound {
    topic: String,
    platform: Platform,
    persona: &'static Persona,
    iteration_count: u32,
    max_iterations: u32,
    forced: bool,
    iteration: Iteration,
}

impl LockedRound {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn persona(&self) -> &'static Persona {
        self.persona
    }

    pub fn iteration_count(&self) -> u32 {
        self.iteration_count
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Whether the lock-in was forced by the regeneration cap.
    pub fn forced(&self) -> bool {
        self.forced
    }

    pub fn candidate_post(&self) -> &str {
        &self.iteration.candidate_post
    }

    pub fn score(&self) -> &ScoreReport {
        &self.iteration.score
    }

    pub fn reaction(&self) -> &PersonaReaction {
        &self.iteration.reaction
    }

    pub fn verdict(&self) -> Verdict {
        self.iteration.score.verdict
    }
}

/// Presentation and player input for a running round.
pub trait RoundObserver {
    /// Called before each agent call.
    fn on_stage(&mut self, _stage: Stage, _round: &Round) {}

    /// Called once an iteration has been generated, scored and reacted to.
    fn on_scored(&mut self, round: &Round);

    /// Asked after each scored iteration unless the cap forces a lock-in.
    fn decide(&mut self, round: &Round) -> Decision;

    fn on_locked(&mut self, _round: &LockedRound) {}
}

/// Drives rounds through the three agents.
pub struct GameLoop<C, S, A> {
    settings: GameSettings,
    creator: C,
    simulator: S,
    audience: A,
}

impl<C, S, A> GameLoop<C, S, A>
where
    C: Agent<Input = CreatorBrief, Output = String>,
    S: Agent<Input = ScoringRequest, Output = ScoreReport>,
    A: Agent<Input = ReactionRequest, Output = PersonaReaction>,
{
    pub fn new(settings: GameSettings, creator: C, simulator: S, audience: A) -> Self {
        Self {
            settings,
            creator,
            simulator,
            audience,
        }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Plays one round to completion.
    ///
    /// Agent calls run one at a time. Any agent failure aborts the round and
    /// the partial round is dropped.
    pub async fn run_round<O: RoundObserver>(
        &self,
        topic: &str,
        platform: Platform,
        persona: &'static Persona,
        observer: &mut O,
    ) -> Result<LockedRound, RoundError> {
        let rubric = self.settings.rubrics.get(platform)?.clone();
        let mut round = Round::new(topic, rubric, persona, self.settings.max_iterations);
        info!(topic, %platform, persona = persona.handle, "Round started");

        loop {
            let iteration = self.play_iteration(&round, observer).await?;
            round.record(iteration)?;
            observer.on_scored(&round);

            let forced = round.at_cap();
            if forced {
                info!(
                    iteration_count = round.iteration_count(),
                    "Regeneration limit reached, locking in"
                );
            } else {
                match observer.decide(&round) {
                    Decision::Regenerate => {
                        round.regenerate()?;
                        info!(iteration_count = round.iteration_count(), "Regenerating");
                        continue;
                    }
                    Decision::Quit => {
                        info!(iteration_count = round.iteration_count(), "Round abandoned");
                        return Err(RoundError::Interrupted);
                    }
                    Decision::LockIn => {}
                }
            }

            let locked = round.lock(forced)?;
            info!(
                verdict = %locked.verdict(),
                weighted_sum = locked.score().weighted_sum,
                iteration_count = locked.iteration_count(),
                forced,
                "Round locked in"
            );
            observer.on_locked(&locked);
            return Ok(locked);
        }
    }

    async fn play_iteration<O: RoundObserver>(
        &self,
        round: &Round,
        observer: &mut O,
    ) -> Result<Iteration, RoundError> {
        observer.on_stage(Stage::Creating, round);
        let candidate_post = self.creator.run(&round.creator_brief()).await?;
        if candidate_post.trim().is_empty() {
            return Err(AgentError::EmptyResponse(self.creator.name().to_string()).into());
        }

        observer.on_stage(Stage::Scoring, round);
        let score = self
            .simulator
            .run(&ScoringRequest {
                topic: round.topic().to_string(),
                post: candidate_post.clone(),
                rubric: round.rubric().clone(),
            })
            .await?;

        observer.on_stage(Stage::Reacting, round);
        let reaction = self
            .audience
            .run(&ReactionRequest {
                topic: round.topic().to_string(),
                platform: round.platform(),
                post: candidate_post.clone(),
                persona: round.persona(),
            })
            .await?;

        Ok(Iteration {
            candidate_post,
            score,
            reaction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::{PERSONAS, Persona};
    use crate::score::{OverallSignals, ScoreBreakdown};

    fn rubric() -> Rubric {
        RubricTable::builtin().get(Platform::YouTube).unwrap().clone()
    }

    fn iteration(post: &str, sum: f64) -> Iteration {
        let rubric = rubric();
        let breakdown: ScoreBreakdown = rubric
            .criteria
            .iter()
            .map(|c| (c.name.clone(), sum))
            .collect();
        Iteration {
            candidate_post: post.into(),
            score: ScoreReport::from_breakdown(
                &rubric,
                breakdown,
                OverallSignals {
                    reach: sum,
                    engagement: sum,
                    virality: sum,
                },
                "meh".into(),
                "better thumbnail".into(),
            ),
            reaction: PersonaReaction {
                persona: &PERSONAS[0],
                text: "lowkey mid".into(),
            },
        }
    }

    fn round(cap: u32) -> Round {
        Round::new("Hollow Knight: Silksong", rubric(), &PERSONAS[0], cap)
    }

    #[test]
    fn new_round_awaits_content() {
        let round = round(3);
        assert_eq!(round.state(), RoundState::AwaitingContent);
        assert_eq!(round.iteration_count(), 0);
        assert_eq!(round.attempt(), 1);
        assert_eq!(round.max_attempts(), 4);
        assert!(round.creator_brief().revision.is_none());
    }

    #[test]
    fn transitions_follow_the_state_machine() {
        let mut round = round(3);
        assert!(matches!(
            round.regenerate(),
            Err(RoundError::InvalidTransition { state: RoundState::AwaitingContent, .. })
        ));

        round.record(iteration("P1", 40.0)).unwrap();
        assert_eq!(round.state(), RoundState::Scored);
        assert!(matches!(
            round.record(iteration("P1", 40.0)),
            Err(RoundError::InvalidTransition { state: RoundState::Scored, .. })
        ));

        round.regenerate().unwrap();
        assert_eq!(round.state(), RoundState::AwaitingContent);
        assert_eq!(round.iteration_count(), 1);
        assert!(round.clone().lock(false).is_err());
    }

    #[test]
    fn regeneration_brief_carries_previous_feedback() {
        let mut round = round(3);
        round.record(iteration("P1", 40.0)).unwrap();
        round.regenerate().unwrap();

        let brief = round.creator_brief();
        assert_eq!(brief.attempt, 2);
        let feedback = brief.revision.expect("regeneration carries feedback");
        assert_eq!(feedback.previous_post, "P1");
        assert_eq!(feedback.audience_handle, "CasualChloe");
        assert_eq!(feedback.audience_feedback, "lowkey mid");
        assert!(feedback.algorithm_feedback.contains("Weighted total: 40.0/100 (needs 60) -> FLOP"));
        assert!(feedback.algorithm_feedback.contains("Top recommendation: better thumbnail"));
    }

    #[test]
    fn regenerate_refuses_past_the_cap() {
        let mut round = round(1);
        round.record(iteration("P1", 10.0)).unwrap();
        round.regenerate().unwrap();
        round.record(iteration("P2", 10.0)).unwrap();
        assert!(round.at_cap());
        assert!(matches!(
            round.regenerate(),
            Err(RoundError::IterationCapReached(1))
        ));
        assert_eq!(round.iteration_count(), 1);
    }

    #[test]
    fn lock_freezes_latest_iteration() {
        let mut round = round(3);
        round.record(iteration("P1", 70.0)).unwrap();
        let locked = round.lock(false).unwrap();
        assert_eq!(locked.candidate_post(), "P1");
        assert_eq!(locked.verdict(), Verdict::Viral);
        assert_eq!(locked.iteration_count(), 0);
        assert_eq!(locked.persona(), Persona::of(PERSONAS[0].kind));
        assert!(!locked.forced());
    }
}
