//! Score Math
//!
//! Weighted sums, the viral/flop verdict and the rating bands used when the
//! results are presented. Everything here is pure so the verdict is fully
//! determined by a score breakdown and a rubric.

use crate::platform::{Rubric, WEIGHT_TOTAL};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The score one criterion received, on a 0..=100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub criterion: String,
    pub score: f64,
}

/// Per-criterion scores, kept in the rubric's order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown(Vec<CriterionScore>);

impl ScoreBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a score, clamping it to 0..=100.
    pub fn push(&mut self, criterion: impl Into<String>, score: f64) {
        self.0.push(CriterionScore {
            criterion: criterion.into(),
            score: clamp_score(score),
        });
    }

    pub fn get(&self, criterion: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|s| s.criterion == criterion)
            .map(|s| s.score)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CriterionScore> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for ScoreBreakdown {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut breakdown = Self::new();
        for (criterion, score) in iter {
            breakdown.push(criterion, score);
        }
        breakdown
    }
}

pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

/// Σ score × weight / 100 over the rubric's criteria.
///
/// Criteria missing from the breakdown contribute nothing; scores for names
/// the rubric does not know are ignored.
pub fn weighted_sum(rubric: &Rubric, breakdown: &ScoreBreakdown) -> f64 {
    let total: f64 = rubric
        .criteria
        .iter()
        .filter_map(|c| breakdown.get(&c.name).map(|s| s * f64::from(c.weight)))
        .sum();
    total / f64::from(WEIGHT_TOTAL)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Viral,
    Flop,
}

impl Verdict {
    /// A sum exactly on the threshold passes.
    pub fn judge(weighted_sum: f64, pass_threshold: f64) -> Self {
        if weighted_sum >= pass_threshold {
            Verdict::Viral
        } else {
            Verdict::Flop
        }
    }

    pub fn is_viral(self) -> bool {
        self == Verdict::Viral
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Viral => write!(f, "VIRAL"),
            Verdict::Flop => write!(f, "FLOP"),
        }
    }
}

/// Headline signals the simulator reports alongside the rubric breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverallSignals {
    pub reach: f64,
    pub engagement: f64,
    pub virality: f64,
}

/// The Algorithm Simulator's structured verdict on one candidate post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub breakdown: ScoreBreakdown,
    pub signals: OverallSignals,
    pub weighted_sum: f64,
    pub pass_threshold: f64,
    pub verdict: Verdict,
    pub analysis: String,
    pub recommendation: String,
}

impl ScoreReport {
    /// Computes the weighted sum and verdict from `breakdown` against `rubric`.
    pub fn from_breakdown(
        rubric: &Rubric,
        breakdown: ScoreBreakdown,
        signals: OverallSignals,
        analysis: String,
        recommendation: String,
    ) -> Self {
        let weighted_sum = weighted_sum(rubric, &breakdown);
        Self {
            verdict: Verdict::judge(weighted_sum, rubric.pass_threshold),
            breakdown,
            signals,
            weighted_sum,
            pass_threshold: rubric.pass_threshold,
            analysis,
            recommendation,
        }
    }
}

/// Rating band for a single 0..=100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Viral,
    Strong,
    Decent,
    Weak,
    Fail,
}

impl Rating {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 85.0 => Rating::Viral,
            s if s >= 70.0 => Rating::Strong,
            s if s >= 50.0 => Rating::Decent,
            s if s >= 30.0 => Rating::Weak,
            _ => Rating::Fail,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rating::Viral => "VIRAL",
            Rating::Strong => "Strong",
            Rating::Decent => "Decent",
            Rating::Weak => "Weak",
            Rating::Fail => "FAIL",
        }
    }
}

/// The closing line printed under the final scorecard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Headline {
    GoingViral,
    Solid,
    Mid,
    Fail,
}

impl Headline {
    pub fn from_total(weighted_sum: f64) -> Self {
        match weighted_sum {
            s if s >= 80.0 => Headline::GoingViral,
            s if s >= 60.0 => Headline::Solid,
            s if s >= 40.0 => Headline::Mid,
            _ => Headline::Fail,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Headline::GoingViral => {
                "YOUR CONTENT IS GOING VIRAL! The algorithm gods smile upon you."
            }
            Headline::Solid => "Solid content. You'll get decent reach but no blowup.",
            Headline::Mid => "Mid at best. The algorithm will bury this after the first batch.",
            Headline::Fail => {
                "FAIL. This is getting 12 views and 3 of them are your alt accounts."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Criterion, Platform};

    fn sample_rubric(threshold: f64) -> Rubric {
        Rubric {
            platform: Platform::TikTok,
            description: "test".into(),
            format_hint: "test".into(),
            criteria: vec![
                Criterion::new("reach", 30, ""),
                Criterion::new("engagement", 40, ""),
                Criterion::new("virality", 30, ""),
            ],
            pass_threshold: threshold,
        }
    }

    fn signals() -> OverallSignals {
        OverallSignals {
            reach: 50.0,
            engagement: 50.0,
            virality: 50.0,
        }
    }

    #[test]
    fn weighted_sum_uses_rubric_weights() {
        let rubric = sample_rubric(55.0);
        let breakdown: ScoreBreakdown =
            [("reach", 20.0), ("engagement", 25.0), ("virality", 18.0)]
                .into_iter()
                .collect();
        let sum = weighted_sum(&rubric, &breakdown);
        assert!((sum - 21.4).abs() < 1e-9, "got {sum}");
        assert_eq!(Verdict::judge(sum, rubric.pass_threshold), Verdict::Flop);
    }

    #[test]
    fn sum_equal_to_threshold_is_viral() {
        let rubric = sample_rubric(55.0);
        let breakdown: ScoreBreakdown =
            [("reach", 55.0), ("engagement", 55.0), ("virality", 55.0)]
                .into_iter()
                .collect();
        let report = ScoreReport::from_breakdown(
            &rubric,
            breakdown,
            signals(),
            String::new(),
            String::new(),
        );
        assert_eq!(report.weighted_sum, 55.0);
        assert_eq!(report.verdict, Verdict::Viral);
        assert_eq!(report.pass_threshold, 55.0);
    }

    #[test]
    fn verdict_is_deterministic() {
        for (sum, expected) in [
            (0.0, Verdict::Flop),
            (54.999, Verdict::Flop),
            (55.0, Verdict::Viral),
            (100.0, Verdict::Viral),
        ] {
            assert_eq!(Verdict::judge(sum, 55.0), expected);
            assert_eq!(Verdict::judge(sum, 55.0), expected);
        }
    }

    #[test]
    fn unknown_criteria_are_ignored_and_scores_clamped() {
        let rubric = sample_rubric(50.0);
        let breakdown: ScoreBreakdown = [
            ("reach", 150.0),
            ("engagement", -10.0),
            ("virality", 100.0),
            ("vibes", 100.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(breakdown.get("reach"), Some(100.0));
        assert_eq!(breakdown.get("engagement"), Some(0.0));
        assert_eq!(weighted_sum(&rubric, &breakdown), 60.0);
        assert_eq!(clamp_score(f64::NAN), 0.0);
    }

    #[test]
    fn rating_bands() {
        assert_eq!(Rating::from_score(85.0), Rating::Viral);
        assert_eq!(Rating::from_score(84.9), Rating::Strong);
        assert_eq!(Rating::from_score(70.0), Rating::Strong);
        assert_eq!(Rating::from_score(50.0), Rating::Decent);
        assert_eq!(Rating::from_score(30.0), Rating::Weak);
        assert_eq!(Rating::from_score(29.0).label(), "FAIL");
    }

    #[test]
    fn headline_bands() {
        assert_eq!(Headline::from_total(80.0), Headline::GoingViral);
        assert_eq!(Headline::from_total(61.0), Headline::Solid);
        assert_eq!(Headline::from_total(40.0), Headline::Mid);
        assert_eq!(Headline::from_total(21.4), Headline::Fail);
    }
}
