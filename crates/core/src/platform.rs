//! Platform Rubrics
//!
//! Each supported social platform has a weighted scoring rubric that mirrors
//! how its recommendation algorithm prioritises content. The table is built
//! once at startup and handed to the game loop; it is never mutated afterwards.

use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every rubric's criterion weights must add up to this total.
pub const WEIGHT_TOTAL: u32 = 100;

/// Score a post's weighted sum must reach (inclusive) to be judged viral.
pub const DEFAULT_PASS_THRESHOLD: f64 = 60.0;

/// Errors raised while building or querying a [`RubricTable`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RubricError {
    #[error("No rubric is configured for platform {0}")]
    UnsupportedPlatform(Platform),
    #[error("Unknown platform '{name}'{}", .suggestion.map(|s| format!(" (did you mean {s}?)")).unwrap_or_default())]
    UnknownPlatform {
        name: String,
        suggestion: Option<Platform>,
    },
    #[error("Rubric weights for {platform} sum to {actual}, expected {}", WEIGHT_TOTAL)]
    InvalidWeights { platform: Platform, actual: u32 },
    #[error("Pass threshold {threshold} for {platform} is outside 0..=100")]
    InvalidThreshold { platform: Platform, threshold: f64 },
    #[error("Platform {0} is configured more than once")]
    DuplicatePlatform(Platform),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    TikTok,
    Twitter,
    YouTube,
    Instagram,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::TikTok,
        Platform::Twitter,
        Platform::YouTube,
        Platform::Instagram,
    ];

    /// The display name used in prompts and menus.
    pub fn name(self) -> &'static str {
        match self {
            Platform::TikTok => "TikTok",
            Platform::Twitter => "Twitter/X",
            Platform::YouTube => "YouTube",
            Platform::Instagram => "Instagram",
        }
    }

    /// Returns the platform whose name best fuzzy-matches `input`, if any.
    pub fn suggest(input: &str) -> Option<Platform> {
        let matcher = SkimMatcherV2::default();
        Platform::ALL
            .into_iter()
            .filter_map(|p| matcher.fuzzy_match(p.name(), input).map(|score| (score, p)))
            .max_by_key(|(score, _)| *score)
            .map(|(_, p)| p)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = RubricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "tiktok" | "tt" => Ok(Platform::TikTok),
            "twitter" | "twitterx" | "x" => Ok(Platform::Twitter),
            "youtube" | "yt" => Ok(Platform::YouTube),
            "instagram" | "ig" | "insta" => Ok(Platform::Instagram),
            _ => Err(RubricError::UnknownPlatform {
                name: s.to_string(),
                suggestion: Platform::suggest(s.trim()),
            }),
        }
    }
}

/// A single weighted scoring criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    /// Snake-case identifier, also used as the JSON key the simulator fills in.
    pub name: String,
    /// Share of the total score, in percent.
    pub weight: u32,
    pub description: String,
}

impl Criterion {
    pub fn new(name: impl Into<String>, weight: u32, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight,
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rubric {
    pub platform: Platform,
    pub description: String,
    pub format_hint: String,
    /// Ordered as they should be presented and scored.
    pub criteria: Vec<Criterion>,
    pub pass_threshold: f64,
}

impl Rubric {
    pub fn total_weight(&self) -> u32 {
        self.criteria.iter().map(|c| c.weight).sum()
    }

    pub fn criterion(&self, name: &str) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.name == name)
    }

    /// Formats the rubric as the block of text handed to the simulator prompt.
    pub fn to_prompt(&self) -> String {
        let mut lines = vec![
            format!("Platform: {}", self.platform),
            format!("Description: {}", self.description),
            String::new(),
            "Scoring criteria (use these exact keys and weights):".to_string(),
        ];
        for c in &self.criteria {
            lines.push(format!("- {} ({}%): {}", c.name, c.weight, c.description));
        }
        lines.join("\n")
    }

    fn validate(&self) -> Result<(), RubricError> {
        let actual = self.total_weight();
        if actual != WEIGHT_TOTAL {
            return Err(RubricError::InvalidWeights {
                platform: self.platform,
                actual,
            });
        }
        if !(0.0..=100.0).contains(&self.pass_threshold) {
            return Err(RubricError::InvalidThreshold {
                platform: self.platform,
                threshold: self.pass_threshold,
            });
        }
        Ok(())
    }
}

/// The set of rubrics the game may score against, in menu order.
#[derive(Debug, Clone, PartialEq)]
pub struct RubricTable {
    rubrics: Vec<Rubric>,
}

impl RubricTable {
    /// Builds a table from custom rubrics, rejecting bad weights, thresholds or
    /// duplicate platforms.
    pub fn new(rubrics: Vec<Rubric>) -> Result<Self, RubricError> {
        for (i, rubric) in rubrics.iter().enumerate() {
            rubric.validate()?;
            if rubrics[..i].iter().any(|r| r.platform == rubric.platform) {
                return Err(RubricError::DuplicatePlatform(rubric.platform));
            }
        }
        Ok(Self { rubrics })
    }

    /// Applies one pass threshold to every rubric in the table.
    pub fn with_pass_threshold(mut self, threshold: f64) -> Result<Self, RubricError> {
        for rubric in &mut self.rubrics {
            rubric.pass_threshold = threshold;
            rubric.validate()?;
        }
        Ok(self)
    }

    pub fn get(&self, platform: Platform) -> Result<&Rubric, RubricError> {
        self.rubrics
            .iter()
            .find(|r| r.platform == platform)
            .ok_or(RubricError::UnsupportedPlatform(platform))
    }

    pub fn platforms(&self) -> impl Iterator<Item = Platform> + '_ {
        self.rubrics.iter().map(|r| r.platform)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rubric> {
        self.rubrics.iter()
    }

    /// The built-in rubrics for TikTok, Twitter/X, YouTube and Instagram.
    pub fn builtin() -> Self {
        Self {
            rubrics: vec![tiktok(), twitter(), youtube(), instagram()],
        }
    }
}

impl Default for RubricTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn tiktok() -> Rubric {
    Rubric {
        platform: Platform::TikTok,
        description: "Short-form video platform driven by the For You Page algorithm".into(),
        format_hint: "Short-form video (15-60s), vertical, with trending audio".into(),
        criteria: vec![
            Criterion::new(
                "hook_strength",
                30,
                "Retention in the first 1-3 seconds. A weak hook kills distribution.",
            ),
            Criterion::new(
                "trend_alignment",
                25,
                "Rides a current trend, sound or format the FYP is boosting.",
            ),
            Criterion::new(
                "shareability",
                20,
                "Would viewers send it to a friend, duet or stitch it? Shares weigh the most.",
            ),
            Criterion::new(
                "hashtag_strategy",
                15,
                "Relevant mix of niche and broad hashtags so the post gets classified.",
            ),
            Criterion::new(
                "audio_reference",
                10,
                "References or suggests a trending audio the algorithm clusters on.",
            ),
        ],
        pass_threshold: DEFAULT_PASS_THRESHOLD,
    }
}

fn twitter() -> Rubric {
    Rubric {
        platform: Platform::Twitter,
        description: "Text-first microblogging platform driven by engagement velocity".into(),
        format_hint: "Tweet or thread, hot takes, quote-retweet bait".into(),
        criteria: vec![
            Criterion::new(
                "hot_take_factor",
                30,
                "A strong, polarising or surprising opinion that drives fast replies.",
            ),
            Criterion::new(
                "quote_retweet_bait",
                25,
                "Structured to invite quote retweets, the strongest distribution mechanic.",
            ),
            Criterion::new(
                "timing_relevance",
                20,
                "Lands while the topic is live; recency is weighted heavily.",
            ),
            Criterion::new(
                "thread_potential",
                15,
                "Could expand into a thread, raising time-on-post.",
            ),
            Criterion::new(
                "hashtag_strategy",
                10,
                "Hashtags used sparingly; over-tagging costs credibility and reach.",
            ),
        ],
        pass_threshold: DEFAULT_PASS_THRESHOLD,
    }
}

fn youtube() -> Rubric {
    Rubric {
        platform: Platform::YouTube,
        description: "Long and short-form video platform driven by watch time and CTR".into(),
        format_hint: "Video (Shorts or long-form), strong thumbnail + title".into(),
        criteria: vec![
            Criterion::new(
                "thumbnail_clickability",
                25,
                "Would the thumbnail stop a scroll? Click-through rate is a primary signal.",
            ),
            Criterion::new(
                "title_curiosity_gap",
                25,
                "Title opens a curiosity gap without collapsing into pure clickbait.",
            ),
            Criterion::new(
                "watch_time_potential",
                20,
                "Will viewers stay to the end? Average view duration ranks the video.",
            ),
            Criterion::new(
                "seo_optimization",
                15,
                "Keywords, tags and description tuned for search.",
            ),
            Criterion::new(
                "community_engagement",
                15,
                "Prompts comments and likes that signal viewer satisfaction.",
            ),
        ],
        pass_threshold: DEFAULT_PASS_THRESHOLD,
    }
}

fn instagram() -> Rubric {
    Rubric {
        platform: Platform::Instagram,
        description: "Visual-first platform driven by saves, shares, and the Explore page".into(),
        format_hint: "Reel, carousel, or single image with strong caption".into(),
        criteria: vec![
            Criterion::new(
                "visual_appeal",
                30,
                "Eye-catching, high quality visuals that earn saves and long views.",
            ),
            Criterion::new(
                "caption_hook",
                20,
                "The first caption line hooks before the 'more' fold.",
            ),
            Criterion::new(
                "carousel_potential",
                20,
                "Works as a swipeable carousel that gets re-served to partial viewers.",
            ),
            Criterion::new(
                "hashtag_reach",
                15,
                "A mix of niche and popular hashtags so Explore can classify it.",
            ),
            Criterion::new(
                "story_crosspost",
                15,
                "Also works as a Story or Reel, widening the distribution surface.",
            ),
        ],
        pass_threshold: DEFAULT_PASS_THRESHOLD,
    }
}
