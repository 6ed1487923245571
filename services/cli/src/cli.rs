//! Command-line flags. Every flag is optional; with none the game is fully
//! interactive.

use clap::Parser;
use clap::builder::TypedValueParser;
use viral_core::persona::PersonaKind;
use viral_core::platform::Platform;
use viral_core::trends::DEFAULT_TREND_COUNT;

#[derive(Debug, Parser)]
#[command(name = "viral-or-fail", version, about = "Can your gaming post crack the algorithm?")]
pub struct Args {
    /// Skip trend selection and write about this topic.
    #[arg(long, value_parser = parse_topic)]
    pub topic: Option<String>,

    /// Skip platform selection (tiktok, twitter, youtube, instagram).
    #[arg(long, value_parser = parse_platform)]
    pub platform: Option<Platform>,

    /// Pin the audience persona (chloe, tyler, pete) instead of picking one at random.
    #[arg(long, value_parser = parse_persona)]
    pub persona: Option<PersonaKind>,

    /// Use the bundled sample trends without trying a live fetch.
    #[arg(long)]
    pub offline: bool,

    /// How many trending topics to offer.
    #[arg(long, default_value_t = DEFAULT_TREND_COUNT, value_parser = clap::value_parser!(u16).range(1..=50).map(usize::from))]
    pub trend_count: usize,
}

fn parse_topic(s: &str) -> Result<String, String> {
    let topic = s.trim();
    if topic.is_empty() {
        Err("topic must not be blank".to_string())
    } else {
        Ok(topic.to_string())
    }
}

fn parse_platform(s: &str) -> Result<Platform, String> {
    s.parse().map_err(|e: viral_core::platform::RubricError| e.to_string())
}

fn parse_persona(s: &str) -> Result<PersonaKind, String> {
    s.parse()
        .map_err(|e: viral_core::persona::UnknownPersona| e.to_string())
}
