//! Trend Source
//!
//! Supplies the trending gaming topics the player picks from. The live source
//! reads Google Trends' daily-trends feed; any failure, or a thin result, is
//! covered by a bundled list of sample topics so a round can always start.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

/// Fewer live gaming topics than this get padded with samples.
pub const MIN_LIVE_TRENDS: usize = 5;

pub const DEFAULT_TREND_COUNT: usize = 10;

const DAILY_TRENDS_URL: &str = "https://trends.google.com/trends/api/dailytrends";

/// Offline topics used when the live fetch fails or comes back thin.
pub const SAMPLE_TRENDS: &[&str] = &[
    "Elden Ring DLC",
    "GTA 6 trailer",
    "Hollow Knight: Silksong",
    "Nintendo Switch 2",
    "Valorant Champions",
    "Minecraft movie",
    "Fortnite new season",
    "Pokemon Legends Z-A",
    "Steam Deck OLED",
    "League of Legends Worlds",
    "Baldur's Gate 3 patch",
    "Call of Duty Warzone",
];

const GAMING_KEYWORDS: &[&str] = &[
    "game", "gaming", "gamer", "esport", "playstation", "xbox", "nintendo", "steam", "twitch",
    "fortnite", "valorant", "league", "minecraft", "roblox", "cod", "warzone", "apex", "zelda",
    "mario", "pokemon", "gta", "elden", "final fantasy", "ps5", "ps6", "switch", "gpu", "rtx",
    "dlc",
];

#[derive(Debug, thiserror::Error)]
pub enum TrendFetchError {
    #[error("Trends request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Could not parse trends payload: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Trends source returned no topics")]
    Empty,
}

#[async_trait]
pub trait TrendSource: Send + Sync {
    async fn fetch_trending_topics(&self) -> Result<Vec<String>, TrendFetchError>;
}

/// Live gaming topics from Google Trends' daily trending searches.
pub struct GoogleTrendsSource {
    http: reqwest::Client,
    geo: String,
}

impl GoogleTrendsSource {
    pub fn new(geo: impl Into<String>, timeout: Duration) -> Result<Self, TrendFetchError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            geo: geo.into(),
        })
    }
}

#[async_trait]
impl TrendSource for GoogleTrendsSource {
    async fn fetch_trending_topics(&self) -> Result<Vec<String>, TrendFetchError> {
        info!(geo = %self.geo, "Fetching live gaming trends");
        let body = self
            .http
            .get(DAILY_TRENDS_URL)
            .query(&[("hl", "en-US"), ("tz", "0"), ("geo", self.geo.as_str()), ("ns", "15")])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_daily_trends(&body)
    }
}

/// Serves the bundled sample topics without touching the network.
pub struct OfflineSource;

#[async_trait]
impl TrendSource for OfflineSource {
    async fn fetch_trending_topics(&self) -> Result<Vec<String>, TrendFetchError> {
        Ok(sample_trends())
    }
}

#[derive(Deserialize)]
struct DailyTrendsEnvelope {
    default: DailyTrends,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DailyTrends {
    #[serde(default)]
    trending_searches_days: Vec<TrendingDay>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrendingDay {
    #[serde(default)]
    trending_searches: Vec<TrendingSearch>,
}

#[derive(Deserialize)]
struct TrendingSearch {
    title: TrendTitle,
    #[serde(default)]
    articles: Vec<TrendArticle>,
}

#[derive(Deserialize)]
struct TrendTitle {
    query: String,
}

#[derive(Deserialize)]
struct TrendArticle {
    #[serde(default)]
    title: String,
}

/// Extracts gaming-related search titles from a daily-trends payload.
///
/// The payload starts with an anti-XSSI prefix that is skipped. A search counts
/// as gaming when its title or one of its article headlines mentions a gaming
/// keyword.
pub fn parse_daily_trends(body: &str) -> Result<Vec<String>, TrendFetchError> {
    let json = body.find('{').map_or(body, |start| &body[start..]);
    let envelope: DailyTrendsEnvelope = serde_json::from_str(json)?;

    let mut topics: Vec<String> = Vec::new();
    for search in envelope
        .default
        .trending_searches_days
        .into_iter()
        .flat_map(|day| day.trending_searches)
    {
        let query = search.title.query.trim().to_string();
        let gaming = is_gaming_topic(&query)
            || search.articles.iter().any(|a| is_gaming_topic(&a.title));
        if gaming && !query.is_empty() && !topics.contains(&query) {
            topics.push(query);
        }
    }
    Ok(topics)
}

pub fn is_gaming_topic(text: &str) -> bool {
    let lower = text.to_lowercase();
    GAMING_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

pub fn sample_trends() -> Vec<String> {
    SAMPLE_TRENDS.iter().map(|t| t.to_string()).collect()
}

/// Returns up to `count` topics, never failing.
///
/// Live topics are used as-is when there are at least [`MIN_LIVE_TRENDS`] of
/// them, padded with samples when there are fewer, and replaced by samples
/// entirely when the fetch fails or comes back empty.
pub async fn load_trends(source: &dyn TrendSource, count: usize) -> Vec<String> {
    let live = match source.fetch_trending_topics().await {
        Ok(topics) if !topics.is_empty() => topics,
        Ok(_) => {
            warn!(error = %TrendFetchError::Empty, "Falling back to sample gaming trends");
            return take(sample_trends(), count);
        }
        Err(e) => {
            warn!(error = %e, "Could not fetch live trends, falling back to sample gaming trends");
            return take(sample_trends(), count);
        }
    };

    if live.len() >= MIN_LIVE_TRENDS {
        info!(found = live.len(), "Using live gaming trends");
        return take(live, count);
    }

    info!(found = live.len(), "Few live gaming trends, mixing with samples");
    let mut combined = live;
    for sample in sample_trends() {
        if !combined.contains(&sample) {
            combined.push(sample);
        }
    }
    take(combined, count)
}

fn take(mut topics: Vec<String>, count: usize) -> Vec<String> {
    topics.truncate(count.max(1));
    topics
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource(Result<Vec<&'static str>, ()>);

    #[async_trait]
    impl TrendSource for FixedSource {
        async fn fetch_trending_topics(&self) -> Result<Vec<String>, TrendFetchError> {
            match &self.0 {
                Ok(topics) => Ok(topics.iter().map(|t| t.to_string()).collect()),
                Err(()) => Err(TrendFetchError::Empty),
            }
        }
    }

    #[tokio::test]
    async fn failing_source_falls_back_to_samples() {
        let topics = load_trends(&FixedSource(Err(())), 10).await;
        assert_eq!(topics, sample_trends()[..10].to_vec());
    }

    #[tokio::test]
    async fn empty_source_falls_back_to_samples() {
        let topics = load_trends(&FixedSource(Ok(vec![])), 3).await;
        assert_eq!(topics, vec!["Elden Ring DLC", "GTA 6 trailer", "Hollow Knight: Silksong"]);
    }

    #[tokio::test]
    async fn offline_source_serves_samples() {
        let topics = load_trends(&OfflineSource, DEFAULT_TREND_COUNT).await;
        assert_eq!(topics.len(), DEFAULT_TREND_COUNT);
        assert_eq!(topics, sample_trends()[..DEFAULT_TREND_COUNT].to_vec());
    }

    #[tokio::test]
    async fn enough_live_topics_are_used_as_is() {
        let live = vec!["a game", "b game", "c game", "d game", "e game", "f game"];
        let topics = load_trends(&FixedSource(Ok(live.clone())), 5).await;
        assert_eq!(topics, live[..5].to_vec());
    }

    #[tokio::test]
    async fn thin_live_result_is_padded_without_duplicates() {
        let topics = load_trends(&FixedSource(Ok(vec!["Deadlock", "Elden Ring DLC"])), 4).await;
        assert_eq!(
            topics,
            vec!["Deadlock", "Elden Ring DLC", "GTA 6 trailer", "Hollow Knight: Silksong"]
        );
    }

    #[test]
    fn parses_daily_trends_payload() {
        let body = r#")]}',
{"default":{"trendingSearchesDays":[{"date":"20261019","trendingSearches":[
  {"title":{"query":"GTA 6"},"articles":[]},
  {"title":{"query":"Weather tomorrow"},"articles":[{"title":"Rain expected"}]},
  {"title":{"query":"Deadlock"},"articles":[{"title":"Valve's new game opens up"}]},
  {"title":{"query":"GTA 6"},"articles":[]}
]}]}}"#;
        let topics = parse_daily_trends(body).unwrap();
        assert_eq!(topics, vec!["GTA 6", "Deadlock"]);
    }

    #[test]
    fn malformed_payload_is_a_parse_error() {
        let err = parse_daily_trends(")]}',\nnot json").unwrap_err();
        assert!(matches!(err, TrendFetchError::Parse(_)));
    }

    #[test]
    fn keyword_matching_is_case_insensitive() {
        assert!(is_gaming_topic("New PlayStation showcase"));
        assert!(is_gaming_topic("Zelda"));
        assert!(!is_gaming_topic("Stock market"));
    }
}
