use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use tracing::info;

use crate::{parse_timestamp, ExposureError, WeekClock};

/// Pipeline configuration, loaded from a TOML file with environment overrides.
///
/// Every section is optional; omitted values fall back to the layout of the
/// panel study (`data/csv/*.csv`, epoch and cutoff 2022-01-01).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub weeks: WeeksConfig,
    #[serde(default)]
    pub filter: FilterConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Prefix for every relative path below.
    pub data_dir: PathBuf,

    // Preparation
    pub raw_messages: PathBuf,
    pub messages: PathBuf,
    pub economists: PathBuf,
    pub raw_users: PathBuf,
    pub users: PathBuf,

    // Panel
    pub raw_follows: PathBuf,
    pub follows: PathBuf,
    pub activity_log: PathBuf,
    pub authors_roster: PathBuf,
    pub mentions: PathBuf,
    pub exposed_roster: PathBuf,
    pub interacted: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/csv"),
            raw_messages: "RePEc_tweets.csv".into(),
            messages: "cleaned_RePEc_tweets.csv".into(),
            economists: "Economists_Info.csv".into(),
            raw_users: "RePEc_userinfo.csv".into(),
            users: "cleaned_RePEc_userinfo.csv".into(),
            raw_follows: "RePEc_following.csv".into(),
            follows: "repec_following.csv".into(),
            activity_log: "mastadon_tweets.csv".into(),
            authors_roster: "mastodon_user_week.csv".into(),
            mentions: "mentions.csv".into(),
            exposed_roster: "mastodon_exposed_week.csv".into(),
            interacted: "interacted.csv".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeeksConfig {
    /// Start of week 1.
    #[serde(deserialize_with = "de_instant")]
    pub epoch: DateTime<Utc>,
}

impl Default for WeeksConfig {
    fn default() -> Self {
        Self {
            epoch: study_start(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Messages at or before this instant are dropped.
    #[serde(deserialize_with = "de_instant")]
    pub since: DateTime<Utc>,
    pub topics: Vec<TopicConfig>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            since: study_start(),
            topics: vec![
                TopicConfig {
                    name: "mastodon".into(),
                    keywords: vec!["mastodon".into(), "mastadon".into(), "mastadan".into()],
                    output: "mastadon_tweets.csv".into(),
                },
                TopicConfig {
                    name: "elon".into(),
                    keywords: vec!["musk".into(), "elon".into()],
                    output: "elon_tweets.csv".into(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TopicConfig {
    pub name: String,
    /// Case-insensitive substrings; any match selects the message.
    pub keywords: Vec<String>,
    pub output: PathBuf,
}

fn study_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn de_instant<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

impl Config {
    /// Load the config file (defaults when it does not exist), apply
    /// `EXPOSURE_EPOCH` / `EXPOSURE_DATA_DIR` overrides, and resolve paths.
    pub fn load(path: &Path) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = if path.exists() {
            info!(config = %path.display(), "Loading config");
            load_config(path)?
        } else {
            info!(config = %path.display(), "Config file not found, using defaults");
            Self::default()
        };

        config.apply_overrides(
            env::var("EXPOSURE_EPOCH").ok().as_deref(),
            env::var("EXPOSURE_DATA_DIR").ok().as_deref(),
        )?;
        config.resolve_paths();
        config.validate()?;
        config.log_summary();
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, ExposureError> {
        toml::from_str(content).map_err(|e| ExposureError::Config(e.to_string()))
    }

    pub fn apply_overrides(
        &mut self,
        epoch: Option<&str>,
        data_dir: Option<&str>,
    ) -> std::result::Result<(), ExposureError> {
        if let Some(epoch) = epoch {
            self.weeks.epoch = parse_timestamp(epoch)
                .map_err(|e| ExposureError::Config(format!("EXPOSURE_EPOCH: {e}")))?;
        }
        if let Some(dir) = data_dir.filter(|d| !d.is_empty()) {
            self.paths.data_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Prefix every relative table path with `paths.data_dir`.
    pub fn resolve_paths(&mut self) {
        let base = self.paths.data_dir.clone();
        let p = &mut self.paths;
        for path in [
            &mut p.raw_messages,
            &mut p.messages,
            &mut p.economists,
            &mut p.raw_users,
            &mut p.users,
            &mut p.raw_follows,
            &mut p.follows,
            &mut p.activity_log,
            &mut p.authors_roster,
            &mut p.mentions,
            &mut p.exposed_roster,
            &mut p.interacted,
        ] {
            rebase(path, &base);
        }
        for topic in &mut self.filter.topics {
            rebase(&mut topic.output, &base);
        }
    }

    /// Topics need at least one keyword and distinct output files.
    pub fn validate(&self) -> std::result::Result<(), ExposureError> {
        let mut outputs = std::collections::HashSet::new();
        for topic in &self.filter.topics {
            if topic.keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(ExposureError::Validation(format!(
                    "topic {:?} has no keywords",
                    topic.name
                )));
            }
            if !outputs.insert(&topic.output) {
                return Err(ExposureError::Validation(format!(
                    "topic {:?} writes to {} which another topic already uses",
                    topic.name,
                    topic.output.display()
                )));
            }
        }
        Ok(())
    }

    pub fn week_clock(&self) -> WeekClock {
        WeekClock::new(self.weeks.epoch)
    }

    pub fn log_summary(&self) {
        info!(
            data_dir = %self.paths.data_dir.display(),
            epoch = %self.weeks.epoch,
            since = %self.filter.since,
            topics = self.filter.topics.len(),
            "Config"
        );
    }
}

fn rebase(path: &mut PathBuf, base: &Path) {
    if path.is_relative() {
        *path = base.join(&*path);
    }
}

/// Load and parse a TOML config file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config = Config::from_toml_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}
