//! Action inputs and runner environment.
//!
//! GitHub Actions hands inputs to the step as `INPUT_<NAME>` environment
//! variables (e.g. `INPUT_AUTH-TOKEN`), always as strings and empty when the
//! workflow leaves them out. Runner metadata such as the event payload path
//! arrives as `GITHUB_*` variables.

use crate::error::Result;
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

/// Inputs of the action.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ActionConfig {
    /// Token used for every GitHub API call.
    pub auth_token: String,

    /// Whether to also compute lead times for releases older than the triggering one.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub calculate_previous_releases: bool,

    /// How many releases to process when `calculate_previous_releases` is set.
    /// The absolute value of the input is used; unset means only the newest.
    #[serde(default, deserialize_with = "deserialize_release_count")]
    pub number_of_releases: Option<u32>,

    /// Token for the analytics site. Reporting is skipped when unset.
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub web_token: Option<String>,

    /// Hard limit on the number of pages fetched per paginated listing.
    #[serde(
        default = "default_max_commit_pages",
        deserialize_with = "deserialize_max_commit_pages"
    )]
    pub max_commit_pages: u32,

    /// Root URL of the analytics site. Reporting needs both this and `web_token`.
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub report_url: Option<String>,
}

fn default_max_commit_pages() -> u32 {
    1000
}

impl ActionConfig {
    pub fn from_env() -> Result<Self> {
        Ok(envy::prefixed("INPUT_").from_env()?)
    }

    /// Number of releases to process out of `available`, newest first.
    pub fn release_count(&self, available: usize) -> usize {
        if !self.calculate_previous_releases {
            return 1;
        }

        let requested = self.number_of_releases.map_or(1, |count| count as usize);
        requested.min(available).max(1)
    }
}

/// Variables the Actions runner sets for every step.
#[derive(Clone, Debug, Deserialize)]
pub struct RunnerEnv {
    /// Path of the JSON file holding the triggering event.
    pub event_path: PathBuf,
    /// Path of the file step outputs are appended to.
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// REST API root, set to the enterprise host on GitHub Enterprise Server.
    #[serde(default)]
    pub api_url: Option<String>,
}

impl RunnerEnv {
    pub fn from_env() -> Result<Self> {
        Ok(envy::prefixed("GITHUB_").from_env()?)
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    parse_flag(&s).map_err(serde::de::Error::custom)
}

fn deserialize_release_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    parse_release_count(&s).map_err(serde::de::Error::custom)
}

fn deserialize_non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    let s = s.trim();
    Ok((!s.is_empty()).then(|| s.to_string()))
}

fn deserialize_max_commit_pages<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    match s.trim() {
        "" => Ok(default_max_commit_pages()),
        value => match value.parse::<u32>() {
            Ok(0) | Err(_) => Err(serde::de::Error::custom(format!(
                "expected a positive page count, got {value:?}"
            ))),
            Ok(pages) => Ok(pages),
        },
    }
}

fn parse_flag(s: &str) -> std::result::Result<bool, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "" | "false" => Ok(false),
        "true" => Ok(true),
        other => Err(format!("expected true or false, got {other:?}")),
    }
}

fn parse_release_count(s: &str) -> std::result::Result<Option<u32>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }

    let count: i64 = s
        .parse()
        .map_err(|_| format!("expected an integer release count, got {s:?}"))?;
    u32::try_from(count.unsigned_abs())
        .map(Some)
        .map_err(|_| format!("release count {count} is too large"))
}
