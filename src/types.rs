//! Repository, release and commit models shared across the crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A unique identifier for a GitHub repository.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    /// The owner of the repository (e.g., "rust-lang").
    pub owner: String,
    /// The name of the repository (e.g., "cargo").
    pub repo: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Snapshot of a GitHub release as returned by the releases API or carried
/// by a `release` event payload.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    pub created_at: DateTime<Utc>,
    /// Release description. GitHub sends `null` for an empty description.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let body: Option<String> = Deserialize::deserialize(deserializer)?;
    Ok(body.unwrap_or_default())
}

/// One entry of a commit listing page.
#[derive(Clone, Debug, Deserialize)]
pub struct CommitSummary {
    pub sha: String,
    pub commit: CommitDetail,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CommitDetail {
    #[serde(default)]
    pub author: Option<GitSignature>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct GitSignature {
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl CommitSummary {
    pub fn new(sha: impl Into<String>, authored_at: DateTime<Utc>) -> Self {
        Self {
            sha: sha.into(),
            commit: CommitDetail {
                author: Some(GitSignature {
                    date: Some(authored_at),
                }),
            },
        }
    }

    /// The author timestamp of the commit, if GitHub reported one.
    pub fn authored_at(&self) -> Option<DateTime<Utc>> {
        self.commit.author.as_ref().and_then(|author| author.date)
    }
}
