//! GitHub REST access for releases, tags and commit listings.
//!
//! `GitHubApi` is the seam between the lead-time logic and the network: the
//! orchestrator and the accumulators only ever see this trait, and
//! `GitHubClient` implements it on top of Octocrab. Every method performs a
//! single request; paging is driven by the callers.

use crate::error::{Error, Result};
use crate::types::{CommitSummary, Release, RepoId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Annotated tags can point at other tag objects; stop following after this many hops.
const MAX_TAG_DEPTH: usize = 5;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Resolves a tag name to the SHA of the commit it points to.
    async fn tag_sha(&self, tag: &str) -> Result<String>;

    /// Fetches one page (1-indexed) of commits reachable from `sha`, newest first.
    ///
    /// With `since` set, only commits authored at or after it are listed. An
    /// exhausted listing yields an empty page; failures are errors.
    async fn commits_page(
        &self,
        sha: &str,
        since: Option<DateTime<Utc>>,
        page: u32,
    ) -> Result<Vec<CommitSummary>>;

    /// Fetches one page (1-indexed) of releases, newest first.
    async fn releases_page(&self, page: u32, per_page: u8) -> Result<Vec<Release>>;

    /// Replaces the description of a release.
    async fn patch_release_body(&self, release_id: u64, body: &str) -> Result<()>;
}

#[async_trait]
impl<T> GitHubApi for &T
where
    T: GitHubApi + ?Sized,
{
    async fn tag_sha(&self, tag: &str) -> Result<String> {
        (**self).tag_sha(tag).await
    }

    async fn commits_page(
        &self,
        sha: &str,
        since: Option<DateTime<Utc>>,
        page: u32,
    ) -> Result<Vec<CommitSummary>> {
        (**self).commits_page(sha, since, page).await
    }

    async fn releases_page(&self, page: u32, per_page: u8) -> Result<Vec<Release>> {
        (**self).releases_page(page, per_page).await
    }

    async fn patch_release_body(&self, release_id: u64, body: &str) -> Result<()> {
        (**self).patch_release_body(release_id, body).await
    }
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct GitRef {
    #[serde(rename = "ref")]
    name: String,
    object: GitObject,
}

/// The refs endpoint answers with a list of prefix matches when there is no exact match.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GitRefResponse {
    Exact(GitRef),
    Matches(Vec<GitRef>),
}

#[derive(Debug, Deserialize)]
struct GitTagObject {
    object: GitObject,
}

/// Picks the object of `refs/tags/{tag}` out of a refs response.
fn exact_tag_object(response: GitRefResponse, tag: &str) -> Result<GitObject> {
    let full_name = format!("refs/tags/{tag}");
    match response {
        GitRefResponse::Exact(git_ref) => Ok(git_ref.object),
        GitRefResponse::Matches(refs) => refs
            .into_iter()
            .find(|git_ref| git_ref.name == full_name)
            .map(|git_ref| git_ref.object)
            .ok_or_else(|| Error::TagNotFound {
                tag: tag.to_string(),
            }),
    }
}

/// Follows annotated tag objects from `object` until a non-tag object is reached.
///
/// `fetch_tag` loads the tag object with the given SHA. Gives up with
/// `TagNotFound` after `MAX_TAG_DEPTH` hops.
async fn peel_tag<F, Fut>(tag: &str, mut object: GitObject, mut fetch_tag: F) -> Result<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<GitTagObject>>,
{
    for _ in 0..MAX_TAG_DEPTH {
        if object.kind != "tag" {
            return Ok(object.sha);
        }
        tracing::debug!(tag, sha = %object.sha, "Following annotated tag object");
        object = fetch_tag(object.sha).await?.object;
    }

    Err(Error::TagNotFound {
        tag: tag.to_string(),
    })
}

#[derive(Serialize)]
struct CommitsQuery<'a> {
    sha: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    since: Option<DateTime<Utc>>,
    page: u32,
}

#[derive(Serialize)]
struct PageQuery {
    per_page: u8,
    page: u32,
}

#[derive(Serialize)]
struct ReleaseBodyPatch<'a> {
    body: &'a str,
}

/// Octocrab-backed client bound to a single repository.
#[derive(Clone)]
pub struct GitHubClient {
    octocrab: Octocrab,
    repo_id: RepoId,
}

impl GitHubClient {
    /// Builds a client authenticating with a personal or installation token.
    ///
    /// `base_uri` overrides the API root, e.g. for GitHub Enterprise Server.
    pub fn new(repo_id: RepoId, token: String, base_uri: Option<&str>) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token);
        if let Some(base_uri) = base_uri {
            builder = builder.base_uri(base_uri)?;
        }

        Ok(Self {
            octocrab: builder.build()?,
            repo_id,
        })
    }

    pub fn repo_id(&self) -> &RepoId {
        &self.repo_id
    }

    fn route(&self, tail: &str) -> String {
        format!(
            "/repos/{}/{}/{}",
            self.repo_id.owner, self.repo_id.repo, tail
        )
    }

    async fn tag_ref(&self, tag: &str) -> Result<GitObject> {
        let response: GitRefResponse = self
            .octocrab
            .get(self.route(&format!("git/refs/tags/{tag}")), None::<&()>)
            .await?;

        exact_tag_object(response, tag)
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn tag_sha(&self, tag: &str) -> Result<String> {
        let object = self.tag_ref(tag).await?;
        let sha = peel_tag(tag, object, |sha| async move {
            let annotated: GitTagObject = self
                .octocrab
                .get(self.route(&format!("git/tags/{sha}")), None::<&()>)
                .await?;
            Ok(annotated)
        })
        .await?;

        tracing::debug!(repo = %self.repo_id, tag, sha = %sha, "Resolved tag");
        Ok(sha)
    }

    async fn commits_page(
        &self,
        sha: &str,
        since: Option<DateTime<Utc>>,
        page: u32,
    ) -> Result<Vec<CommitSummary>> {
        let query = CommitsQuery { sha, since, page };
        let commits: Vec<CommitSummary> = self
            .octocrab
            .get(self.route("commits"), Some(&query))
            .await?;

        tracing::debug!(
            repo = %self.repo_id,
            sha,
            page,
            count = commits.len(),
            "Fetched commit page"
        );
        Ok(commits)
    }

    async fn releases_page(&self, page: u32, per_page: u8) -> Result<Vec<Release>> {
        let query = PageQuery { per_page, page };
        let releases: Vec<Release> = self
            .octocrab
            .get(self.route("releases"), Some(&query))
            .await?;

        tracing::debug!(
            repo = %self.repo_id,
            page,
            count = releases.len(),
            "Fetched release page"
        );
        Ok(releases)
    }

    async fn patch_release_body(&self, release_id: u64, body: &str) -> Result<()> {
        let _: serde_json::Value = self
            .octocrab
            .patch(
                self.route(&format!("releases/{release_id}")),
                Some(&ReleaseBodyPatch { body }),
            )
            .await?;
        Ok(())
    }
}
