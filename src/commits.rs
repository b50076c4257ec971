//! Counting the commits that make up a release.

use crate::error::{Error, Result};
use crate::github::GitHubApi;
use crate::paginate::walk_pages;
use chrono::{DateTime, Utc};
use std::ops::ControlFlow;

/// Commit count and oldest author timestamp over a commit range.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitAccumulation {
    /// Sum of the lengths of every page fetched before the first empty page.
    pub num_commits: u64,
    /// Author timestamp of the last commit of the last non-empty page.
    pub first_date: Option<DateTime<Utc>>,
    /// Set when the page cap was reached before the listing ended.
    pub truncated: bool,
}

/// Walks the commits reachable from `sha`, optionally bounded below by `since`.
///
/// Pages are newest-first, so the last item of the last populated page is the
/// oldest commit in range. A failed page fetch aborts the walk.
pub async fn get_commit_data<G>(
    github: &G,
    sha: &str,
    since: Option<DateTime<Utc>>,
    max_pages: u32,
) -> Result<CommitAccumulation>
where
    G: GitHubApi + ?Sized,
{
    let mut data = CommitAccumulation::default();

    let walk = walk_pages(
        max_pages,
        |page| github.commits_page(sha, since, page),
        |batch| {
            if let Some(last) = batch.last() {
                let authored_at = last.authored_at().ok_or_else(|| Error::MissingAuthorDate {
                    sha: last.sha.clone(),
                })?;
                data.first_date = Some(authored_at);
            }
            data.num_commits += batch.len() as u64;
            Ok(ControlFlow::Continue(()))
        },
    )
    .await?;

    if !walk.complete {
        tracing::warn!(
            "Hit max commit pages ({}) for {} before the listing ended. Commit count may be incomplete.",
            max_pages,
            sha
        );
        data.truncated = true;
    }

    tracing::debug!(
        sha,
        pages = walk.pages,
        num_commits = data.num_commits,
        "Accumulated commits"
    );

    Ok(data)
}

/// Counts the commits reachable from `sha`, optionally bounded below by `since`.
pub async fn get_num_commits<G>(
    github: &G,
    sha: &str,
    since: Option<DateTime<Utc>>,
    max_pages: u32,
) -> Result<u64>
where
    G: GitHubApi + ?Sized,
{
    Ok(get_commit_data(github, sha, since, max_pages)
        .await?
        .num_commits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::MockGitHubApi;
    use crate::types::CommitSummary;
    use chrono::{Duration, TimeZone};

    fn commit_pages(sizes: &[usize]) -> Vec<Vec<CommitSummary>> {
        let newest = Utc.with_ymd_and_hms(2021, 1, 21, 1, 0, 0).unwrap();
        let mut offset = 0;
        sizes
            .iter()
            .map(|&size| {
                (0..size)
                    .map(|_| {
                        offset += 1;
                        CommitSummary::new(
                            format!("sha{offset}"),
                            newest - Duration::hours(offset),
                        )
                    })
                    .collect()
            })
            .collect()
    }

    fn mock_with_pages(pages: Vec<Vec<CommitSummary>>) -> MockGitHubApi {
        let mut github = MockGitHubApi::new();
        github
            .expect_commits_page()
            .returning(move |_, _, page| {
                Ok(pages.get(page as usize - 1).cloned().unwrap_or_default())
            });
        github
    }

    #[tokio::test]
    async fn test_commit_data_sums_pages() {
        let github = mock_with_pages(commit_pages(&[30, 30, 7]));

        let data = get_commit_data(&github, "head", None, 100).await.unwrap();

        assert_eq!(data.num_commits, 67);
        assert_eq!(
            data.first_date,
            Some(Utc.with_ymd_and_hms(2021, 1, 21, 1, 0, 0).unwrap() - Duration::hours(67))
        );
        assert!(!data.truncated);
    }

    #[tokio::test]
    async fn test_commit_data_empty_listing() {
        let github = mock_with_pages(vec![]);

        let data = get_commit_data(&github, "head", None, 100).await.unwrap();

        assert_eq!(data, CommitAccumulation::default());
    }

    #[tokio::test]
    async fn test_commit_data_forwards_since_and_sha() {
        let since = Utc.with_ymd_and_hms(2021, 1, 1, 1, 0, 0).unwrap();
        let mut github = MockGitHubApi::new();
        github
            .expect_commits_page()
            .returning(move |sha, bound, page| {
                assert_eq!(sha, "v2-sha");
                assert_eq!(bound, Some(since));
                Ok(if page == 1 {
                    vec![CommitSummary::new(
                        "a",
                        Utc.with_ymd_and_hms(2021, 1, 2, 0, 0, 0).unwrap(),
                    )]
                } else {
                    vec![]
                })
            });

        assert_eq!(
            get_num_commits(&github, "v2-sha", Some(since), 100).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_commit_data_marks_truncation() {
        let github = mock_with_pages(commit_pages(&[30, 30, 30]));

        let data = get_commit_data(&github, "head", None, 2).await.unwrap();

        assert_eq!(data.num_commits, 60);
        assert!(data.truncated);
    }

    #[tokio::test]
    async fn test_commit_data_fetch_error_is_not_end_of_list() {
        let mut github = MockGitHubApi::new();
        github.expect_commits_page().returning(|_, _, page| {
            if page == 1 {
                Ok(vec![CommitSummary::new("a", Utc::now())])
            } else {
                Err(Error::Transport("Bad credentials".into()))
            }
        });

        let result = get_commit_data(&github, "head", None, 100).await;

        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn test_commit_data_missing_author_date() {
        let mut github = MockGitHubApi::new();
        github.expect_commits_page().returning(|_, _, page| {
            if page == 1 {
                Ok(vec![serde_json::from_str(r#"{"sha": "dangling", "commit": {}}"#).unwrap()])
            } else {
                Ok(vec![])
            }
        });

        let result = get_commit_data(&github, "head", None, 100).await;

        assert!(matches!(result, Err(Error::MissingAuthorDate { sha }) if sha == "dangling"));
    }
}
