//! Looking up releases and the commit range that belongs to them.

use crate::commits::{get_commit_data, CommitAccumulation};
use crate::error::{Error, Result};
use crate::github::GitHubApi;
use crate::paginate::walk_pages;
use crate::types::Release;
use chrono::{DateTime, Utc};
use std::ops::ControlFlow;

/// Page size requested from the releases endpoint (the API maximum).
pub const RELEASES_PER_PAGE: u8 = 100;

/// Retrieves every release of the repository, newest first.
pub async fn list_releases<G>(github: &G, max_pages: u32) -> Result<Vec<Release>>
where
    G: GitHubApi + ?Sized,
{
    let mut releases = Vec::new();

    let walk = walk_pages(
        max_pages,
        |page| github.releases_page(page, RELEASES_PER_PAGE),
        |batch| {
            let is_last_page = batch.len() < usize::from(RELEASES_PER_PAGE);
            releases.extend(batch);
            Ok(if is_last_page {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            })
        },
    )
    .await?;

    if !walk.complete {
        tracing::warn!(
            "Hit max pages ({}) while listing releases. Older releases are ignored.",
            max_pages
        );
    }

    Ok(releases)
}

/// Returns the release at `index` of a newest-first release list.
pub fn release_at(releases: &[Release], index: usize) -> Result<&Release> {
    releases.get(index).ok_or(Error::ReleaseNotFound {
        index,
        available: releases.len(),
    })
}

/// Retrieves the release at `index` (0 is the most recent).
pub async fn get_release<G>(github: &G, index: usize, max_pages: u32) -> Result<Release>
where
    G: GitHubApi + ?Sized,
{
    let releases = list_releases(github, max_pages).await?;
    release_at(&releases, index).cloned()
}

/// Retrieves the creation time of the release at `index`.
pub async fn get_release_date<G>(
    github: &G,
    index: usize,
    max_pages: u32,
) -> Result<DateTime<Utc>>
where
    G: GitHubApi + ?Sized,
{
    Ok(get_release(github, index, max_pages).await?.created_at)
}

/// Accumulates the commits reachable from `sha` that were authored at or
/// after the creation of the release at `index`.
pub async fn get_release_data<G>(
    github: &G,
    sha: &str,
    index: usize,
    max_pages: u32,
) -> Result<CommitAccumulation>
where
    G: GitHubApi + ?Sized,
{
    let releases = list_releases(github, max_pages).await?;
    commits_since_release(github, &releases, sha, index, max_pages).await
}

/// Like [`get_release_data`], against an already fetched release list.
pub async fn commits_since_release<G>(
    github: &G,
    releases: &[Release],
    sha: &str,
    index: usize,
    max_pages: u32,
) -> Result<CommitAccumulation>
where
    G: GitHubApi + ?Sized,
{
    let since = release_at(releases, index)?.created_at;
    get_commit_data(github, sha, Some(since), max_pages).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::MockGitHubApi;
    use crate::types::CommitSummary;
    use chrono::TimeZone;

    fn release(id: u64, tag: &str, body: &str) -> Release {
        Release {
            id,
            tag_name: tag.to_string(),
            created_at: Utc.with_ymd_and_hms(2021, 1, 20, 14, 38, 40).unwrap(),
            body: body.to_string(),
        }
    }

    fn four_releases() -> Vec<Release> {
        vec![
            release(12345678, "v3.0", "anything"),
            release(36659713, "v2.0", "second"),
            release(87654321, "v1.1", "third"),
            release(18273645, "v1.0", "forth"),
        ]
    }

    #[tokio::test]
    async fn test_get_release_first() {
        let mut github = MockGitHubApi::new();
        github
            .expect_releases_page()
            .times(1)
            .returning(|_, _| Ok(four_releases()));

        let found = get_release(&github, 0, 10).await.unwrap();

        assert_eq!(found, release(12345678, "v3.0", "anything"));
    }

    #[tokio::test]
    async fn test_get_release_out_of_range() {
        let mut github = MockGitHubApi::new();
        github
            .expect_releases_page()
            .returning(|_, _| Ok(four_releases()));

        let err = get_release(&github, 4, 10).await.unwrap_err();

        assert!(matches!(
            err,
            Error::ReleaseNotFound {
                index: 4,
                available: 4
            }
        ));
    }

    #[tokio::test]
    async fn test_list_releases_follows_full_pages() {
        let mut github = MockGitHubApi::new();
        github.expect_releases_page().times(2).returning(|page, per_page| {
            let count = if page == 1 { usize::from(per_page) } else { 3 };
            Ok((0..count)
                .map(|i| release(u64::from(page) * 1000 + i as u64, "v", ""))
                .collect())
        });

        let releases = list_releases(&github, 10).await.unwrap();

        assert_eq!(releases.len(), 103);
        assert_eq!(releases[100].id, 2000);
    }

    #[tokio::test]
    async fn test_get_release_date() {
        let mut github = MockGitHubApi::new();
        github
            .expect_releases_page()
            .returning(|_, _| Ok(four_releases()));

        assert_eq!(
            get_release_date(&github, 2, 10).await.unwrap(),
            Utc.with_ymd_and_hms(2021, 1, 20, 14, 38, 40).unwrap()
        );
    }

    #[tokio::test]
    async fn test_get_release_data_bounds_by_release_creation() {
        let previous_created = Utc.with_ymd_and_hms(2021, 1, 20, 14, 38, 40).unwrap();
        let first_commit = Utc.with_ymd_and_hms(2021, 1, 22, 9, 0, 0).unwrap();

        let mut github = MockGitHubApi::new();
        github
            .expect_releases_page()
            .returning(|_, _| Ok(four_releases()));
        github
            .expect_commits_page()
            .returning(move |sha, since, page| {
                assert_eq!(sha, "SHA");
                assert_eq!(since, Some(previous_created));
                Ok(match page {
                    1 => vec![
                        CommitSummary::new("c2", first_commit + chrono::Duration::days(1)),
                        CommitSummary::new("c1", first_commit),
                    ],
                    _ => vec![],
                })
            });

        let data = get_release_data(&github, "SHA", 1, 10).await.unwrap();

        assert_eq!(data.num_commits, 2);
        assert_eq!(data.first_date, Some(first_commit));
    }
}
