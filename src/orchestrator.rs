//! Sequencing one lead-time run over the most recent releases.
//!
//! For every release processed, newest first, the orchestrator:
//! 1. Resolves the commit the release's tag points to.
//! 2. Counts the commits since the next-older release was created (or the
//!    whole history for the oldest release).
//! 3. Calculates the lead time, appends it to the release body and, with a
//!    reporter configured, forwards it to the analytics site.
//!
//! Releases are handled strictly one after the other. A failure is recorded
//! in the `RunReport` and the loop moves on to the next release.

use crate::commits::get_commit_data;
use crate::config::ActionConfig;
use crate::error::{Error, Result};
use crate::github::GitHubApi;
use crate::lead_time::{get_lead_time, LeadTime};
use crate::release::{commits_since_release, list_releases, release_at};
use crate::reporter::{send_data_to_website, MetricsReporter};
use crate::types::{Release, RepoId};
use crate::updater::{append_lead_time, update_release_body};

/// What happened to one processed release.
#[derive(Clone, Debug, PartialEq)]
pub struct ReleaseOutcome {
    pub index: usize,
    pub release_id: u64,
    pub tag_name: String,
    pub num_commits: u64,
    pub lead_time: LeadTime,
    /// The commit walk hit the page cap, so `num_commits` is a lower bound.
    pub truncated: bool,
    pub body_updated: bool,
    /// `None` when no reporter is configured.
    pub reported: Option<bool>,
}

/// A failure recorded during a run, tagged with the release it concerns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    pub tag_name: Option<String>,
    pub message: String,
}

/// Aggregate result of a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunReport {
    pub outcomes: Vec<ReleaseOutcome>,
    pub failures: Vec<Failure>,
    /// Lead time of the most recent release, published as the step output.
    pub lead_time: Option<LeadTime>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, tag_name: Option<&str>, message: String) {
        match tag_name {
            Some(tag) => tracing::error!(tag, "{}", message),
            None => tracing::error!("{}", message),
        }
        self.failures.push(Failure {
            tag_name: tag_name.map(str::to_string),
            message,
        });
    }
}

pub struct Orchestrator<G, R> {
    github: G,
    reporter: Option<R>,
    repo_id: RepoId,
    max_pages: u32,
}

impl<G, R> Orchestrator<G, R>
where
    G: GitHubApi,
    R: MetricsReporter,
{
    pub fn new(github: G, reporter: Option<R>, repo_id: RepoId, max_pages: u32) -> Self {
        Self {
            github,
            reporter,
            repo_id,
            max_pages,
        }
    }

    /// Runs the lead-time calculation for the releases selected by `config`.
    ///
    /// `trigger` is the release carried by the event payload; it takes the
    /// place of the newest release because the listing can lag behind the event.
    pub async fn run(&self, trigger: Option<Release>, config: &ActionConfig) -> RunReport {
        let mut report = RunReport::default();

        let listed = match list_releases(&self.github, self.max_pages).await {
            Ok(listed) => listed,
            Err(e) => {
                report.fail(None, format!("Failed to list releases of {}: {}", self.repo_id, e));
                return report;
            }
        };
        let releases = with_trigger_first(listed, trigger);

        if releases.is_empty() {
            report.fail(None, format!("{} has no releases", self.repo_id));
            return report;
        }

        let count = config.release_count(releases.len());
        tracing::info!(
            repo = %self.repo_id,
            count,
            available = releases.len(),
            "Calculating lead time for change"
        );

        for index in 0..count {
            let tag_name = releases[index].tag_name.clone();
            match self.process_release(&releases, index, &mut report).await {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(e) => report.fail(Some(&tag_name), e.to_string()),
            }
        }

        report
    }

    async fn process_release(
        &self,
        releases: &[Release],
        index: usize,
        report: &mut RunReport,
    ) -> Result<ReleaseOutcome> {
        let release = release_at(releases, index)?;
        let tag = release.tag_name.as_str();

        let sha = self.github.tag_sha(tag).await?;

        let commits = if index + 1 < releases.len() {
            commits_since_release(&self.github, releases, &sha, index + 1, self.max_pages).await?
        } else {
            tracing::info!(tag, "No older release, counting the full history");
            get_commit_data(&self.github, &sha, None, self.max_pages).await?
        };

        let first_date = commits.first_date.ok_or(Error::NoCommits)?;
        let num_commits = i64::try_from(commits.num_commits).unwrap_or(i64::MAX);
        let lead_time = get_lead_time(release.created_at, first_date, num_commits)?;
        tracing::info!(tag, num_commits, %lead_time, "Lead Time For Change in Days");

        let new_body = append_lead_time(&release.body, lead_time);
        let body_updated = update_release_body(&self.github, release.id, &new_body).await;
        if body_updated {
            tracing::info!(
                "{} release (ID = {}) description updated successfully",
                tag,
                release.id
            );
        } else {
            report.fail(
                Some(tag),
                format!(
                    "{} release (ID = {}) description could not be updated",
                    tag, release.id
                ),
            );
        }

        let reported = match &self.reporter {
            Some(reporter) => Some(
                send_data_to_website(
                    reporter,
                    &self.repo_id,
                    tag,
                    release.created_at,
                    lead_time,
                )
                .await,
            ),
            None => {
                tracing::info!(tag, "No web token or report URL provided, skipping website report");
                None
            }
        };

        if index == 0 {
            report.lead_time = Some(lead_time);
        }

        Ok(ReleaseOutcome {
            index,
            release_id: release.id,
            tag_name: release.tag_name.clone(),
            num_commits: commits.num_commits,
            lead_time,
            truncated: commits.truncated,
            body_updated,
            reported,
        })
    }
}

/// Puts the triggering release at the front, dropping its listed copy.
fn with_trigger_first(mut releases: Vec<Release>, trigger: Option<Release>) -> Vec<Release> {
    if let Some(trigger) = trigger {
        releases.retain(|release| release.id != trigger.id);
        releases.insert(0, trigger);
    }
    releases
}
