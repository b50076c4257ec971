//! Forwarding computed lead times to the external analytics site.
//!
//! Reporting is best effort: a failed report is logged and never stops the
//! rest of the run.

use crate::error::Result;
use crate::lead_time::LeadTime;
use crate::types::RepoId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

const ACCESS_PATH: &str = "api/repo/access";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetricsReporter: Send + Sync {
    /// Sends one release's lead time.
    async fn report(
        &self,
        repo_id: &RepoId,
        tag_name: &str,
        created_at: DateTime<Utc>,
        lead_time: LeadTime,
    ) -> Result<()>;
}

#[async_trait]
impl<T> MetricsReporter for &T
where
    T: MetricsReporter + ?Sized,
{
    async fn report(
        &self,
        repo_id: &RepoId,
        tag_name: &str,
        created_at: DateTime<Utc>,
        lead_time: LeadTime,
    ) -> Result<()> {
        (**self)
            .report(repo_id, tag_name, created_at, lead_time)
            .await
    }
}

/// Body of `POST /api/repo/access`.
#[derive(Debug, Serialize)]
struct AccessReport<'a> {
    #[serde(rename = "ownerName")]
    owner_name: &'a str,
    token: &'a str,
    #[serde(rename = "repoName")]
    repo_name: &'a str,
    tag: &'a str,
    created_at: DateTime<Utc>,
    lead_time: LeadTime,
}

/// Reporter posting JSON to the analytics site with a per-repository web token.
#[derive(Clone)]
pub struct WebsiteReporter {
    client: reqwest::Client,
    endpoint: String,
    web_token: String,
}

impl WebsiteReporter {
    pub fn new(base_url: &str, web_token: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/{}", base_url.trim_end_matches('/'), ACCESS_PATH),
            web_token,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MetricsReporter for WebsiteReporter {
    async fn report(
        &self,
        repo_id: &RepoId,
        tag_name: &str,
        created_at: DateTime<Utc>,
        lead_time: LeadTime,
    ) -> Result<()> {
        let body = AccessReport {
            owner_name: &repo_id.owner,
            token: &self.web_token,
            repo_name: &repo_id.repo,
            tag: tag_name,
            created_at,
            lead_time,
        };

        self.client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

/// Sends a release's lead time, returning whether the report was accepted.
pub async fn send_data_to_website<R>(
    reporter: &R,
    repo_id: &RepoId,
    tag_name: &str,
    created_at: DateTime<Utc>,
    lead_time: LeadTime,
) -> bool
where
    R: MetricsReporter + ?Sized,
{
    match reporter
        .report(repo_id, tag_name, created_at, lead_time)
        .await
    {
        Ok(()) => {
            tracing::info!(repo = %repo_id, tag = tag_name, "Lead time sent to website");
            true
        }
        Err(e) => {
            tracing::warn!(
                repo = %repo_id,
                tag = tag_name,
                "Failed to send lead time to website: {}",
                e
            );
            false
        }
    }
}
