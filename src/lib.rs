pub mod action;
pub mod commits;
pub mod config;
pub mod error;
pub mod github;
pub mod lead_time;
pub mod orchestrator;
pub mod paginate;
pub mod release;
pub mod reporter;
pub mod types;
pub mod updater;

use action::{ActionOutput, ReleaseEvent, LEAD_TIME_OUTPUT};
use anyhow::Context;
use config::{ActionConfig, RunnerEnv};
use github::GitHubClient;
use orchestrator::{Orchestrator, RunReport};
use reporter::WebsiteReporter;

/// Everything a run needs, loaded from the step's environment.
pub struct ActionContext {
    /// Action inputs.
    pub config: ActionConfig,
    /// Runner-provided variables.
    pub runner: RunnerEnv,
    /// The event that triggered the workflow.
    pub event: ReleaseEvent,
}

impl ActionContext {
    /// Loads inputs, runner variables and the event payload.
    ///
    /// Any failure here aborts the whole run.
    pub fn from_env() -> anyhow::Result<Self> {
        let config = ActionConfig::from_env().context("Failed to read action inputs")?;
        let runner = RunnerEnv::from_env().context("Failed to read runner environment")?;
        let event = ReleaseEvent::from_path(&runner.event_path).with_context(|| {
            format!("Failed to read event payload {}", runner.event_path.display())
        })?;

        Ok(Self {
            config,
            runner,
            event,
        })
    }

    pub fn output(&self) -> ActionOutput {
        ActionOutput::new(self.runner.output.clone())
    }
}

/// Computes and publishes lead times for the releases selected by the inputs.
pub async fn run(context: &ActionContext) -> anyhow::Result<RunReport> {
    let repo_id = context.event.repo_id();
    let config = &context.config;

    let github = GitHubClient::new(
        repo_id.clone(),
        config.auth_token.clone(),
        context.runner.api_url.as_deref(),
    )?;
    let reporter = match (&config.web_token, &config.report_url) {
        (Some(token), Some(url)) => Some(WebsiteReporter::new(url, token.clone())?),
        (Some(_), None) => {
            tracing::warn!("web-token is set but report-url is not, skipping website reports");
            None
        }
        (None, _) => None,
    };

    let orchestrator = Orchestrator::new(github, reporter, repo_id, config.max_commit_pages);
    let report = orchestrator.run(context.event.release.clone(), config).await;

    if let Some(lead_time) = report.lead_time {
        context
            .output()
            .set_output(LEAD_TIME_OUTPUT, &lead_time.to_string())
            .context("Failed to write step output")?;
    }

    Ok(report)
}
