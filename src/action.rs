//! The GitHub Actions side of a run: the triggering event and the step's
//! outputs and failure annotations.

use crate::error::Result;
use crate::types::{Release, RepoId};
use serde::Deserialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Output name under which the most recent release's lead time is published.
pub const LEAD_TIME_OUTPUT: &str = "lead-time-for-change";

/// The parts of a `release` event payload this action reads.
#[derive(Clone, Debug, Deserialize)]
pub struct ReleaseEvent {
    pub repository: EventRepository,
    /// Absent when the workflow was triggered by something other than a release.
    #[serde(default)]
    pub release: Option<Release>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EventRepository {
    pub owner: EventOwner,
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EventOwner {
    pub login: String,
}

impl ReleaseEvent {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn repo_id(&self) -> RepoId {
        RepoId::new(&self.repository.owner.login, &self.repository.name)
    }
}

/// Writes step outputs and failure annotations.
#[derive(Clone, Debug, Default)]
pub struct ActionOutput {
    output_path: Option<PathBuf>,
}

impl ActionOutput {
    /// `output_path` is the runner's `GITHUB_OUTPUT` file; without one,
    /// outputs are printed to stdout.
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn set_output(&self, name: &str, value: &str) -> Result<()> {
        match &self.output_path {
            Some(path) => {
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                writeln!(file, "{name}={value}")?;
            }
            None => println!("{name}={value}"),
        }
        Ok(())
    }

    /// Emits an `::error::` workflow command so the failure shows on the run.
    pub fn set_failed(&self, message: &str) {
        println!("::error::{}", escape_data(message));
    }
}

/// Escapes a workflow command message.
fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
