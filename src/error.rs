//! Error type shared by every step of a lead-time run.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced while computing or publishing a release's lead time.
#[derive(Debug, Error)]
pub enum Error {
    /// A remote call failed (network, authentication, or a non-2xx response).
    #[error("{0}")]
    Transport(#[source] BoxError),

    /// The release has no commits in its range.
    #[error("No commits since last release")]
    NoCommits,

    /// A negative commit count was handed to the calculator.
    #[error("Number of commits is negative")]
    NegativeCommitCount,

    /// The requested release index is past the end of the release list.
    #[error("release index {index} out of range ({available} releases available)")]
    ReleaseNotFound { index: usize, available: usize },

    /// The tag ref does not exist or never resolves to a commit.
    #[error("tag {tag} does not resolve to a commit")]
    TagNotFound { tag: String },

    /// A commit on the boundary of the range carries no author date.
    #[error("commit {sha} has no author date")]
    MissingAuthorDate { sha: String },

    /// An action input or runner variable could not be parsed.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The trigger payload is not valid JSON of the expected shape.
    #[error("invalid event payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        Error::Transport(Box::new(err))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(Box::new(err))
    }
}

impl From<envy::Error> for Error {
    fn from(err: envy::Error) -> Self {
        Error::Configuration(err.to_string())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculator_messages() {
        assert_eq!(Error::NoCommits.to_string(), "No commits since last release");
        assert_eq!(
            Error::NegativeCommitCount.to_string(),
            "Number of commits is negative"
        );
    }

    #[test]
    fn test_transport_keeps_source_message() {
        let err = Error::Transport("Bad credentials".into());
        assert_eq!(err.to_string(), "Bad credentials");
    }
}
