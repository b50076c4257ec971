//! Writing the computed lead time back into a release description.

use crate::github::GitHubApi;
use crate::lead_time::LeadTime;

/// Appends the lead time line to an existing release description.
pub fn append_lead_time(body: &str, lead_time: LeadTime) -> String {
    format!("{body} \n Lead Time For Change In Days {lead_time}")
}

/// Replaces a release's description, reporting success as a boolean.
///
/// Failures are logged here; the caller decides whether to record them.
pub async fn update_release_body<G>(github: &G, release_id: u64, new_body: &str) -> bool
where
    G: GitHubApi + ?Sized,
{
    match github.patch_release_body(release_id, new_body).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(release_id, "Failed to update release body: {}", e);
            false
        }
    }
}
