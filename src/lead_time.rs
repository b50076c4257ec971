//! Lead time for change: days per commit between a release and its first commit.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

const MILLIS_PER_DAY: f64 = 1000.0 * 60.0 * 60.0 * 24.0;

/// Days per commit between the first commit of a release and its creation.
///
/// Always non-negative and rounded to two decimals. Displays and serializes
/// with exactly two fraction digits, e.g. `"4.00"`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct LeadTime(f64);

impl LeadTime {
    pub fn days(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for LeadTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for LeadTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Calculates the lead time for change of a release.
///
/// The day span is the absolute difference between the two timestamps, so
/// their order does not matter. Both the span and the per-commit quotient are
/// rounded to two decimals.
pub fn get_lead_time(
    created_at: DateTime<Utc>,
    first_time: DateTime<Utc>,
    num_commits: i64,
) -> Result<LeadTime> {
    if num_commits == 0 {
        return Err(Error::NoCommits);
    }
    if num_commits < 0 {
        return Err(Error::NegativeCommitCount);
    }

    let millis = (created_at - first_time).num_milliseconds().abs();
    let days = round2(millis as f64 / MILLIS_PER_DAY);

    Ok(LeadTime(round2(days / num_commits as f64)))
}
