use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Aggregate figures derived from the profile plus up to 100 repositories.
/// Never fetched as-is; recomputed from scratch on every stats call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub total_repos: u32,
    pub total_stars: u64,
    pub total_forks: u64,
    pub followers: u32,
    pub following: u32,
    /// Language name to cumulative byte count, merged by addition across
    /// every repository's histogram.
    pub languages: HashMap<String, u64>,
}

/// One row of a language histogram after sorting and percentage derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageBreakdown {
    pub language: String,
    pub bytes: u64,
    pub percentage: u32,
}

/// Adds one repository's histogram into a running total.
pub fn merge_language_histogram(total: &mut HashMap<String, u64>, part: HashMap<String, u64>) {
    for (language, bytes) in part {
        *total.entry(language).or_insert(0) += bytes;
    }
}
