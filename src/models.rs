use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::risk;

/// Account-creation date (`YYYY-MM-DD`) to number of stargazers created that day.
pub type CreationDateHistogram = BTreeMap<String, u64>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    #[serde(alias = "full_name")]
    pub full_name: String,
    #[serde(alias = "stargazers_count")]
    pub stars: u64,
    #[serde(alias = "forks_count")]
    pub forks: u64,
    #[serde(alias = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "open_issues_count")]
    pub open_issues: u64,
    #[serde(default, alias = "watchers_count")]
    pub watchers: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicPatterns {
    #[serde(default)]
    pub generic_usernames: u64,
    #[serde(default)]
    pub bot_like_names: u64,
    #[serde(default)]
    pub suspicious_creation_dates: CreationDateHistogram,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspiciousTimeWindow {
    pub time: String,
    pub count: u64,
}

/// Extended pattern counts. Only `newAccounts` is required; it is the field
/// that marks a payload as advanced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedPatterns {
    #[serde(flatten)]
    pub basic: BasicPatterns,
    pub new_accounts: u64,
    #[serde(default)]
    pub no_repos: u64,
    #[serde(default)]
    pub no_email: u64,
    #[serde(default)]
    pub no_bio: u64,
    #[serde(default)]
    pub no_blog: u64,
    #[serde(default)]
    pub low_engagement: u64,
    #[serde(default)]
    pub coordinated: u64,
    #[serde(default)]
    pub same_day_pattern: u64,
    #[serde(default)]
    pub star_velocity_spikes: Vec<String>,
    #[serde(default)]
    pub real_stars: u64,
    #[serde(default)]
    pub fake_stars: u64,
    #[serde(default)]
    pub suspicious_time_windows: Vec<SuspiciousTimeWindow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PatternSet {
    Basic(BasicPatterns),
    Advanced(AdvancedPatterns),
}

impl PatternSet {
    pub fn basic(&self) -> &BasicPatterns {
        match self {
            PatternSet::Basic(basic) => basic,
            PatternSet::Advanced(advanced) => &advanced.basic,
        }
    }

    pub fn advanced(&self) -> Option<&AdvancedPatterns> {
        match self {
            PatternSet::Advanced(advanced) => Some(advanced),
            PatternSet::Basic(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for PatternSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let advanced = match value.get("kind").and_then(Value::as_str) {
            Some("advanced") => true,
            Some("basic") => false,
            // payloads from the analysis API carry no tag
            _ => risk::is_advanced_patterns(&value),
        };

        if advanced {
            AdvancedPatterns::deserialize(value)
                .map(PatternSet::Advanced)
                .map_err(D::Error::custom)
        } else {
            BasicPatterns::deserialize(value)
                .map(PatternSet::Basic)
                .map_err(D::Error::custom)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub total_stars: u64,
    pub analyzed_sample: u64,
    #[serde(default)]
    pub detailed_sample: Option<u64>,
    pub patterns: PatternSet,
    #[serde(default)]
    pub suspicion_indicators: Vec<String>,
    pub suspicion_score: u32,
    #[serde(default)]
    pub real_stars: Option<u64>,
    #[serde(default)]
    pub fake_stars: Option<u64>,
    #[serde(default)]
    pub suspicious_time_windows: Option<Vec<SuspiciousTimeWindow>>,
}

impl Analysis {
    /// Real/fake star split, wherever the payload put it.
    pub fn star_split(&self) -> Option<(u64, u64)> {
        match (self.real_stars, self.fake_stars) {
            (Some(real), fake) => Some((real, fake.unwrap_or(0))),
            (None, _) => self
                .patterns
                .advanced()
                .map(|advanced| (advanced.real_stars, advanced.fake_stars)),
        }
    }

    pub fn time_windows(&self) -> &[SuspiciousTimeWindow] {
        match &self.suspicious_time_windows {
            Some(windows) => windows,
            None => self
                .patterns
                .advanced()
                .map(|advanced| advanced.suspicious_time_windows.as_slice())
                .unwrap_or(&[]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    Basic,
    Advanced,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::Basic => "basic",
            AnalysisType::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub analyzed_at: DateTime<Utc>,
    pub analysis_type: AnalysisType,
    #[serde(default)]
    pub sample_size: u64,
    #[serde(default)]
    pub detailed_sample: u64,
    #[serde(default)]
    pub processing_time: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub repository: Repository,
    pub analysis: Analysis,
    pub metadata: Metadata,
    #[serde(default)]
    pub share_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspiciousDay {
    pub date: String,
    pub count: u64,
    pub severity: Severity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusteringStatistics {
    pub max_accounts_in_one_day: u64,
    pub days_with_more_than5_accounts: usize,
    pub days_with_more_than10_accounts: usize,
    pub total_suspicious_days: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusteringReport {
    pub statistics: ClusteringStatistics,
    pub suspicious_days: Vec<SuspiciousDay>,
    pub has_suspicious_pattern: bool,
    pub summary: String,
}

/// A persisted analysis as read back from the store.
#[derive(Debug, Clone)]
pub struct StoredAnalysis {
    pub id: Uuid,
    pub repository: Repository,
    pub analysis: Analysis,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
