use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::clustering::{self, NO_CLUSTERING_SUMMARY};
use crate::metrics::{
    days_old, format_count, format_fork_ratio, format_percentage, format_processing_time,
    percentage, stars_per_day,
};
use crate::models::{Analysis, AnalysisResult, Repository};
use crate::risk::{self, ShareLevel};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

const DISCLAIMER: &str = "This analysis is based on publicly available data and statistical \
patterns. Results should be interpreted as indicators rather than definitive proof of \
artificial starring. Multiple factors can influence star patterns, including viral growth, \
marketing campaigns, and genuine popularity spikes.";

/// Metadata for a shared result link and its preview image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareCard {
    pub title: String,
    pub description: String,
    pub url: String,
    pub image_url: String,
    pub level: ShareLevel,
    pub accent_color: &'static str,
    pub analysis_label: &'static str,
}

pub fn analysis_label(analysis: &Analysis) -> &'static str {
    if analysis.detailed_sample.unwrap_or(0) > 0 {
        "Advanced"
    } else {
        "Basic"
    }
}

pub fn share_card(
    id: Uuid,
    repository: &Repository,
    analysis: &Analysis,
    base_url: &str,
) -> ShareCard {
    let level = risk::share_card_policy(analysis.suspicion_score);
    let url = format!("{}/results/{}", base_url.trim_end_matches('/'), id);

    ShareCard {
        title: format!("{} - StarBuster Analysis", repository.full_name),
        description: format!(
            "Suspicion Score: {}/100 | {}",
            analysis.suspicion_score,
            level.label()
        ),
        image_url: format!("{url}/opengraph-image"),
        url,
        level,
        accent_color: level.color_hex(),
        analysis_label: analysis_label(analysis),
    }
}

fn pattern_line(output: &mut String, label: &str, count: u64, sample: u64) {
    let _ = writeln!(
        output,
        "| {} | {} | {} |",
        label,
        count,
        format_percentage(count, sample)
    );
}

pub fn build_report(result: &AnalysisResult, now: DateTime<Utc>) -> String {
    let repo = &result.repository;
    let analysis = &result.analysis;
    let metadata = &result.metadata;
    let sample = analysis.analyzed_sample;

    let mut output = String::new();

    let _ = writeln!(output, "# StarBuster Analysis Report");
    let _ = writeln!(
        output,
        "Generated for {} ({} analysis, {})",
        repo.full_name,
        metadata.analysis_type.as_str(),
        metadata.analyzed_at.format("%Y-%m-%d %H:%M UTC")
    );
    if let Some(share_url) = &result.share_url {
        let _ = writeln!(output, "Share: {share_url}");
    }

    let age = days_old(repo.created_at, now);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Repository");
    if let Some(description) = repo.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(output, "{description}");
        let _ = writeln!(output);
    }
    let _ = writeln!(output, "- Stars: {}", format_count(repo.stars));
    let _ = writeln!(output, "- Forks: {}", format_count(repo.forks));
    let _ = writeln!(output, "- Stars/day: {:.1}", stars_per_day(repo.stars, age));
    let _ = writeln!(output, "- Days old: {age}");
    let _ = writeln!(output, "- Open issues: {}", format_count(repo.open_issues));
    let _ = writeln!(output, "- Watchers: {}", format_count(repo.watchers));
    let _ = writeln!(
        output,
        "- Language: {}",
        repo.language.as_deref().unwrap_or("N/A")
    );
    let _ = writeln!(output, "- Created: {}", repo.created_at.format("%Y-%m-%d"));

    let band = risk::three_band_policy(analysis.suspicion_score);
    let display = band.display();
    let _ = writeln!(output);
    let _ = writeln!(output, "## Suspicion Analysis");
    let _ = writeln!(output, "**{}/100**", analysis.suspicion_score);
    let _ = writeln!(
        output,
        "{} {} suspicion of artificial stars",
        display.emoji, display.level
    );

    if let Some((real, fake)) = analysis.star_split() {
        let _ = writeln!(output);
        let _ = writeln!(output, "- Real stars: {real}");
        let _ = writeln!(output, "- Fake stars: {fake}");
    }

    if !analysis.suspicion_indicators.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "Key indicators:");
        for indicator in &analysis.suspicion_indicators {
            let _ = writeln!(output, "- {indicator}");
        }
    }

    let basic = analysis.patterns.basic();
    let creations = clustering::suspicious_creations_count(&basic.suspicious_creation_dates);
    let _ = writeln!(output);
    let _ = writeln!(output, "## User Patterns");
    let _ = write!(output, "Analysis of {} star accounts", format_count(sample));
    match analysis.detailed_sample.or(Some(metadata.detailed_sample)) {
        Some(detailed) if detailed > 0 => {
            let _ = writeln!(output, " ({} detailed)", format_count(detailed));
        }
        _ => {
            let _ = writeln!(output);
        }
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "| Pattern | Accounts | Share |");
    let _ = writeln!(output, "|---|---|---|");
    pattern_line(&mut output, "Generic usernames", basic.generic_usernames, sample);
    pattern_line(&mut output, "Bot-like names", basic.bot_like_names, sample);
    pattern_line(&mut output, "Suspicious creation dates", creations, sample);
    if let Some(advanced) = analysis.patterns.advanced() {
        pattern_line(&mut output, "No email", advanced.no_email, sample);
        pattern_line(&mut output, "No bio", advanced.no_bio, sample);
        pattern_line(&mut output, "No blog", advanced.no_blog, sample);
        pattern_line(&mut output, "Low engagement", advanced.low_engagement, sample);
        pattern_line(&mut output, "Coordinated", advanced.coordinated, sample);
        pattern_line(&mut output, "Same-day pattern", advanced.same_day_pattern, sample);
        pattern_line(&mut output, "New accounts", advanced.new_accounts, sample);
        pattern_line(&mut output, "No repositories", advanced.no_repos, sample);
    }

    let clusters = clustering::analyze_creation_dates(&basic.suspicious_creation_dates);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Account Creation Clustering");
    if clusters.summary.is_empty() {
        let _ = writeln!(output, "{NO_CLUSTERING_SUMMARY}");
    } else {
        let _ = writeln!(output, "{}.", clusters.summary);
    }
    let stats = &clusters.statistics;
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "- Max accounts in one day: {}",
        stats.max_accounts_in_one_day
    );
    let _ = writeln!(
        output,
        "- Days with more than 5 accounts: {}",
        stats.days_with_more_than5_accounts
    );
    let _ = writeln!(
        output,
        "- Days with more than 10 accounts: {}",
        stats.days_with_more_than10_accounts
    );
    let _ = writeln!(output, "- Suspicious days: {}", stats.total_suspicious_days);
    if !clusters.suspicious_days.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "| Date | Accounts | Severity |");
        let _ = writeln!(output, "|---|---|---|");
        for day in &clusters.suspicious_days {
            let _ = writeln!(output, "| {} | {} | {:?} |", day.date, day.count, day.severity);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Engagement Metrics");
    let fork_share = percentage(repo.forks, repo.stars)
        .map(|value| format!("{value:.1}%"))
        .unwrap_or_else(|| "N/A".to_string());
    let _ = writeln!(
        output,
        "- Fork-to-star ratio: {} (forks are {} of stars)",
        format_fork_ratio(repo.stars, repo.forks),
        fork_share
    );
    let _ = writeln!(
        output,
        "- Sample size: {} accounts analyzed",
        format_count(metadata.sample_size)
    );
    let _ = writeln!(
        output,
        "- Processing time: {}",
        format_processing_time(metadata.processing_time)
    );
    let _ = writeln!(
        output,
        "- Analysis date: {}",
        metadata.analyzed_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let windows = analysis.time_windows();
    if !windows.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Suspicious Time Windows");
        for window in windows {
            let _ = writeln!(output, "- {}: {} stars", window.time, window.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "> **Disclaimer:** {DISCLAIMER}");

    output
}
