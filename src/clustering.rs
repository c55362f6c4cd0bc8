//! Account-creation date clustering.
//!
//! Bulk account creation on a handful of days is one of the strongest signs
//! of purchased stars. The thresholds are uneven: a day with more than 3 new
//! stargazers is listed, but it only reaches `Medium` severity above 5.

use crate::models::{
    ClusteringReport, ClusteringStatistics, CreationDateHistogram, Severity, SuspiciousDay,
};

const SUSPICIOUS_THRESHOLD: u64 = 3;
const MEDIUM_THRESHOLD: u64 = 5;
const HIGH_THRESHOLD: u64 = 10;

/// Shown by callers when `summary` comes back empty.
pub const NO_CLUSTERING_SUMMARY: &str =
    "No unusual clustering of account creation dates was detected.";

pub fn severity_for(count: u64) -> Severity {
    if count > HIGH_THRESHOLD {
        Severity::High
    } else if count > MEDIUM_THRESHOLD {
        Severity::Medium
    } else {
        Severity::Low
    }
}

pub fn analyze_creation_dates(histogram: &CreationDateHistogram) -> ClusteringReport {
    let mut entries: Vec<(&str, u64)> = histogram
        .iter()
        .map(|(date, count)| (date.as_str(), *count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));

    let max_accounts = entries.first().map(|(_, count)| *count).unwrap_or(0);
    let over_medium = entries.iter().filter(|(_, c)| *c > MEDIUM_THRESHOLD).count();
    let over_high = entries.iter().filter(|(_, c)| *c > HIGH_THRESHOLD).count();

    let suspicious_days: Vec<SuspiciousDay> = entries
        .iter()
        .filter(|(_, count)| *count > SUSPICIOUS_THRESHOLD)
        .map(|(date, count)| SuspiciousDay {
            date: date.to_string(),
            count: *count,
            severity: severity_for(*count),
        })
        .collect();

    let summary = build_summary(max_accounts, over_medium, suspicious_days.first());

    ClusteringReport {
        statistics: ClusteringStatistics {
            max_accounts_in_one_day: max_accounts,
            days_with_more_than5_accounts: over_medium,
            days_with_more_than10_accounts: over_high,
            total_suspicious_days: suspicious_days.len(),
        },
        suspicious_days,
        has_suspicious_pattern: max_accounts > MEDIUM_THRESHOLD,
        summary,
    }
}

fn build_summary(max_accounts: u64, over_medium: usize, top: Option<&SuspiciousDay>) -> String {
    let mut parts = Vec::new();

    if max_accounts > HIGH_THRESHOLD {
        parts.push(format!(
            "Critical: {max_accounts} accounts created in a single day"
        ));
    } else if max_accounts > MEDIUM_THRESHOLD {
        parts.push(format!(
            "Warning: {max_accounts} accounts created in a single day"
        ));
    }

    if over_medium > 1 {
        parts.push(format!("{over_medium} days had more than 5 accounts created"));
    }

    if let Some(day) = top {
        parts.push(format!(
            "Most active day: {} with {} accounts",
            day.date, day.count
        ));
    }

    parts.join(". ")
}

/// Total accounts across every date in the histogram.
pub fn suspicious_creations_count(histogram: &CreationDateHistogram) -> u64 {
    histogram.values().sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn histogram(entries: &[(&str, u64)]) -> CreationDateHistogram {
        entries
            .iter()
            .map(|(date, count)| (date.to_string(), *count))
            .collect()
    }

    #[test]
    fn empty_histogram_degrades_to_zero() {
        let report = analyze_creation_dates(&CreationDateHistogram::new());

        assert_eq!(report.statistics, ClusteringStatistics::default());
        assert!(report.suspicious_days.is_empty());
        assert!(!report.has_suspicious_pattern);
        assert_eq!(report.summary, "");
    }

    #[test]
    fn critical_cluster_scenario() {
        let report = analyze_creation_dates(&histogram(&[
            ("2024-01-01", 12),
            ("2024-01-02", 6),
            ("2024-01-03", 2),
        ]));

        assert_eq!(report.statistics.max_accounts_in_one_day, 12);
        assert_eq!(report.statistics.days_with_more_than5_accounts, 2);
        assert_eq!(report.statistics.days_with_more_than10_accounts, 1);
        assert_eq!(report.statistics.total_suspicious_days, 2);
        assert_eq!(
            report.suspicious_days,
            vec![
                SuspiciousDay {
                    date: "2024-01-01".to_string(),
                    count: 12,
                    severity: Severity::High,
                },
                SuspiciousDay {
                    date: "2024-01-02".to_string(),
                    count: 6,
                    severity: Severity::Medium,
                },
            ]
        );
        assert!(report.has_suspicious_pattern);
        assert_eq!(
            report.summary,
            "Critical: 12 accounts created in a single day. \
             2 days had more than 5 accounts created. \
             Most active day: 2024-01-01 with 12 accounts"
        );
    }

    #[test]
    fn warning_cluster_with_single_busy_day() {
        let report = analyze_creation_dates(&histogram(&[("2023-07-04", 8), ("2023-07-05", 1)]));

        assert_eq!(
            report.summary,
            "Warning: 8 accounts created in a single day. \
             Most active day: 2023-07-04 with 8 accounts"
        );
        assert!(report.has_suspicious_pattern);
    }

    #[test]
    fn low_band_days_are_listed_without_flagging() {
        let report = analyze_creation_dates(&histogram(&[("2022-02-02", 4), ("2022-02-03", 5)]));

        assert_eq!(report.statistics.total_suspicious_days, 2);
        assert!(report
            .suspicious_days
            .iter()
            .all(|day| day.severity == Severity::Low));
        assert!(!report.has_suspicious_pattern);
        assert_eq!(report.summary, "Most active day: 2022-02-03 with 5 accounts");
    }

    #[test]
    fn severity_threshold_boundaries() {
        assert_eq!(severity_for(3), Severity::Low);
        assert_eq!(severity_for(4), Severity::Low);
        assert_eq!(severity_for(5), Severity::Low);
        assert_eq!(severity_for(6), Severity::Medium);
        assert_eq!(severity_for(10), Severity::Medium);
        assert_eq!(severity_for(11), Severity::High);

        let report = analyze_creation_dates(&histogram(&[("2024-03-01", 3)]));
        assert!(report.suspicious_days.is_empty());
        assert_eq!(report.summary, "");
    }

    #[test]
    fn creations_count_sums_all_days() {
        let h = histogram(&[("2024-01-01", 12), ("2024-01-02", 6), ("2024-01-03", 2)]);
        assert_eq!(suspicious_creations_count(&h), 20);
        assert_eq!(suspicious_creations_count(&CreationDateHistogram::new()), 0);
    }

    proptest! {
        #[test]
        fn report_invariants_hold(
            raw in prop::collection::btree_map("20[0-9]{2}-[01][0-9]-[0-3][0-9]", 0u64..40, 0..30)
        ) {
            let report = analyze_creation_dates(&raw);
            let max = raw.values().copied().max().unwrap_or(0);

            prop_assert_eq!(
                report.statistics.total_suspicious_days,
                raw.values().filter(|c| **c > 3).count()
            );
            prop_assert_eq!(report.has_suspicious_pattern, max > 5);
            prop_assert_eq!(report.statistics.max_accounts_in_one_day, max);
            prop_assert!(report
                .suspicious_days
                .windows(2)
                .all(|pair| pair[0].count >= pair[1].count));
            for day in &report.suspicious_days {
                prop_assert!(day.count > 3);
                prop_assert_eq!(day.severity, severity_for(day.count));
            }
        }
    }
}
