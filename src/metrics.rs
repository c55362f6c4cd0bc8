use chrono::{DateTime, Utc};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Whole days between `created_at` and `now`, rounded down.
pub fn days_old(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - created_at).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

pub fn stars_per_day(stars: u64, days_old: i64) -> f64 {
    if days_old > 0 {
        stars as f64 / days_old as f64
    } else {
        0.0
    }
}

/// Stars per fork, rounded. `None` when the repository has no forks.
pub fn fork_to_star_ratio(stars: u64, forks: u64) -> Option<u64> {
    if forks == 0 {
        return None;
    }
    Some((stars as f64 / forks as f64).round() as u64)
}

pub fn format_fork_ratio(stars: u64, forks: u64) -> String {
    match fork_to_star_ratio(stars, forks) {
        Some(ratio) => format!("1:{ratio}"),
        None => "N/A".to_string(),
    }
}

/// `part` as a percentage of `whole`, `None` when `whole` is zero.
pub fn percentage(part: u64, whole: u64) -> Option<f64> {
    if whole == 0 {
        return None;
    }
    Some(part as f64 / whole as f64 * 100.0)
}

pub fn format_percentage(part: u64, whole: u64) -> String {
    match percentage(part, whole) {
        Some(value) => format!("{value:.1}%"),
        None => "N/A".to_string(),
    }
}

/// One decimal place, halves rounded away from zero (`1.25` -> `1.3`).
fn one_decimal(value: f64) -> String {
    format!("{:.1}", (value * 10.0).round() / 10.0)
}

pub fn format_number(num: f64) -> String {
    if num.is_nan() {
        return "0".to_string();
    }
    if num >= 1_000_000.0 {
        return format!("{}M", one_decimal(num / 1_000_000.0));
    }
    if num >= 1_000.0 {
        return format!("{}K", one_decimal(num / 1_000.0));
    }
    num.to_string()
}

pub fn format_count(num: u64) -> String {
    format_number(num as f64)
}

pub fn format_processing_time(ms: u64) -> String {
    let seconds = ms / 1000;
    let minutes = seconds / 60;
    if minutes > 0 {
        format!("{}m {}s", minutes, seconds % 60)
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn days_old_floors_partial_days() {
        let created = at(2024, 1, 1, 12);
        assert_eq!(days_old(created, at(2024, 1, 11, 11)), 9);
        assert_eq!(days_old(created, at(2024, 1, 11, 12)), 10);
        assert_eq!(days_old(created, created + Duration::hours(3)), 0);
    }

    #[test]
    fn days_old_in_future_is_negative() {
        let created = at(2024, 1, 2, 0);
        assert_eq!(days_old(created, at(2024, 1, 1, 12)), -1);
        assert_eq!(days_old(created, created - Duration::milliseconds(500)), -1);
        assert_eq!(days_old(created, created + Duration::milliseconds(500)), 0);
    }

    #[test]
    fn stars_per_day_guards_zero_days() {
        assert_eq!(stars_per_day(100, 0), 0.0);
        assert_eq!(stars_per_day(100, -3), 0.0);
        assert_eq!(stars_per_day(100, 4), 25.0);
    }

    #[test]
    fn fork_ratio_rounds_and_guards_zero() {
        assert_eq!(fork_to_star_ratio(1000, 30), Some(33));
        assert_eq!(fork_to_star_ratio(1000, 0), None);
        assert_eq!(format_fork_ratio(500, 200), "1:3");
        assert_eq!(format_fork_ratio(500, 0), "N/A");
    }

    #[test]
    fn percentage_guards_zero_denominator() {
        assert_eq!(format_percentage(25, 200), "12.5%");
        assert_eq!(format_percentage(5, 0), "N/A");
        assert_eq!(percentage(0, 0), None);
    }

    #[test]
    fn number_formatting_tiers() {
        assert_eq!(format_number(999.0), "999");
        assert_eq!(format_number(1500.0), "1.5K");
        assert_eq!(format_number(2_300_000.0), "2.3M");
        assert_eq!(format_number(f64::NAN), "0");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_count(1_000), "1.0K");
    }

    #[test]
    fn number_formatting_rounds_halves_up() {
        assert_eq!(format_number(1250.0), "1.3K");
        assert_eq!(format_number(12_250.0), "12.3K");
        assert_eq!(format_number(2_250_000.0), "2.3M");
        assert_eq!(format_count(1_240), "1.2K");
        assert_eq!(format_count(999_999), "1000.0K");
    }

    #[test]
    fn processing_time_formatting() {
        assert_eq!(format_processing_time(999), "0s");
        assert_eq!(format_processing_time(45_500), "45s");
        assert_eq!(format_processing_time(125_000), "2m 5s");
    }
}
