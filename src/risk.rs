use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

/// Presentation attributes attached to a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BandDisplay {
    pub level: &'static str,
    pub color: &'static str,
    pub background: &'static str,
    pub icon: &'static str,
    pub emoji: &'static str,
}

static LOW_DISPLAY: BandDisplay = BandDisplay {
    level: "LOW",
    color: "text-green-700",
    background: "bg-green-50",
    icon: "check-circle",
    emoji: "\u{2705}",
};

static MEDIUM_DISPLAY: BandDisplay = BandDisplay {
    level: "MEDIUM",
    color: "text-orange-700",
    background: "bg-orange-50",
    icon: "alert-triangle",
    emoji: "\u{26a0}\u{fe0f}",
};

static HIGH_DISPLAY: BandDisplay = BandDisplay {
    level: "HIGH",
    color: "text-red-700",
    background: "bg-red-50",
    icon: "alert-circle",
    emoji: "\u{1f6a8}",
};

impl RiskBand {
    pub fn display(&self) -> &'static BandDisplay {
        match self {
            RiskBand::Low => &LOW_DISPLAY,
            RiskBand::Medium => &MEDIUM_DISPLAY,
            RiskBand::High => &HIGH_DISPLAY,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.display().level
    }
}

/// Bands used on the full results page: `< 30` low, `< 60` medium, else high.
pub fn three_band_policy(score: u32) -> RiskBand {
    match score {
        0..=29 => RiskBand::Low,
        30..=59 => RiskBand::Medium,
        _ => RiskBand::High,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShareLevel {
    #[serde(rename = "Low Risk")]
    LowRisk,
    #[serde(rename = "Medium Risk")]
    MediumRisk,
    #[serde(rename = "High Risk")]
    HighRisk,
}

impl ShareLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ShareLevel::LowRisk => "Low Risk",
            ShareLevel::MediumRisk => "Medium Risk",
            ShareLevel::HighRisk => "High Risk",
        }
    }

    /// Accent used on the rendered share card.
    pub fn color_hex(&self) -> &'static str {
        match self {
            ShareLevel::LowRisk => "#059669",
            ShareLevel::MediumRisk => "#d97706",
            ShareLevel::HighRisk => "#dc2626",
        }
    }
}

/// Bands used for shared links and preview images: `>= 70` high, `>= 40` medium.
pub fn share_card_policy(score: u32) -> ShareLevel {
    if score >= 70 {
        ShareLevel::HighRisk
    } else if score >= 40 {
        ShareLevel::MediumRisk
    } else {
        ShareLevel::LowRisk
    }
}

/// True when a raw pattern object carries a `newAccounts` value.
///
/// Only presence matters; the other advanced fields may be missing. A JSON
/// `null` counts as absent.
pub fn is_advanced_patterns(patterns: &Value) -> bool {
    patterns
        .get("newAccounts")
        .is_some_and(|value| !value.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn three_band_boundaries() {
        assert_eq!(three_band_policy(0), RiskBand::Low);
        assert_eq!(three_band_policy(29), RiskBand::Low);
        assert_eq!(three_band_policy(30), RiskBand::Medium);
        assert_eq!(three_band_policy(59), RiskBand::Medium);
        assert_eq!(three_band_policy(60), RiskBand::High);
        assert_eq!(three_band_policy(100), RiskBand::High);
    }

    #[test]
    fn share_card_boundaries() {
        assert_eq!(share_card_policy(39), ShareLevel::LowRisk);
        assert_eq!(share_card_policy(40), ShareLevel::MediumRisk);
        assert_eq!(share_card_policy(69), ShareLevel::MediumRisk);
        assert_eq!(share_card_policy(70), ShareLevel::HighRisk);
    }

    #[test]
    fn policies_disagree_between_thirty_and_forty() {
        assert_eq!(three_band_policy(35), RiskBand::Medium);
        assert_eq!(share_card_policy(35), ShareLevel::LowRisk);
        assert_eq!(three_band_policy(65), RiskBand::High);
        assert_eq!(share_card_policy(65), ShareLevel::MediumRisk);
    }

    #[test]
    fn band_display_table() {
        let high = RiskBand::High.display();
        assert_eq!(high.level, "HIGH");
        assert_eq!(high.color, "text-red-700");
        assert_eq!(high.background, "bg-red-50");
        assert_eq!(RiskBand::Low.display().emoji, "\u{2705}");
        assert_eq!(RiskBand::Medium.as_str(), "MEDIUM");
    }

    #[test]
    fn advanced_detection_uses_new_accounts_only() {
        assert!(is_advanced_patterns(&json!({"newAccounts": 0})));
        assert!(is_advanced_patterns(&json!({"genericUsernames": 1, "newAccounts": 5})));
        assert!(!is_advanced_patterns(&json!({
            "genericUsernames": 1,
            "noBio": 4,
            "coordinated": 2
        })));
        assert!(!is_advanced_patterns(&json!({"newAccounts": null})));
        assert!(!is_advanced_patterns(&json!([1, 2, 3])));
    }
}
