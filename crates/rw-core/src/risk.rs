//! Risk aggregation and banding.
//!
//! Aggregates per-technique 1-10 scores into a single asset-level risk value
//! and maps values onto the five-band severity scale used throughout the
//! report.

use serde::{Deserialize, Serialize};

/// Arithmetic mean of the given scores, rounded to one decimal place.
///
/// Returns 0.0 for an empty set.
pub fn average_risk(scores: &[u8]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let total: u32 = scores.iter().map(|&s| s as u32).sum();
    round_to_tenth(total as f64 / scores.len() as f64)
}

/// Weighted mean `Σ(score·weight) / Σ(weight)`, rounded to one decimal place.
///
/// Falls back to the unweighted mean when the weight list does not match the
/// score list in length, or when the weights sum to a non-positive total.
pub fn weighted_average_risk(scores: &[u8], weights: &[f64]) -> f64 {
    if scores.len() != weights.len() {
        return average_risk(scores);
    }
    let total_weight: f64 = weights.iter().sum();
    if total_weight <= 0.0 {
        return average_risk(scores);
    }
    let weighted_sum: f64 = scores
        .iter()
        .zip(weights)
        .map(|(&score, &weight)| score as f64 * weight)
        .sum();
    round_to_tenth(weighted_sum / total_weight)
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Severity band for a risk value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Below 3.
    Minimal,
    /// 3 up to 5.
    Low,
    /// 5 up to 7.
    Medium,
    /// 7 up to 9.
    High,
    /// 9 and above.
    Critical,
}

impl RiskLevel {
    /// Bands a risk value: `>=9` Critical, `>=7` High, `>=5` Medium,
    /// `>=3` Low, otherwise Minimal.
    pub fn from_score(score: f64) -> Self {
        if score >= 9.0 {
            RiskLevel::Critical
        } else if score >= 7.0 {
            RiskLevel::High
        } else if score >= 5.0 {
            RiskLevel::Medium
        } else if score >= 3.0 {
            RiskLevel::Low
        } else {
            RiskLevel::Minimal
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Minimal => write!(f, "Minimal"),
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
            RiskLevel::Critical => write!(f, "Critical"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_of_empty_set_is_zero() {
        assert_eq!(average_risk(&[]), 0.0);
    }

    #[test]
    fn test_average_rounds_to_one_decimal() {
        assert_eq!(average_risk(&[4, 6, 8]), 6.0);
        assert_eq!(average_risk(&[1, 2]), 1.5);
        // 10/3 = 3.333... -> 3.3
        assert_eq!(average_risk(&[3, 3, 4]), 3.3);
        // 20/3 = 6.666... -> 6.7
        assert_eq!(average_risk(&[6, 7, 7]), 6.7);
    }

    #[test]
    fn test_average_stays_within_score_range() {
        assert_eq!(average_risk(&[1, 1, 1]), 1.0);
        assert_eq!(average_risk(&[10, 10]), 10.0);
        for scores in [&[1u8, 10][..], &[2, 5, 9], &[7]] {
            let mean = average_risk(scores);
            assert!((1.0..=10.0).contains(&mean), "mean {} out of range", mean);
        }
    }

    #[test]
    fn test_weighted_average() {
        // (2*3 + 8*1) / 4 = 3.5
        assert_eq!(weighted_average_risk(&[2, 8], &[3.0, 1.0]), 3.5);
        // Equal weights match the unweighted mean.
        assert_eq!(
            weighted_average_risk(&[4, 6, 8], &[1.0, 1.0, 1.0]),
            average_risk(&[4, 6, 8])
        );
    }

    #[test]
    fn test_weighted_average_falls_back_on_length_mismatch() {
        assert_eq!(weighted_average_risk(&[4, 6, 8], &[1.0, 2.0]), 6.0);
        assert_eq!(weighted_average_risk(&[4, 6, 8], &[]), 6.0);
    }

    #[test]
    fn test_weighted_average_falls_back_on_degenerate_weights() {
        assert_eq!(weighted_average_risk(&[4, 6, 8], &[0.0, 0.0, 0.0]), 6.0);
    }

    #[test]
    fn test_risk_level_bands_at_boundaries() {
        assert_eq!(RiskLevel::from_score(9.0), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(7.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(5.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(3.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(1.0), RiskLevel::Minimal);
    }

    #[test]
    fn test_risk_level_bands_between_boundaries() {
        assert_eq!(RiskLevel::from_score(10.0), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(8.9), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(6.9), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(4.9), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(2.9), RiskLevel::Minimal);
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Minimal);
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Critical > RiskLevel::High);
        assert!(RiskLevel::Medium > RiskLevel::Low);
        assert!(RiskLevel::Low > RiskLevel::Minimal);
    }

    #[test]
    fn test_scenario_average_and_band() {
        let mean = average_risk(&[4, 6, 8]);
        assert_eq!(mean, 6.0);
        assert_eq!(RiskLevel::from_score(mean), RiskLevel::Medium);
    }
}
