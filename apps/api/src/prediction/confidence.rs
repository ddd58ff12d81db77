//! Threshold and banding rules applied to the model's fraud probability.
//!
//! Decisions are always taken on the unrounded probability; rounding to
//! percentages only happens for display.

use std::fmt;

use serde::Serialize;

/// Probabilities strictly above this are labelled fake.
pub const FAKE_THRESHOLD: f64 = 0.5;

/// Lower bounds (inclusive) of each confidence band, highest first.
const BANDS: &[(f64, ConfidenceLevel)] = &[
    (0.85, ConfidenceLevel::VeryHigh),
    (0.70, ConfidenceLevel::High),
    (0.55, ConfidenceLevel::Medium),
];

pub const FAKE_MESSAGE: &str = "⚠️ This job posting appears to be FRAUDULENT. Be cautious!";
pub const REAL_MESSAGE: &str = "✓ This job posting appears to be LEGITIMATE.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Fake,
    Real,
}

impl Label {
    pub fn message(self) -> &'static str {
        match self {
            Label::Fake => FAKE_MESSAGE,
            Label::Real => REAL_MESSAGE,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Label::Fake => "fake",
            Label::Real => "real",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfidenceLevel {
    #[serde(rename = "Very High")]
    VeryHigh,
    High,
    Medium,
    Low,
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConfidenceLevel::VeryHigh => "Very High",
            ConfidenceLevel::High => "High",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::Low => "Low",
        })
    }
}

pub fn label_for(fraud_probability: f64) -> Label {
    if fraud_probability > FAKE_THRESHOLD {
        Label::Fake
    } else {
        Label::Real
    }
}

/// Maps a confidence in [0.5, 1.0] to its band; first band whose lower bound is met wins.
pub fn band(confidence: f64) -> ConfidenceLevel {
    BANDS
        .iter()
        .find(|(lower, _)| confidence >= *lower)
        .map_or(ConfidenceLevel::Low, |(_, level)| *level)
}

/// Scales a probability to a percentage rounded to two decimals.
pub fn to_percent(probability: f64) -> f64 {
    (probability * 10_000.0).round() / 100.0
}

/// Outcome of scoring one posting. Probabilities are unrounded fractions.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub label: Label,
    pub fraud_probability: f64,
    pub real_probability: f64,
    pub confidence: f64,
    pub confidence_level: ConfidenceLevel,
    pub message: &'static str,
}

impl PredictionResult {
    /// Builds the full result from a fraud probability in [0, 1].
    pub fn from_probability(fraud_probability: f64) -> Self {
        let real_probability = 1.0 - fraud_probability;
        let confidence = fraud_probability.max(real_probability);
        let label = label_for(fraud_probability);
        Self {
            label,
            fraud_probability,
            real_probability,
            confidence,
            confidence_level: band(confidence),
            message: label.message(),
        }
    }

    pub fn is_fake(&self) -> bool {
        self.label == Label::Fake
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(band(0.85), ConfidenceLevel::VeryHigh);
        assert_eq!(band(0.8499), ConfidenceLevel::High);
        assert_eq!(band(0.70), ConfidenceLevel::High);
        assert_eq!(band(0.6999), ConfidenceLevel::Medium);
        assert_eq!(band(0.55), ConfidenceLevel::Medium);
        assert_eq!(band(0.5499), ConfidenceLevel::Low);
        assert_eq!(band(0.5), ConfidenceLevel::Low);
        assert_eq!(band(1.0), ConfidenceLevel::VeryHigh);
    }

    #[test]
    fn test_label_boundary_is_strict() {
        assert_eq!(label_for(0.5), Label::Real);
        assert_eq!(label_for(0.5001), Label::Fake);
        assert_eq!(label_for(0.0), Label::Real);
        assert_eq!(label_for(1.0), Label::Fake);
    }

    #[test]
    fn test_result_from_fraud_probability() {
        let r = PredictionResult::from_probability(0.9);
        assert!(r.is_fake());
        assert!((r.real_probability - 0.1).abs() < 1e-12);
        assert_eq!(r.confidence, 0.9);
        assert_eq!(r.confidence_level, ConfidenceLevel::VeryHigh);
        assert_eq!(r.message, FAKE_MESSAGE);
    }

    #[test]
    fn test_result_for_legitimate_posting_uses_real_side_confidence() {
        let r = PredictionResult::from_probability(0.2);
        assert_eq!(r.label, Label::Real);
        assert!((r.confidence - 0.8).abs() < 1e-12);
        assert_eq!(r.confidence_level, ConfidenceLevel::High);
        assert_eq!(r.message, REAL_MESSAGE);
    }

    #[test]
    fn test_exact_half_is_real_with_low_confidence() {
        let r = PredictionResult::from_probability(0.5);
        assert_eq!(r.label, Label::Real);
        assert_eq!(r.confidence, 0.5);
        assert_eq!(r.confidence_level, ConfidenceLevel::Low);
    }

    #[test]
    fn test_invariants_hold_across_range() {
        for i in 0..=1000 {
            let p = i as f64 / 1000.0;
            let r = PredictionResult::from_probability(p);
            assert!((r.fraud_probability + r.real_probability - 1.0).abs() < 1e-12);
            assert_eq!(r.confidence, r.fraud_probability.max(r.real_probability));
            assert!((0.5..=1.0).contains(&r.confidence));
            assert!((to_percent(r.fraud_probability) + to_percent(r.real_probability) - 100.0).abs() <= 0.01 + 1e-9);
        }
    }

    #[test]
    fn test_to_percent_rounds_two_decimals() {
        assert_eq!(to_percent(0.123456), 12.35);
        assert_eq!(to_percent(0.5), 50.0);
        assert_eq!(to_percent(1.0), 100.0);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_value(ConfidenceLevel::VeryHigh).unwrap(), "Very High");
        assert_eq!(serde_json::to_value(ConfidenceLevel::Low).unwrap(), "Low");
        assert_eq!(serde_json::to_value(Label::Fake).unwrap(), "fake");
        assert_eq!(Label::Real.to_string(), "real");
        assert_eq!(ConfidenceLevel::Medium.to_string(), "Medium");
    }
}
