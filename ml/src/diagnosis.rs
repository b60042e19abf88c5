use crate::error::PipelineError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{fmt, ops::Range};

/// Fixed decision boundary on the sigmoid score. Strictly greater means cancer.
pub const DECISION_THRESHOLD: f32 = 0.5;

/// Range the placeholder future-risk value is drawn from (upper bound excluded).
pub const FUTURE_RISK_RANGE: Range<u8> = 10..90;

/// Categorical outcome of the binary classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosisLabel {
    CancerDetected,
    NoCancerDetected,
}

impl DiagnosisLabel {
    /// Applies the fixed `> 0.5` rule; exactly 0.5 is `NoCancerDetected`.
    pub fn from_score(score: f32) -> Self {
        if score > DECISION_THRESHOLD {
            DiagnosisLabel::CancerDetected
        } else {
            DiagnosisLabel::NoCancerDetected
        }
    }
}

impl fmt::Display for DiagnosisLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosisLabel::CancerDetected => write!(f, "Cancer Detected"),
            DiagnosisLabel::NoCancerDetected => write!(f, "No Cancer Detected"),
        }
    }
}

/// Result of one pass through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub label: DiagnosisLabel,
    /// Raw sigmoid output of the classifier.
    pub score: f32,
    /// Distance of the score from the boundary as a percentage, always in `[50, 100]`.
    /// Not a calibrated probability.
    pub confidence_pct: f32,
    /// Only set for `NoCancerDetected`. This is a random placeholder from
    /// [`RiskSource`], NOT a model output, and must be presented as such.
    pub future_risk_pct: Option<u8>,
}

impl Diagnosis {
    /// Maps a classifier score to a diagnosis.
    pub fn from_score(score: f32, risk: &dyn RiskSource) -> Result<Self, PipelineError> {
        if !(0.0..=1.0).contains(&score) {
            return Err(PipelineError::ScoreOutOfRange(score));
        }

        let label = DiagnosisLabel::from_score(score);
        let (confidence_pct, future_risk_pct) = match label {
            DiagnosisLabel::CancerDetected => (score * 100.0, None),
            DiagnosisLabel::NoCancerDetected => {
                ((1.0 - score) * 100.0, Some(risk.placeholder_risk_pct()))
            }
        };

        Ok(Self {
            label,
            score,
            confidence_pct,
            future_risk_pct,
        })
    }

    pub fn is_cancer(&self) -> bool {
        self.label == DiagnosisLabel::CancerDetected
    }
}

/// Source of the non-predictive future-risk percentage shown on the healthy branch.
pub trait RiskSource: Send + Sync {
    fn placeholder_risk_pct(&self) -> u8;
}

/// Uniform draw from [`FUTURE_RISK_RANGE`] using the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomRisk;

impl RiskSource for RandomRisk {
    fn placeholder_risk_pct(&self) -> u8 {
        rand::thread_rng().gen_range(FUTURE_RISK_RANGE)
    }
}

/// Always returns the wrapped value; for deterministic runs.
#[derive(Debug, Clone, Copy)]
pub struct FixedRisk(pub u8);

impl RiskSource for FixedRisk {
    fn placeholder_risk_pct(&self) -> u8 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn exactly_half_is_no_cancer() {
        let diagnosis = Diagnosis::from_score(0.5, &FixedRisk(42)).unwrap();
        assert_eq!(diagnosis.label, DiagnosisLabel::NoCancerDetected);
        assert!(close(diagnosis.confidence_pct, 50.0));
        assert_eq!(diagnosis.future_risk_pct, Some(42));
    }

    #[test]
    fn high_score_is_cancer_with_score_confidence() {
        let diagnosis = Diagnosis::from_score(0.9, &FixedRisk(42)).unwrap();
        assert_eq!(diagnosis.label, DiagnosisLabel::CancerDetected);
        assert!(close(diagnosis.confidence_pct, 90.0));
        assert!(diagnosis.future_risk_pct.is_none());
        assert!(diagnosis.is_cancer());
    }

    #[test]
    fn low_score_is_healthy_with_inverted_confidence() {
        let diagnosis = Diagnosis::from_score(0.1, &FixedRisk(42)).unwrap();
        assert_eq!(diagnosis.label, DiagnosisLabel::NoCancerDetected);
        assert!(close(diagnosis.confidence_pct, 90.0));
        assert!(!diagnosis.is_cancer());
    }

    #[test]
    fn confidence_stays_between_fifty_and_hundred() {
        for step in 0..=1000 {
            let score = step as f32 / 1000.0;
            let diagnosis = Diagnosis::from_score(score, &FixedRisk(10)).unwrap();
            assert!(
                (50.0 - 1e-4..=100.0 + 1e-4).contains(&diagnosis.confidence_pct),
                "score {score} gave {}",
                diagnosis.confidence_pct
            );
        }
    }

    #[test]
    fn scores_outside_unit_interval_are_rejected() {
        for score in [-0.01, 1.01, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                Diagnosis::from_score(score, &RandomRisk),
                Err(PipelineError::ScoreOutOfRange(_))
            ));
        }
    }

    #[test]
    fn random_risk_stays_in_placeholder_range() {
        for _ in 0..500 {
            let pct = RandomRisk.placeholder_risk_pct();
            assert!(FUTURE_RISK_RANGE.contains(&pct));
        }
    }

    #[test]
    fn label_display_matches_screen_text() {
        assert_eq!(DiagnosisLabel::CancerDetected.to_string(), "Cancer Detected");
        assert_eq!(DiagnosisLabel::NoCancerDetected.to_string(), "No Cancer Detected");
    }
}
