use serde::{Deserialize, Serialize};

use crate::config::ThresholdPair;
use crate::content_safety::types::AnalysisResult;

pub(crate) const TEXT_REJECT_WARNING: &str = "High toxicity/threat level detected";
pub(crate) const TEXT_REVIEW_WARNING: &str = "Moderate risk content detected";
pub(crate) const IMAGE_REJECT_WARNING: &str = "Suspicious image properties detected";
pub(crate) const IMAGE_REVIEW_WARNING: &str = "Image requires manual review";
pub(crate) const DECODE_FAILURE_WARNING: &str = "Could not analyze image";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Safe,
    Review,
    Risky,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct SafetyPolicy {
    thresholds: ThresholdPair,
    review_warning: &'static str,
    reject_warning: &'static str,
}

impl SafetyPolicy {
    pub(crate) const fn text(thresholds: ThresholdPair) -> Self {
        SafetyPolicy {
            thresholds,
            review_warning: TEXT_REVIEW_WARNING,
            reject_warning: TEXT_REJECT_WARNING,
        }
    }

    pub(crate) const fn image(thresholds: ThresholdPair) -> Self {
        SafetyPolicy {
            thresholds,
            review_warning: IMAGE_REVIEW_WARNING,
            reject_warning: IMAGE_REJECT_WARNING,
        }
    }

    /// Both comparisons are strict: a score sitting exactly on a threshold
    /// stays in the lower band.
    pub(crate) fn level_for(&self, score: f64) -> RiskLevel {
        if score > self.thresholds.reject {
            RiskLevel::Risky
        } else if score > self.thresholds.warn {
            RiskLevel::Review
        } else {
            RiskLevel::Safe
        }
    }

    /// Turns a score into a result. `leading` warnings come first, followed
    /// by the policy warning for the score band if any.
    pub(crate) fn decide(&self, score: f64, leading: Vec<String>) -> AnalysisResult {
        let risk_score = score.clamp(0.0, 1.0);
        let mut warnings = leading;
        let level = self.level_for(risk_score);
        match level {
            RiskLevel::Risky => warnings.push(self.reject_warning.to_string()),
            RiskLevel::Review => warnings.push(self.review_warning.to_string()),
            RiskLevel::Safe => {}
        }
        AnalysisResult {
            risk_score,
            safe: level != RiskLevel::Risky,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_on_thresholds_fall_into_lower_band() {
        let policy = SafetyPolicy::image(ThresholdPair::new(0.3, 0.6));
        assert_eq!(policy.level_for(0.3), RiskLevel::Safe);
        assert_eq!(policy.level_for(0.6), RiskLevel::Review);
        assert_eq!(policy.level_for(0.61), RiskLevel::Risky);
    }

    #[test]
    fn leading_warnings_precede_policy_warning() {
        let policy = SafetyPolicy::text(ThresholdPair::new(0.4, 0.7));
        let result = policy.decide(0.9, vec!["first".into()]);
        assert!(!result.safe);
        assert_eq!(result.warnings, vec!["first", TEXT_REJECT_WARNING]);
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let policy = SafetyPolicy::text(ThresholdPair::new(0.4, 0.7));
        assert_eq!(policy.decide(3.0, Vec::new()).risk_score, 1.0);
        assert_eq!(policy.decide(-1.0, Vec::new()).risk_score, 0.0);
    }
}
