// Confidence rules that turn per-label scores into a final label.
//
// Order of checks:
//   1. no words, or every word unseen          -> not recognized
//   2. sepitori confidence >= threshold         -> sepitori
//   3. non-sepitori confidence >= threshold     -> non-sepitori
//   4. anything else                            -> mixed
// A label picked in 2 or 3 is downgraded to mixed when the input has more
// than one word and too large a share of them is unseen.

use serde::{Deserialize, Serialize};

pub const SEPITORI: &str = "sepitori";
pub const NON_SEPITORI: &str = "non-sepitori";

/// The label returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalLabel {
    #[serde(rename = "sepitori")]
    Sepitori,
    #[serde(rename = "non-sepitori")]
    NonSepitori,
    #[serde(rename = "mixed")]
    Mixed,
    #[serde(rename = "not recognized")]
    NotRecognized,
}

impl FinalLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalLabel::Sepitori => SEPITORI,
            FinalLabel::NonSepitori => NON_SEPITORI,
            FinalLabel::Mixed => "mixed",
            FinalLabel::NotRecognized => "not recognized",
        }
    }
}

impl std::fmt::Display for FinalLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunable thresholds for [`LabelPolicy::decide`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPolicy {
    /// Minimum normalized confidence for a definite label
    pub confidence_threshold: f64,
    /// Unseen-word share above which a definite label becomes mixed.
    /// None disables the downgrade.
    pub max_unseen_ratio: Option<f64>,
}

impl Default for LabelPolicy {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.65,
            max_unseen_ratio: Some(0.5),
        }
    }
}

/// Everything the policy needs to know about one query.
#[derive(Debug, Clone, Copy)]
pub struct Evidence {
    pub word_count: usize,
    pub unseen_count: usize,
    /// Normalized confidence of `sepitori`; None when the model has no such class
    pub sepitori_confidence: Option<f64>,
    /// Normalized confidence of `non-sepitori`; None when the model has no such class
    pub non_confidence: Option<f64>,
}

impl LabelPolicy {
    pub fn decide(&self, evidence: &Evidence) -> FinalLabel {
        if evidence.word_count == 0 || evidence.unseen_count >= evidence.word_count {
            return FinalLabel::NotRecognized;
        }

        let confident = |c: Option<f64>| c.is_some_and(|c| c >= self.confidence_threshold);

        let label = if confident(evidence.sepitori_confidence) {
            FinalLabel::Sepitori
        } else if confident(evidence.non_confidence) {
            FinalLabel::NonSepitori
        } else {
            return FinalLabel::Mixed;
        };

        if self.too_many_unseen(evidence) {
            FinalLabel::Mixed
        } else {
            label
        }
    }

    fn too_many_unseen(&self, evidence: &Evidence) -> bool {
        match self.max_unseen_ratio {
            Some(limit) if evidence.word_count > 1 => {
                evidence.unseen_count as f64 / evidence.word_count as f64 > limit
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evidence(words: usize, unseen: usize, sep: f64) -> Evidence {
        Evidence {
            word_count: words,
            unseen_count: unseen,
            sepitori_confidence: Some(sep),
            non_confidence: Some(1.0 - sep),
        }
    }

    #[test]
    fn test_all_unseen_is_not_recognized() {
        let policy = LabelPolicy::default();
        assert_eq!(policy.decide(&evidence(3, 3, 0.9)), FinalLabel::NotRecognized);
        assert_eq!(policy.decide(&evidence(0, 0, 0.9)), FinalLabel::NotRecognized);
    }

    #[test]
    fn test_threshold_boundaries() {
        let policy = LabelPolicy::default();
        assert_eq!(policy.decide(&evidence(2, 0, 0.65)), FinalLabel::Sepitori);
        assert_eq!(policy.decide(&evidence(2, 0, 0.3)), FinalLabel::NonSepitori);
        assert_eq!(policy.decide(&evidence(2, 0, 0.5)), FinalLabel::Mixed);
    }

    #[test]
    fn test_unseen_ratio_downgrades_to_mixed() {
        let policy = LabelPolicy::default();
        // 2 of 3 unseen -> 0.67 > 0.5
        assert_eq!(policy.decide(&evidence(3, 2, 0.9)), FinalLabel::Mixed);
        // exactly half is not over the limit
        assert_eq!(policy.decide(&evidence(4, 2, 0.9)), FinalLabel::Sepitori);
    }

    #[test]
    fn test_downgrade_can_be_disabled() {
        let policy = LabelPolicy {
            max_unseen_ratio: None,
            ..LabelPolicy::default()
        };
        assert_eq!(policy.decide(&evidence(3, 2, 0.1)), FinalLabel::NonSepitori);
    }

    #[test]
    fn test_missing_class_never_wins() {
        let policy = LabelPolicy::default();
        let only_non = Evidence {
            word_count: 1,
            unseen_count: 0,
            sepitori_confidence: None,
            non_confidence: Some(1.0),
        };
        assert_eq!(policy.decide(&only_non), FinalLabel::NonSepitori);

        let neither = Evidence {
            sepitori_confidence: None,
            non_confidence: None,
            ..only_non
        };
        assert_eq!(policy.decide(&neither), FinalLabel::Mixed);
    }

    #[test]
    fn test_serializes_as_wire_names() {
        let json = serde_json::to_string(&FinalLabel::NotRecognized).unwrap();
        assert_eq!(json, "\"not recognized\"");
        assert_eq!(FinalLabel::NonSepitori.to_string(), "non-sepitori");
    }
}
