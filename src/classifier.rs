//! Pure classification of a moisture reading against field thresholds.

use crate::workflow::{Confidence, Decision, Verdict};

/// Maps a validated moisture reading plus field thresholds to a verdict.
pub struct Classifier;

impl Classifier {
    /// Decision rule, first match wins:
    ///
    /// 1. below `min` → IRRIGATE, high confidence
    /// 2. above `max` → DO_NOT_IRRIGATE, high confidence
    /// 3. within range but below `optimal` → IRRIGATE preventively, medium
    /// 4. otherwise (including exactly `optimal`) → DO_NOT_IRRIGATE, medium
    ///
    /// The ordering resolves pathological configurations: out-of-range checks
    /// always win. Callers guarantee `min < optimal < max` within `[0, 100]`;
    /// the directory validates profiles before they reach this function.
    ///
    /// Total over its domain: always returns IRRIGATE or DO_NOT_IRRIGATE,
    /// never MAINTENANCE_REQUIRED.
    pub fn classify(moisture: f64, min: f64, optimal: f64, max: f64) -> Verdict {
        if moisture < min {
            Verdict {
                decision: Decision::Irrigate,
                reason: format!("Moisture {moisture:.1}% below minimum threshold {min}%"),
                confidence: Confidence::High,
            }
        } else if moisture > max {
            Verdict {
                decision: Decision::DoNotIrrigate,
                reason: format!("Moisture {moisture:.1}% above maximum threshold {max}%"),
                confidence: Confidence::High,
            }
        } else if moisture < optimal {
            Verdict {
                decision: Decision::Irrigate,
                reason: format!(
                    "Moisture {moisture:.1}% below optimal {optimal}%, irrigating preventively"
                ),
                confidence: Confidence::Medium,
            }
        } else {
            Verdict {
                decision: Decision::DoNotIrrigate,
                reason: format!("Moisture {moisture:.1}% within optimal range, maintaining"),
                confidence: Confidence::Medium,
            }
        }
    }
}
