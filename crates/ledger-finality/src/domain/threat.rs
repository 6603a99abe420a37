//! Threat-factor adapter: maps live security-alert volume onto the quorum
//! scaling factor.
//!
//! The factor lives in the closed interval `[0.51, 0.90]`. The lower bound
//! keeps every quorum a strict majority even in quiet periods; the upper
//! bound keeps finality reachable when the alert feed is saturated.

use serde::{Deserialize, Serialize};

/// Smallest quorum factor (quiet threat picture).
pub const FACTOR_MIN: f64 = 0.51;

/// Span added on top of [`FACTOR_MIN`] as the raw score goes to 1.
pub const FACTOR_SPAN: f64 = 0.39;

/// Largest quorum factor (saturated threat picture).
pub const FACTOR_MAX: f64 = FACTOR_MIN + FACTOR_SPAN;

/// Alert counts observed within the provider's rolling window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertCounts {
    /// Unacknowledged critical-severity alerts.
    pub critical_alerts: u32,
    /// Unacknowledged high-severity alerts.
    pub high_alerts: u32,
    /// Attack events that were detected but not blocked.
    pub unblocked_attacks: u32,
}

/// Weights applied to the alert counts when computing the raw score.
///
/// One consistent weight set is used everywhere: high-severity alerts weigh
/// 0.12, the same as unblocked attacks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThreatWeights {
    /// Weight per unacknowledged critical alert.
    pub critical_alert: f64,
    /// Weight per unacknowledged high-severity alert.
    pub high_alert: f64,
    /// Weight per unblocked attack event.
    pub unblocked_attack: f64,
}

impl Default for ThreatWeights {
    fn default() -> Self {
        Self {
            critical_alert: 0.15,
            high_alert: 0.12,
            unblocked_attack: 0.12,
        }
    }
}

/// Coarse classification of the current factor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreatClass {
    /// Factor below 0.60.
    Normal,
    /// Factor in [0.60, 0.70).
    Elevated,
    /// Factor in [0.70, 0.80).
    High,
    /// Factor at or above 0.80.
    Critical,
}

/// A point-in-time threat assessment.
///
/// Recomputed on demand from the live counts; never cached by the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThreatLevel {
    /// Quorum scaling factor in [0.51, 0.90].
    pub factor: f64,
    /// Coarse classification of the factor.
    pub class: ThreatClass,
    /// Raw weighted score in [0, 1] before interval mapping.
    pub raw_score: f64,
    /// The counts that produced this assessment.
    pub counts: AlertCounts,
}

impl ThreatLevel {
    /// Computes the assessment from alert counts.
    pub fn from_counts(counts: AlertCounts, weights: &ThreatWeights) -> Self {
        let raw_score = (counts.critical_alerts as f64 * weights.critical_alert
            + counts.high_alerts as f64 * weights.high_alert
            + counts.unblocked_attacks as f64 * weights.unblocked_attack)
            .clamp(0.0, 1.0);
        let factor = FACTOR_MIN + raw_score * FACTOR_SPAN;

        Self {
            factor,
            class: Self::classify(factor),
            raw_score,
            counts,
        }
    }

    /// The conservative floor returned when the signal source is
    /// unreachable: availability of consensus outranks freshness of the
    /// threat picture.
    pub fn minimum() -> Self {
        Self {
            factor: FACTOR_MIN,
            class: ThreatClass::Normal,
            raw_score: 0.0,
            counts: AlertCounts::default(),
        }
    }

    /// Quorum size required of `validator_count` validators at this level.
    ///
    /// `ceil(validator_count * factor)`, monotone in the factor. The small
    /// epsilon absorbs f64 noise in the product so an exact integer result
    /// (e.g. 10 × 0.90) does not round up to the next threshold.
    pub fn quorum_required(&self, validator_count: usize) -> usize {
        let exact = validator_count as f64 * self.factor;
        (exact - 1e-9).ceil().max(0.0) as usize
    }

    fn classify(factor: f64) -> ThreatClass {
        if factor < 0.60 {
            ThreatClass::Normal
        } else if factor < 0.70 {
            ThreatClass::Elevated
        } else if factor < 0.80 {
            ThreatClass::High
        } else {
            ThreatClass::Critical
        }
    }
}
