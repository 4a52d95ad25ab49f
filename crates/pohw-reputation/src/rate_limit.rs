//! Per-DID submission windows and rate decisions.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use pohw_core::FraudConfig;

/// Outcome of a rate-limit check. A structured result, not an error:
/// callers branch on `allowed` as part of normal control flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateDecision {
    pub allowed: bool,
    pub reason: Option<String>,
    /// Submissions inside the trailing window, counting this one.
    pub current_rate: u32,
    /// Absolute deviation from the DID's historical entropy average, when
    /// enough history exists to compute it.
    pub entropy_discrepancy: Option<f64>,
}

impl RateDecision {
    fn allowed(current_rate: u32, entropy_discrepancy: Option<f64>) -> Self {
        Self {
            allowed: true,
            reason: None,
            current_rate,
            entropy_discrepancy,
        }
    }

    fn denied(reason: String, current_rate: u32, entropy_discrepancy: Option<f64>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            current_rate,
            entropy_discrepancy,
        }
    }
}

/// Sliding history of one DID's recent submissions.
#[derive(Debug, Clone, Default)]
pub struct SubmissionWindow {
    timestamps: Vec<DateTime<Utc>>,
    entropy_samples: Vec<f64>,
}

impl SubmissionWindow {
    /// Drop timestamps older than the trailing window.
    pub fn prune(&mut self, now: DateTime<Utc>, window_secs: u64) {
        let cutoff = now - Duration::seconds(window_secs as i64);
        self.timestamps.retain(|t| *t >= cutoff);
    }

    /// Record one submission.
    pub fn record(&mut self, timestamp: DateTime<Utc>, entropy: Option<f64>) {
        self.timestamps.push(timestamp);
        if let Some(entropy) = entropy {
            self.entropy_samples.push(entropy);
        }
    }

    fn in_window(&self, now: DateTime<Utc>, window_secs: u64) -> u32 {
        let cutoff = now - Duration::seconds(window_secs as i64);
        self.timestamps.iter().filter(|t| **t >= cutoff).count() as u32
    }

    fn average_entropy(&self) -> Option<f64> {
        if self.entropy_samples.is_empty() {
            return None;
        }
        Some(self.entropy_samples.iter().sum::<f64>() / self.entropy_samples.len() as f64)
    }

    /// Number of entropy samples recorded so far.
    pub fn entropy_history_len(&self) -> usize {
        self.entropy_samples.len()
    }

    /// Evaluate a candidate submission against this history.
    ///
    /// Both checks run independently; the entropy discrepancy is reported
    /// even when the raw rate is within limits, and only rejects once the
    /// DID has enough recorded samples to make the baseline meaningful.
    pub fn evaluate(
        &self,
        now: DateTime<Utc>,
        declared_entropy: Option<f64>,
        config: &FraudConfig,
    ) -> RateDecision {
        let current_rate = self.in_window(now, config.rate_window_secs) + 1;

        let discrepancy = match (declared_entropy, self.average_entropy()) {
            (Some(declared), Some(average)) => Some((declared - average).abs()),
            _ => None,
        };

        if current_rate > config.rate_ceiling {
            return RateDecision::denied(
                format!(
                    "rate {}/{}s exceeds ceiling {}",
                    current_rate, config.rate_window_secs, config.rate_ceiling
                ),
                current_rate,
                discrepancy,
            );
        }

        if let Some(discrepancy_value) = discrepancy {
            if self.entropy_history_len() >= config.min_entropy_history
                && discrepancy_value > config.entropy_deviation_threshold
            {
                return RateDecision::denied(
                    format!(
                        "entropy discrepancy {:.3} exceeds threshold {:.3}",
                        discrepancy_value, config.entropy_deviation_threshold
                    ),
                    current_rate,
                    discrepancy,
                );
            }
        }

        RateDecision::allowed(current_rate, discrepancy)
    }
}
