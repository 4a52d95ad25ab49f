//! The fraud engine: decisions, history, and reputation updates.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;

use pohw_core::{
    AnomalyEvent, AnomalyKind, ContentHash, Did, FraudConfig, ProcessDigest, ReputationConfig,
    ReputationRecord,
};
use pohw_store::ReputationStore;

use crate::error::ReputationError;
use crate::rate_limit::{RateDecision, SubmissionWindow};

/// Fraud-mitigation and reputation engine.
///
/// Sliding windows live in process, keyed per DID; reputation records and
/// the anomaly log are mirrored to the injected store. Updates for one DID
/// are serialized through that DID's window entry, so racing submissions
/// from the same identity never lose updates.
pub struct FraudEngine {
    store: Arc<dyn ReputationStore>,
    fraud: FraudConfig,
    reputation: ReputationConfig,
    windows: DashMap<String, SubmissionWindow>,
}

impl FraudEngine {
    /// Create an engine over the given store and thresholds.
    pub fn new(
        store: Arc<dyn ReputationStore>,
        fraud: FraudConfig,
        reputation: ReputationConfig,
    ) -> Self {
        Self {
            store,
            fraud,
            reputation,
            windows: DashMap::new(),
        }
    }

    /// Evaluate a candidate submission without recording it.
    ///
    /// Both the rate and entropy checks report their metrics; the decision
    /// is logged so false positives stay auditable.
    pub fn check_rate_limit(
        &self,
        did: &Did,
        timestamp: DateTime<Utc>,
        digest: Option<&ProcessDigest>,
    ) -> RateDecision {
        let declared_entropy = digest.map(|d| d.entropy);
        let decision = match self.windows.get(did.uri()) {
            Some(window) => window.evaluate(timestamp, declared_entropy, &self.fraud),
            None => SubmissionWindow::default().evaluate(timestamp, declared_entropy, &self.fraud),
        };
        tracing::debug!(
            did = %did,
            allowed = decision.allowed,
            current_rate = decision.current_rate,
            rate_ceiling = self.fraud.rate_ceiling,
            entropy_discrepancy = ?decision.entropy_discrepancy,
            reason = decision.reason.as_deref().unwrap_or(""),
            "rate-limit decision"
        );
        decision
    }

    /// Record a submission and fold its outcome into the DID's reputation.
    ///
    /// Denied submissions append an anomaly event and apply the configured
    /// penalty; allowed ones apply the (smaller) reward. The score moves
    /// monotonically per event class and is clamped to [0, 100] on every
    /// update.
    pub fn record_submission(
        &self,
        did: &Did,
        hash: &ContentHash,
        timestamp: DateTime<Utc>,
        digest: Option<&ProcessDigest>,
        decision: &RateDecision,
    ) -> Result<ReputationRecord, ReputationError> {
        // Hold the window entry for the whole update to serialize
        // same-DID submissions.
        let mut window = self.windows.entry(did.uri().to_string()).or_default();
        window.prune(timestamp, self.fraud.rate_window_secs);
        window.record(timestamp, digest.map(|d| d.entropy));

        let mut record = match self.store.get_reputation(did)? {
            Some(record) => record,
            None => ReputationRecord {
                did: did.clone(),
                score: self.reputation.initial_score,
                tier: self.reputation.tier_for_score(self.reputation.initial_score),
                successful_proofs: 0,
                anomalies: 0,
                updated_at: timestamp,
            },
        };

        if decision.allowed {
            record.score = (record.score + self.reputation.clean_reward).clamp(0.0, 100.0);
            record.successful_proofs += 1;
        } else {
            record.score = (record.score - self.reputation.anomaly_penalty).clamp(0.0, 100.0);
            record.anomalies += 1;

            let kind = match decision.reason.as_deref() {
                Some(reason) if reason.starts_with("entropy") => AnomalyKind::EntropyDiscrepancy,
                _ => AnomalyKind::RateExceeded,
            };
            self.store.append_anomaly(&AnomalyEvent {
                did: did.clone(),
                timestamp,
                kind,
                details: serde_json::json!({
                    "hash": hash.as_str(),
                    "current_rate": decision.current_rate,
                    "rate_ceiling": self.fraud.rate_ceiling,
                    "rate_window_secs": self.fraud.rate_window_secs,
                    "entropy_discrepancy": decision.entropy_discrepancy,
                    "entropy_threshold": self.fraud.entropy_deviation_threshold,
                    "reason": decision.reason,
                }),
            })?;
            tracing::warn!(did = %did, kind = %kind, "anomaly recorded");
        }

        record.tier = self.reputation.tier_for_score(record.score);
        record.updated_at = timestamp;
        self.store.store_reputation(&record)?;
        Ok(record)
    }

    /// Current reputation for a DID, if any history exists.
    pub fn get_reputation(&self, did: &Did) -> Result<Option<ReputationRecord>, ReputationError> {
        Ok(self.store.get_reputation(did)?)
    }

    /// Whether the DID has anomaly events within the trailing `hours`.
    pub fn has_recent_anomalies(&self, did: &Did, hours: i64) -> Result<bool, ReputationError> {
        let since = Utc::now() - Duration::hours(hours);
        Ok(!self.store.anomalies_since(did, since)?.is_empty())
    }
}
