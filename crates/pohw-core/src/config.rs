//! Registry configuration.
//!
//! Every heuristic threshold in the fraud and reputation engines, every
//! batch trigger, and the multi-attestor policy table live here so they can
//! be tuned without code changes. All fields carry serde defaults so a
//! partial TOML file is valid.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::CoreError;
use crate::types::{AssuranceLevel, TrustTier};

/// Full configuration for a PoHW registry node.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegistryConfig {
    /// Batch sealing triggers.
    #[serde(default)]
    pub batch: BatchConfig,

    /// Fraud-mitigation thresholds.
    #[serde(default)]
    pub fraud: FraudConfig,

    /// Reputation scoring parameters.
    #[serde(default)]
    pub reputation: ReputationConfig,

    /// Multi-attestor policy table.
    #[serde(default)]
    pub policy: PolicyConfig,
}

impl RegistryConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, CoreError> {
        toml::from_str(text).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }
}

/// Triggers for sealing the pending queue into a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Seal when the pending queue reaches this many proofs.
    #[serde(default = "default_batch_threshold")]
    pub threshold: usize,
    /// Seal when this many seconds elapsed since the last seal and the
    /// queue is non-empty.
    #[serde(default = "default_batch_interval_secs")]
    pub interval_secs: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            threshold: default_batch_threshold(),
            interval_secs: default_batch_interval_secs(),
        }
    }
}

/// Fraud-mitigation thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudConfig {
    /// Maximum submissions per DID within the trailing window.
    #[serde(default = "default_rate_ceiling")]
    pub rate_ceiling: u32,
    /// Length of the trailing rate window, in seconds.
    #[serde(default = "default_rate_window_secs")]
    pub rate_window_secs: u64,
    /// Maximum allowed absolute deviation between a submission's declared
    /// entropy and the DID's historical average.
    #[serde(default = "default_entropy_deviation")]
    pub entropy_deviation_threshold: f64,
    /// Entropy samples required before the discrepancy check applies.
    #[serde(default = "default_min_entropy_history")]
    pub min_entropy_history: usize,
}

impl Default for FraudConfig {
    fn default() -> Self {
        Self {
            rate_ceiling: default_rate_ceiling(),
            rate_window_secs: default_rate_window_secs(),
            entropy_deviation_threshold: default_entropy_deviation(),
            min_entropy_history: default_min_entropy_history(),
        }
    }
}

/// Reputation scoring parameters. Score space is [0, 100].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationConfig {
    /// Score assigned to a DID's first record.
    #[serde(default = "default_initial_score")]
    pub initial_score: f64,
    /// Score increase for a clean submission.
    #[serde(default = "default_clean_reward")]
    pub clean_reward: f64,
    /// Score decrease for an anomalous submission.
    #[serde(default = "default_anomaly_penalty")]
    pub anomaly_penalty: f64,
    /// Minimum score for the green tier.
    #[serde(default = "default_green_floor")]
    pub green_floor: f64,
    /// Minimum score for the blue tier.
    #[serde(default = "default_blue_floor")]
    pub blue_floor: f64,
    /// Minimum score for the purple tier. Below this is grey.
    #[serde(default = "default_purple_floor")]
    pub purple_floor: f64,
}

impl ReputationConfig {
    /// Derive a tier from a score via the fixed, non-overlapping thresholds.
    pub fn tier_for_score(&self, score: f64) -> TrustTier {
        if score >= self.green_floor {
            TrustTier::Green
        } else if score >= self.blue_floor {
            TrustTier::Blue
        } else if score >= self.purple_floor {
            TrustTier::Purple
        } else {
            TrustTier::Grey
        }
    }
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            initial_score: default_initial_score(),
            clean_reward: default_clean_reward(),
            anomaly_penalty: default_anomaly_penalty(),
            green_floor: default_green_floor(),
            blue_floor: default_blue_floor(),
            purple_floor: default_purple_floor(),
        }
    }
}

/// One named multi-attestor policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRule {
    /// Minimum number of distinct attestors with valid credentials.
    pub min_distinct_attestors: usize,
    /// Minimum assurance level counted toward the policy, if any.
    #[serde(default)]
    pub min_assurance: Option<AssuranceLevel>,
}

/// Named policy table for multi-attestor verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default = "default_policies")]
    pub policies: HashMap<String, PolicyRule>,
}

impl PolicyConfig {
    /// Look up a policy rule by name.
    pub fn rule(&self, name: &str) -> Option<&PolicyRule> {
        self.policies.get(name)
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            policies: default_policies(),
        }
    }
}

fn default_batch_threshold() -> usize {
    100
}
fn default_batch_interval_secs() -> u64 {
    600
}
fn default_rate_ceiling() -> u32 {
    60
}
fn default_rate_window_secs() -> u64 {
    60
}
fn default_entropy_deviation() -> f64 {
    0.3
}
fn default_min_entropy_history() -> usize {
    5
}
fn default_initial_score() -> f64 {
    50.0
}
fn default_clean_reward() -> f64 {
    0.5
}
fn default_anomaly_penalty() -> f64 {
    5.0
}
fn default_green_floor() -> f64 {
    80.0
}
fn default_blue_floor() -> f64 {
    60.0
}
fn default_purple_floor() -> f64 {
    40.0
}

fn default_policies() -> HashMap<String, PolicyRule> {
    let mut policies = HashMap::new();
    policies.insert(
        "green".to_string(),
        PolicyRule {
            min_distinct_attestors: 2,
            min_assurance: None,
        },
    );
    policies.insert(
        "blue".to_string(),
        PolicyRule {
            min_distinct_attestors: 1,
            min_assurance: None,
        },
    );
    policies
}
