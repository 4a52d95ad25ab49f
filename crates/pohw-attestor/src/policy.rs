//! Multi-attestor policy evaluation.
//!
//! Policies are named rows in the configured table; a failed evaluation is
//! a structured outcome, not an error, so callers can surface exactly why
//! the policy was not met.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use pohw_core::{ContentHash, Did};

use crate::error::AttestorError;
use crate::framework::AttestorFramework;

/// Result of evaluating a named policy over a set of credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyOutcome {
    pub valid: bool,
    /// Why the policy was not met. `None` when it was.
    pub reason: Option<String>,
    pub details: PolicyDetails,
}

/// Per-evaluation accounting behind a `PolicyOutcome`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyDetails {
    /// Distinct attestors the policy requires.
    pub required: usize,
    /// Distinct attestors counted toward the policy.
    pub distinct_attestors: usize,
    /// Credentials that passed every check.
    pub considered: Vec<ContentHash>,
    /// Credentials discarded, with the reason each one fell out.
    pub discarded: Vec<(ContentHash, String)>,
}

impl AttestorFramework {
    /// Evaluate the named policy for a subject over candidate credentials.
    ///
    /// A credential counts only if it resolves, names the subject, is
    /// currently valid, and meets the policy's assurance floor. Distinctness
    /// is by issuing attestor, so two credentials from one attestor count
    /// once.
    pub fn verify_multi_attestor_policy(
        &self,
        subject_did: &Did,
        policy_name: &str,
        credential_hashes: &[ContentHash],
    ) -> Result<PolicyOutcome, AttestorError> {
        let rule = self
            .policies
            .rule(policy_name)
            .ok_or_else(|| AttestorError::PolicyNotFound(policy_name.to_string()))?;

        let mut considered = Vec::new();
        let mut discarded = Vec::new();
        let mut attestors: HashSet<String> = HashSet::new();

        for hash in credential_hashes {
            let Some(credential) = self.store.get_credential(hash)? else {
                discarded.push((hash.clone(), "unknown credential".to_string()));
                continue;
            };
            if &credential.subject_did != subject_did {
                discarded.push((hash.clone(), "different subject".to_string()));
                continue;
            }
            if !self.is_credential_valid(hash)? {
                discarded.push((hash.clone(), "not currently valid".to_string()));
                continue;
            }
            if let Some(floor) = rule.min_assurance {
                if credential.assurance_level < floor {
                    discarded.push((
                        hash.clone(),
                        format!("assurance below required {:?}", floor),
                    ));
                    continue;
                }
            }
            attestors.insert(credential.attestor_did.uri().to_string());
            considered.push(hash.clone());
        }

        let distinct = attestors.len();
        let valid = distinct >= rule.min_distinct_attestors;
        let reason = if valid {
            None
        } else {
            Some(format!(
                "insufficient distinct attestors: {} < {}",
                distinct, rule.min_distinct_attestors
            ))
        };
        tracing::debug!(
            subject = %subject_did,
            policy = policy_name,
            valid,
            distinct_attestors = distinct,
            required = rule.min_distinct_attestors,
            "policy evaluated"
        );
        Ok(PolicyOutcome {
            valid,
            reason,
            details: PolicyDetails {
                required: rule.min_distinct_attestors,
                distinct_attestors: distinct,
                considered,
                discarded,
            },
        })
    }
}
