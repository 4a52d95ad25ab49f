//! The attestor-framework audit trail.

use chrono::Utc;

use pohw_core::{AuditAction, AuditLogEntry, ContentHash, Did};

use crate::error::AttestorError;
use crate::framework::AttestorFramework;

impl AttestorFramework {
    /// Append an audit entry for a state transition.
    pub(crate) fn record_audit(
        &self,
        action: AuditAction,
        attestor_did: Option<&Did>,
        credential_hash: Option<&ContentHash>,
        details: serde_json::Value,
    ) -> Result<(), AttestorError> {
        self.store.append_audit(&AuditLogEntry {
            timestamp: Utc::now(),
            action,
            attestor_did: attestor_did.cloned(),
            credential_hash: credential_hash.cloned(),
            details,
        })?;
        Ok(())
    }

    /// Query the audit log, optionally filtered by attestor, newest last.
    pub fn audit_logs(
        &self,
        attestor_did: Option<&Did>,
        limit: Option<usize>,
    ) -> Result<Vec<AuditLogEntry>, AttestorError> {
        Ok(self.store.audit_entries(attestor_did, limit)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::tests::{did, framework, register};
    use pohw_core::{AssuranceLevel, ReviewMethod};

    #[test]
    fn test_lifecycle_leaves_a_trail() {
        let fw = framework();
        register(&fw, 1);
        fw.approve_attestor(&did(1), None).unwrap();
        fw.suspend_attestor(&did(1), "audit overdue").unwrap();

        let entries = fw.audit_logs(Some(&did(1)), None).unwrap();
        let actions: Vec<AuditAction> = entries.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![
                AuditAction::AttestorRegistered,
                AuditAction::AttestorApproved,
                AuditAction::AttestorSuspended,
            ]
        );
        assert_eq!(
            entries[2].details,
            serde_json::json!({ "reason": "audit overdue" })
        );
    }

    #[test]
    fn test_credential_actions_recorded() {
        let fw = framework();
        register(&fw, 1);
        fw.approve_attestor(&did(1), None).unwrap();
        let vc = fw
            .issue_credential(
                &did(1),
                &did(7),
                ReviewMethod::DocumentReview,
                AssuranceLevel::Standard,
                None,
                None,
            )
            .unwrap();
        fw.revoke_credential(&vc.credential_hash, &did(1), "compromised")
            .unwrap();

        let entries = fw.audit_logs(None, None).unwrap();
        let last = entries.last().unwrap();
        assert_eq!(last.action, AuditAction::CredentialRevoked);
        assert_eq!(last.credential_hash.as_ref(), Some(&vc.credential_hash));
    }

    #[test]
    fn test_limit_keeps_newest() {
        let fw = framework();
        register(&fw, 1);
        register(&fw, 2);
        fw.approve_attestor(&did(2), None).unwrap();

        let entries = fw.audit_logs(None, Some(1)).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::AttestorApproved);
    }
}
