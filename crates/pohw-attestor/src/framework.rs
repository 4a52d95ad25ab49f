//! The attestor framework and the attestor lifecycle state machine.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use pohw_core::{
    AttestorKind, AttestorRecord, AttestorStatus, AuditAction, Did, PolicyConfig,
};
use pohw_store::{AttestorStore, AuditStore, CredentialStore};

use crate::error::AttestorError;

/// Persistence surface the attestor framework needs.
pub trait AttestorBackend: AttestorStore + CredentialStore + AuditStore {}

impl<T: AttestorStore + CredentialStore + AuditStore> AttestorBackend for T {}

/// Accredits attestors, issues and revokes credentials, and evaluates
/// multi-attestor policies over an injected store.
pub struct AttestorFramework {
    pub(crate) store: Arc<dyn AttestorBackend>,
    pub(crate) policies: PolicyConfig,
}

/// Valid lifecycle transitions:
/// - `pending → active` (approval)
/// - `active → active` (approval is idempotent)
/// - `suspended → active` (explicit re-approval)
/// - `active → suspended`
/// - `pending | active | suspended → revoked` (terminal)
fn transition(
    current: AttestorStatus,
    target: AttestorStatus,
) -> Result<AttestorStatus, AttestorError> {
    use AttestorStatus::*;
    let next = match (current, target) {
        (Pending, Active) | (Active, Active) | (Suspended, Active) => Active,
        (Active, Suspended) => Suspended,
        (Pending, Revoked) | (Active, Revoked) | (Suspended, Revoked) => Revoked,
        (from, to) => return Err(AttestorError::InvalidTransition { from, to }),
    };
    tracing::debug!(from = %current, to = %next, "attestor state transition");
    Ok(next)
}

impl AttestorFramework {
    /// Create a framework over the given store and policy table.
    pub fn new(store: Arc<dyn AttestorBackend>, policies: PolicyConfig) -> Self {
        Self { store, policies }
    }

    /// Register a new attestor. Starts `pending`.
    pub fn register_attestor(
        &self,
        did: Did,
        name: String,
        kind: AttestorKind,
        public_key_hex: String,
        public_key_url: Option<String>,
        metadata: Option<serde_json::Value>,
    ) -> Result<AttestorRecord, AttestorError> {
        if name.trim().is_empty() {
            return Err(AttestorError::Validation("attestor name is required".into()));
        }
        if self.store.get_attestor(&did)?.is_some() {
            return Err(AttestorError::DuplicateAttestor(did));
        }

        let now = Utc::now();
        let record = AttestorRecord {
            did: did.clone(),
            name: name.clone(),
            kind,
            public_key_hex,
            public_key_url,
            metadata,
            status: AttestorStatus::Pending,
            next_audit_due: None,
            registered_at: now,
            updated_at: now,
        };
        self.store.store_attestor(&record)?;
        self.record_audit(
            AuditAction::AttestorRegistered,
            Some(&did),
            None,
            serde_json::json!({ "name": name, "kind": kind }),
        )?;
        tracing::info!(did = %did, kind = %kind, "attestor registered");
        Ok(record)
    }

    /// Approve an attestor, transitioning it to `active`.
    ///
    /// Idempotent on an already-active attestor; also the explicit
    /// re-approval path for a suspended one.
    pub fn approve_attestor(
        &self,
        did: &Did,
        next_audit_due: Option<DateTime<Utc>>,
    ) -> Result<AttestorRecord, AttestorError> {
        let mut record = self.get_attestor(did)?;
        if record.status == AttestorStatus::Active && next_audit_due.is_none() {
            return Ok(record);
        }
        record.status = transition(record.status, AttestorStatus::Active)?;
        if next_audit_due.is_some() {
            record.next_audit_due = next_audit_due;
        }
        record.updated_at = Utc::now();
        self.store.update_attestor(&record)?;
        self.record_audit(
            AuditAction::AttestorApproved,
            Some(did),
            None,
            serde_json::json!({ "next_audit_due": record.next_audit_due }),
        )?;
        Ok(record)
    }

    /// Suspend an active attestor. All of its outstanding credentials stop
    /// validating while suspended.
    pub fn suspend_attestor(
        &self,
        did: &Did,
        reason: &str,
    ) -> Result<AttestorRecord, AttestorError> {
        let mut record = self.get_attestor(did)?;
        record.status = transition(record.status, AttestorStatus::Suspended)?;
        record.updated_at = Utc::now();
        self.store.update_attestor(&record)?;
        self.record_audit(
            AuditAction::AttestorSuspended,
            Some(did),
            None,
            serde_json::json!({ "reason": reason }),
        )?;
        tracing::warn!(did = %did, reason, "attestor suspended");
        Ok(record)
    }

    /// Revoke an attestor. Terminal: no path back.
    pub fn revoke_attestor(
        &self,
        did: &Did,
        reason: &str,
    ) -> Result<AttestorRecord, AttestorError> {
        let mut record = self.get_attestor(did)?;
        record.status = transition(record.status, AttestorStatus::Revoked)?;
        record.updated_at = Utc::now();
        self.store.update_attestor(&record)?;
        self.record_audit(
            AuditAction::AttestorRevoked,
            Some(did),
            None,
            serde_json::json!({ "reason": reason }),
        )?;
        tracing::warn!(did = %did, reason, "attestor revoked");
        Ok(record)
    }

    /// Look up an attestor record.
    pub fn get_attestor(&self, did: &Did) -> Result<AttestorRecord, AttestorError> {
        self.store
            .get_attestor(did)?
            .ok_or_else(|| AttestorError::AttestorNotFound(did.clone()))
    }
}
