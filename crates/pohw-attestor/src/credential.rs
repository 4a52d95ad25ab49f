//! Credential issuance, validity, and monotonic revocation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pohw_core::{
    AssuranceLevel, AttestorKind, AuditAction, ContentHash, Did, ReviewMethod, RevocationRecord,
    VerifiableCredential,
};
use pohw_crypto::hash_canonical;
use pohw_store::StoreError;

use crate::error::AttestorError;
use crate::framework::AttestorFramework;

/// The fields covered by a credential's content hash. Issuance time is
/// deliberately excluded so re-issuing the same attestation collides
/// instead of minting a duplicate.
#[derive(Serialize)]
struct CredentialBody<'a> {
    attestor_did: &'a Did,
    subject_did: &'a Did,
    verification_method: ReviewMethod,
    assurance_level: AssuranceLevel,
    policy: &'a Option<String>,
    expiration_date: &'a Option<DateTime<Utc>>,
}

impl AttestorFramework {
    /// Issue a credential from `attestor_did` to `subject_did`.
    ///
    /// Only an active attestor may issue. The credential is keyed by the
    /// SHA-256 of its canonical body; issuing the same body twice is a
    /// conflict.
    pub fn issue_credential(
        &self,
        attestor_did: &Did,
        subject_did: &Did,
        verification_method: ReviewMethod,
        assurance_level: AssuranceLevel,
        policy: Option<String>,
        expiration_date: Option<DateTime<Utc>>,
    ) -> Result<VerifiableCredential, AttestorError> {
        let attestor = self.get_attestor(attestor_did)?;
        if !attestor.status.can_issue() {
            return Err(AttestorError::NotAuthorized(format!(
                "attestor {} is {}, only active attestors may issue",
                attestor_did, attestor.status
            )));
        }
        if let Some(exp) = expiration_date {
            if exp <= Utc::now() {
                return Err(AttestorError::Validation(
                    "expiration date is in the past".into(),
                ));
            }
        }

        let body = CredentialBody {
            attestor_did,
            subject_did,
            verification_method,
            assurance_level,
            policy: &policy,
            expiration_date: &expiration_date,
        };
        let credential_hash = ContentHash::new(hex::encode(hash_canonical(&body)?))
            .map_err(|e| AttestorError::Validation(e.to_string()))?;

        let credential = VerifiableCredential {
            attestor_did: attestor_did.clone(),
            subject_did: subject_did.clone(),
            verification_method,
            assurance_level,
            policy,
            expiration_date,
            credential_hash: credential_hash.clone(),
            issued_at: Utc::now(),
        };
        match self.store.store_credential(&credential) {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => {
                return Err(AttestorError::DuplicateCredential(credential_hash))
            }
            Err(e) => return Err(e.into()),
        }
        self.record_audit(
            AuditAction::CredentialIssued,
            Some(attestor_did),
            Some(&credential_hash),
            serde_json::json!({
                "subject_did": subject_did.uri(),
                "verification_method": verification_method,
                "assurance_level": assurance_level,
            }),
        )?;
        tracing::info!(
            attestor = %attestor_did,
            subject = %subject_did,
            hash = %credential_hash,
            "credential issued"
        );
        Ok(credential)
    }

    /// Revoke a credential. Monotonic: a second revocation is an error and
    /// the original record stands.
    ///
    /// The revoker must be the issuing attestor, or an active
    /// foundation-kind attestor acting as override.
    pub fn revoke_credential(
        &self,
        credential_hash: &ContentHash,
        revoker_did: &Did,
        reason: &str,
    ) -> Result<RevocationRecord, AttestorError> {
        let credential = self
            .store
            .get_credential(credential_hash)?
            .ok_or_else(|| AttestorError::CredentialNotFound(credential_hash.clone()))?;

        if revoker_did != &credential.attestor_did {
            let revoker = self.get_attestor(revoker_did)?;
            let is_override =
                revoker.kind == AttestorKind::Foundation && revoker.status.can_issue();
            if !is_override {
                return Err(AttestorError::NotAuthorized(format!(
                    "{} is neither the issuer nor an active foundation attestor",
                    revoker_did
                )));
            }
        }

        let revocation = RevocationRecord {
            credential_hash: credential_hash.clone(),
            attestor_did: revoker_did.clone(),
            reason: reason.to_string(),
            revoked_at: Utc::now(),
            metadata: None,
        };
        match self.store.store_revocation(&revocation) {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => {
                return Err(AttestorError::AlreadyRevoked(credential_hash.clone()))
            }
            Err(e) => return Err(e.into()),
        }
        self.record_audit(
            AuditAction::CredentialRevoked,
            Some(revoker_did),
            Some(credential_hash),
            serde_json::json!({ "reason": reason, "issuer": credential.attestor_did.uri() }),
        )?;
        tracing::warn!(hash = %credential_hash, revoker = %revoker_did, reason, "credential revoked");
        Ok(revocation)
    }

    /// Look up a credential by its content hash.
    pub fn get_credential(
        &self,
        credential_hash: &ContentHash,
    ) -> Result<Option<VerifiableCredential>, AttestorError> {
        Ok(self.store.get_credential(credential_hash)?)
    }

    /// Whether a credential currently validates.
    ///
    /// A credential is valid iff it exists, is unexpired, has no revocation
    /// record, and its issuer is active. Suspending or revoking an attestor
    /// therefore invalidates all its outstanding credentials at once.
    pub fn is_credential_valid(
        &self,
        credential_hash: &ContentHash,
    ) -> Result<bool, AttestorError> {
        let Some(credential) = self.store.get_credential(credential_hash)? else {
            return Ok(false);
        };
        if credential.is_expired(Utc::now()) {
            return Ok(false);
        }
        if self.store.get_revocation(credential_hash)?.is_some() {
            return Ok(false);
        }
        let issuer_active = self
            .store
            .get_attestor(&credential.attestor_did)?
            .map(|a| a.status.can_issue())
            .unwrap_or(false);
        Ok(issuer_active)
    }
}
