//! Continuity claims: construction payloads and independent verification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pohw_core::{ContinuityClaim, Did, DidDocument, VerificationMethodEntry};
use pohw_crypto::{canonical_json, hash, verify, PublicKey, Signature};

use crate::error::IdentityError;

/// The canonical payload both keys sign during a rotation.
///
/// Serialized through canonical JSON, so an independent verifier rebuilds
/// the exact signed bytes from the claim and the successor DID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationPayload {
    pub previous_did: Did,
    pub parent_reference: String,
    pub last_anchor: Option<String>,
    pub new_did: Did,
    pub timestamp: DateTime<Utc>,
}

impl RotationPayload {
    /// Canonical signing bytes.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, IdentityError> {
        Ok(canonical_json(self)?)
    }
}

/// Result of a successful rotation.
#[derive(Debug, Clone)]
pub struct RotationOutcome {
    pub new_did: Did,
    pub document: DidDocument,
    pub claim: ContinuityClaim,
}

/// Hex SHA-256 over the canonical form of a verification-method entry.
pub fn parent_reference(entry: &VerificationMethodEntry) -> Result<String, IdentityError> {
    Ok(hex::encode(hash(&canonical_json(entry)?)))
}

fn failed(check: &str) -> IdentityError {
    IdentityError::ContinuityVerification {
        check: check.to_string(),
    }
}

/// Independently verify a continuity claim against the old and new public
/// keys and the successor DID.
///
/// Reconstructs the canonical payload, checks both key signatures over it,
/// and recomputes the succession digest. All three must match exactly; any
/// single mismatch invalidates the whole claim.
pub fn verify_claim(
    claim: &ContinuityClaim,
    old_public_key: &PublicKey,
    new_public_key: &PublicKey,
    new_did: &Did,
) -> Result<(), IdentityError> {
    let payload = RotationPayload {
        previous_did: claim.previous_did.clone(),
        parent_reference: claim.parent_reference.clone(),
        last_anchor: claim.last_anchor.clone(),
        new_did: new_did.clone(),
        timestamp: claim.registry_timestamp,
    };
    let bytes = payload.signing_bytes()?;

    let old_sig = Signature::from_hex(&claim.old_key_signature)
        .map_err(|_| failed("old-key signature encoding"))?;
    verify(&bytes, &old_sig, old_public_key).map_err(|_| failed("old-key signature"))?;

    let new_sig = Signature::from_hex(&claim.new_key_signature)
        .map_err(|_| failed("new-key signature encoding"))?;
    verify(&bytes, &new_sig, new_public_key).map_err(|_| failed("new-key signature"))?;

    let expected = succession_digest(&old_sig, &new_sig);
    if expected != claim.succession_signature {
        return Err(failed("succession digest"));
    }
    Ok(())
}

/// Hex SHA-256 over the concatenated signature bytes.
pub(crate) fn succession_digest(old_sig: &Signature, new_sig: &Signature) -> String {
    let mut combined = Vec::with_capacity(128);
    combined.extend_from_slice(&old_sig.to_bytes());
    combined.extend_from_slice(&new_sig.to_bytes());
    hex::encode(hash(&combined))
}
