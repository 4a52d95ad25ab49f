use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::CryptoError;

/// SHA-256 hash (32 bytes).
pub type Hash = [u8; 32];

/// Hash arbitrary data using SHA-256.
pub fn hash(data: &[u8]) -> Hash {
    let digest = Sha256::digest(data);
    digest.into()
}

/// Hash arbitrary data and hex-encode the result.
pub fn hash_hex(data: &[u8]) -> String {
    hex::encode(hash(data))
}

/// Serialize a value to canonical JSON bytes.
///
/// Canonical form relies on serde_json's default map representation, which
/// orders object keys lexicographically. The same value always serializes
/// to the same bytes, so digests over this form are reproducible by
/// independent verifiers.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<Vec<u8>, CryptoError> {
    let v = serde_json::to_value(value).map_err(|e| CryptoError::Canonicalization(e.to_string()))?;
    serde_json::to_vec(&v).map_err(|e| CryptoError::Canonicalization(e.to_string()))
}

/// SHA-256 over the canonical JSON form of a value.
pub fn hash_canonical<T: Serialize>(value: &T) -> Result<Hash, CryptoError> {
    Ok(hash(&canonical_json(value)?))
}
