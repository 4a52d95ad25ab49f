use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Ed25519 keypair.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut seed = Zeroizing::new([0u8; 32]);
        OsRng.fill_bytes(seed.as_mut());
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    /// Create a keypair deterministically from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Access the inner signing key.
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// The public half of this keypair.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }
}

/// Ed25519 public key (32 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    verifying_key: VerifyingKey,
}

impl PublicKey {
    /// Access the inner verifying key.
    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Get the raw bytes (32 bytes).
    pub fn to_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    /// Create from raw bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        let verifying_key = VerifyingKey::from_bytes(&arr)
            .map_err(|e| CryptoError::InvalidInput(format!("invalid public key: {}", e)))?;
        Ok(Self { verifying_key })
    }

    /// Encode as a hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Decode from a hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| CryptoError::InvalidInput(format!("invalid public key hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_distinct() {
        let a = KeyPair::generate();
        let b = KeyPair::generate();
        assert_ne!(a.public_key().to_bytes(), b.public_key().to_bytes());
    }

    #[test]
    fn test_from_seed_deterministic() {
        let a = KeyPair::from_seed(&[7u8; 32]);
        let b = KeyPair::from_seed(&[7u8; 32]);
        assert_eq!(a.public_key(), b.public_key());
    }

    #[test]
    fn test_public_key_bytes_roundtrip() {
        let kp = KeyPair::generate();
        let pk = kp.public_key();
        let back = PublicKey::from_bytes(&pk.to_bytes()).unwrap();
        assert_eq!(pk, back);
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let kp = KeyPair::from_seed(&[1u8; 32]);
        let pk = kp.public_key();
        let hex_str = pk.to_hex();
        assert_eq!(hex_str.len(), 64);
        assert_eq!(PublicKey::from_hex(&hex_str).unwrap(), pk);
    }

    #[test]
    fn test_public_key_wrong_length() {
        assert!(matches!(
            PublicKey::from_bytes(&[0u8; 16]),
            Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: 16
            })
        ));
    }

    #[test]
    fn test_public_key_bad_hex() {
        assert!(PublicKey::from_hex("not hex").is_err());
    }
}
