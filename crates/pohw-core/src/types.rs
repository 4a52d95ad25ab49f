use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Decentralized Identifier in the PoHW registry.
/// Format: `did:pohw:<identifier>` where the identifier is the truncated
/// hex SHA-256 of the controlling public key (32 hex characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Did(pub String);

impl Did {
    /// Create a DID from a full URI string, validating the format.
    pub fn new(uri: String) -> Result<Self, CoreError> {
        let Some(identifier) = uri.strip_prefix("did:pohw:") else {
            return Err(CoreError::InvalidDid(format!(
                "DID must start with 'did:pohw:', got: {}",
                uri
            )));
        };
        if identifier.len() != 32 || !identifier.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidDid(format!(
                "DID identifier must be 32 hex characters, got: {}",
                identifier
            )));
        }
        Ok(Self(uri))
    }

    /// Create a DID from an already-derived identifier.
    pub fn from_identifier(identifier: &str) -> Self {
        Self(format!("did:pohw:{}", identifier))
    }

    /// Get the full DID URI.
    pub fn uri(&self) -> &str {
        &self.0
    }

    /// Extract the identifier portion (after the method prefix).
    pub fn identifier(&self) -> Option<&str> {
        self.0.strip_prefix("did:pohw:")
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// SHA-256 content hash, hex-encoded (64 lowercase hex characters).
///
/// Proofs are uniquely keyed by this value; it is also the sole lookup and
/// revocation key for credentials.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
    /// Create from a hex string, validating length and alphabet.
    pub fn new(hex_str: String) -> Result<Self, CoreError> {
        if hex_str.len() != 64 {
            return Err(CoreError::InvalidHash(format!(
                "content hash must be 64 hex characters, got {}",
                hex_str.len()
            )));
        }
        if !hex_str.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidHash(
                "content hash contains non-hex characters".into(),
            ));
        }
        Ok(Self(hex_str.to_ascii_lowercase()))
    }

    /// Get the hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode into raw bytes.
    pub fn to_bytes(&self) -> Result<[u8; 32], CoreError> {
        let mut out = [0u8; 32];
        let decoded = (0..32)
            .map(|i| u8::from_str_radix(&self.0[i * 2..i * 2 + 2], 16))
            .collect::<Result<Vec<u8>, _>>()
            .map_err(|_| CoreError::InvalidHash("content hash is not valid hex".into()))?;
        out.copy_from_slice(&decoded);
        Ok(out)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a sealed Merkle batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(pub uuid::Uuid);

impl BatchId {
    /// Generate a fresh, time-ordered batch id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7())
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse trust level assigned to an identity.
///
/// Ordered from strongest to weakest; `Grey` is the default for identities
/// with no history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustTier {
    Green,
    Blue,
    Purple,
    Grey,
}

impl TrustTier {
    /// Rank used to compare tiers; higher is more trusted.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Green => 3,
            Self::Blue => 2,
            Self::Purple => 1,
            Self::Grey => 0,
        }
    }

    /// The stronger of two tiers.
    pub fn max(self, other: Self) -> Self {
        if self.rank() >= other.rank() {
            self
        } else {
            other
        }
    }

    /// The weaker of two tiers.
    pub fn min(self, other: Self) -> Self {
        if self.rank() <= other.rank() {
            self
        } else {
            other
        }
    }
}

impl fmt::Display for TrustTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Green => write!(f, "green"),
            Self::Blue => write!(f, "blue"),
            Self::Purple => write!(f, "purple"),
            Self::Grey => write!(f, "grey"),
        }
    }
}

/// Assurance level an attestor asserts in a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssuranceLevel {
    Basic,
    Standard,
    High,
}

impl fmt::Display for AssuranceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic => write!(f, "basic"),
            Self::Standard => write!(f, "standard"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Kind of accredited attestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttestorKind {
    /// An accredited organization running human-review processes.
    Organization,
    /// An individual accredited reviewer.
    Individual,
    /// A Foundation-level attestor with override privileges.
    Foundation,
}

impl fmt::Display for AttestorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Organization => write!(f, "organization"),
            Self::Individual => write!(f, "individual"),
            Self::Foundation => write!(f, "foundation"),
        }
    }
}
