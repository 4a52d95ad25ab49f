//! PoHW cryptographic primitives.
//!
//! SHA-256 content hashing (the registry's only hash function), canonical
//! JSON digests for signing payloads and credential keys, and Ed25519
//! keypairs and signatures.

pub mod error;
pub mod hashing;
pub mod keys;
pub mod signing;

pub use error::CryptoError;
pub use hashing::{canonical_json, hash, hash_canonical, hash_hex, Hash};
pub use keys::{KeyPair, PublicKey};
pub use signing::{sign, verify, Signature};
