//! PoHW Identity Layer
//!
//! DID key-continuity machinery for the registry:
//! - DID derivation from public keys (`did:pohw:` + truncated SHA-256)
//! - Key rotation producing dual-signed continuity claims
//! - Independent continuity-claim verification
//! - Key-continuity-graph walks with an enforced acyclicity invariant
//! - Forward-only identity revocation

pub mod continuity;
pub mod error;
pub mod graph;
pub mod registry;

pub use continuity::{verify_claim, RotationOutcome, RotationPayload};
pub use error::IdentityError;
pub use registry::{derive_did, IdentityRegistry};
