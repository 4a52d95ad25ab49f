//! PoHW Attestor & Verifiable-Credential Framework
//!
//! Accredits trusted third parties who vouch for human authorship:
//! - attestor lifecycle (`pending → active → {suspended, revoked}`)
//! - credential issuance keyed by canonical content hash
//! - append-only, monotonic revocation
//! - multi-attestor policy evaluation with structured outcomes
//! - an append-only audit trail for every state transition

pub mod audit;
pub mod credential;
pub mod error;
pub mod framework;
pub mod policy;

pub use error::AttestorError;
pub use framework::{AttestorBackend, AttestorFramework};
pub use policy::{PolicyDetails, PolicyOutcome};
