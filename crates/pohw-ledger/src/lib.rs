//! PoHW Merkle Batch & Transparency-Log Engine
//!
//! Turns the unordered stream of submitted proof hashes into periodically
//! sealed, independently verifiable batches:
//! - pending queue with an atomic snapshot-and-clear seal
//! - bottom-up SHA-256 Merkle trees with arrival-ordered leaves and
//!   odd-leaf promotion
//! - inclusion proofs regenerated from the stored leaf set
//! - append-only anchor metadata written back by the anchoring collaborator

pub mod engine;
pub mod error;
pub mod merkle;

pub use engine::{AnchorView, BatchEngine, InclusionProof, LedgerStore};
pub use error::LedgerError;
pub use merkle::{build_root, inclusion_steps, verify_inclusion, MerkleStep, Side};
