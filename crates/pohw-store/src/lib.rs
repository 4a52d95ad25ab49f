//! PoHW persistence boundary.
//!
//! The engines see persistence as a set of narrow, synchronous traits, one
//! per concern. Backends are injected per instance, so tests get clean
//! isolated state. `MemoryStore` is the reference backend; anything that
//! can satisfy the traits (file-based, relational) can replace it.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use traits::{
    AttestorStore, AuditStore, BatchStore, CredentialStore, DidStore, ProofStore, ReputationStore,
};
