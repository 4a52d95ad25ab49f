//! PoHW Registry Node
//!
//! Orchestration layer wiring the four engines over one shared store:
//! - the submission pipeline (identity check, signature check, fraud
//!   checks, enqueue)
//! - effective-tier evaluation combining reputation and credentials
//! - the background batch sealer
//! - the anchoring boundary with bounded retry

pub mod anchor;
pub mod error;
pub mod node;
pub mod sealer;

pub use anchor::{anchor_with_retry, AnchorClient, RetryPolicy};
pub use error::RegistryError;
pub use node::{RegistryNode, SubmissionOutcome};
pub use sealer::{spawn_sealer, SealerHandle};
