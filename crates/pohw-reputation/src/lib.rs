//! PoHW Fraud-Mitigation / Reputation Engine
//!
//! Bounds how fast, and how plausibly, a single identity may submit proofs
//! without hard-blocking legitimate bursts. A heuristic defense, not a
//! proof: every decision carries the exact metrics that produced it, and
//! every threshold lives in configuration.

pub mod error;
pub mod rate_limit;
pub mod reputation;

pub use error::ReputationError;
pub use rate_limit::{RateDecision, SubmissionWindow};
pub use reputation::FraudEngine;
