//! Key-continuity-graph walks.

use std::collections::HashSet;

use pohw_core::{Did, KcgNode};
use pohw_store::DidStore;

use crate::error::IdentityError;

/// Walk `previous_node` links backward from `did` to the chain root and
/// return the chain oldest-first.
///
/// The chain is guarded while walking: a DID reappearing in its own
/// ancestry is reported as a cycle, never returned as output. Rotation
/// enforces the same invariant at write time; this guard covers stores
/// populated out of band.
pub fn continuity_chain(store: &dyn DidStore, did: &Did) -> Result<Vec<KcgNode>, IdentityError> {
    let mut chain = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut cursor = Some(did.clone());

    while let Some(current) = cursor {
        if !visited.insert(current.uri().to_string()) {
            return Err(IdentityError::CycleDetected(current));
        }
        let node = store
            .get_node(&current)?
            .ok_or(IdentityError::DidNotFound(current))?;
        cursor = node.previous_node.clone();
        chain.push(node);
    }

    chain.reverse();
    Ok(chain)
}

/// Whether `candidate` already appears in the ancestry of `did` (inclusive).
pub fn is_ancestor(
    store: &dyn DidStore,
    did: &Did,
    candidate: &Did,
) -> Result<bool, IdentityError> {
    Ok(continuity_chain(store, did)?
        .iter()
        .any(|node| node.did == *candidate))
}
