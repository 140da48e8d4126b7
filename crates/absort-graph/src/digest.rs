//! Stable content digests for deterministic tie-breaking
//!
//! Ordering decisions that would otherwise depend on container iteration order
//! are made by comparing digests of the serialized node values instead, so the
//! outcome is identical across runs and processes.

use crate::error::Result;
use serde::Serialize;
use sha2::{Digest as _, Sha256};

/// SHA-256 of a node's bincode serialization.
pub type Digest = [u8; 32];

/// Compute the stable digest of a node value.
pub fn stable_digest<N: Serialize + ?Sized>(node: &N) -> Result<Digest> {
    let bytes = bincode::serialize(node)?;
    Ok(Sha256::digest(&bytes).into())
}
