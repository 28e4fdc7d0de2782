// Record Commitments
//
// A commitment is the SHA-256 digest of a record's exact serialized bytes.
// The store publishes one per key to the shared index; anyone can read it,
// only partition members can read the content behind it.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Raw digest bytes as published for a key.
///
/// An empty commitment means no record is stored under the key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment(#[serde(with = "hex::serde")] Vec<u8>);

impl Commitment {
    /// Commitment of the given content bytes.
    pub fn of(content: &[u8]) -> Self {
        Self(Sha256::digest(content).to_vec())
    }

    /// The absent commitment.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Wrap digest bytes as returned by a store backend.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
