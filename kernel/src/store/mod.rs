// Private Data Store Abstraction
//
// Defines the contract for the organization-scoped private partitions the
// employee contract reads and writes. Implementations may sit on a ledger
// peer, a database, or memory.
//
// This module defines *interfaces only*; see `memory` for the reference
// backend.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::commitment::Commitment;

pub mod memory;

pub use memory::{InMemoryPrivateDataStore, StoreSnapshot};

/// Prefix shared by every implicit per-organization partition.
pub const IMPLICIT_ORG_PREFIX: &str = "_implicit_org_";

/// Name of an organization's private partition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Partition(String);

impl Partition {
    /// `_implicit_org_<org_id>`. Pure string derivation, no access check.
    pub fn for_org(org_id: &str) -> Self {
        Self(format!("{IMPLICIT_ORG_PREFIX}{org_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store backend unavailable: {0}")]
    Unavailable(String),

    #[error("commitment log rejected write: {0}")]
    Log(#[from] crate::log::LogError),
}

/// Storage backend for private records.
///
/// Properties required from implementations:
/// - Every `put_private_data` replaces the key's commitment with
///   `Commitment::of(content)` in the same atomic step
/// - Every `delete_private_data` removes content and commitment together
/// - `private_data_hash` is answerable for any partition, member or not
///
/// Implementations MUST NOT:
/// - Expose a commitment without stored content, or vice versa
/// - Let one partition's keys shadow another's
#[async_trait]
pub trait PrivateDataStore: Send + Sync {
    /// Commitment recorded for `key`. Empty when absent.
    async fn private_data_hash(
        &self,
        partition: &Partition,
        key: &str,
    ) -> Result<Commitment, StoreError>;

    /// Raw content stored under `key`. Empty when absent.
    async fn private_data(&self, partition: &Partition, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Write content and republish its commitment.
    async fn put_private_data(
        &self,
        partition: &Partition,
        key: &str,
        content: Vec<u8>,
    ) -> Result<(), StoreError>;

    /// Remove content and commitment.
    async fn delete_private_data(&self, partition: &Partition, key: &str)
        -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_is_derived_from_org_id() {
        assert_eq!(Partition::for_org("one").as_str(), "_implicit_org_one");
        assert_ne!(Partition::for_org("one"), Partition::for_org("two"));
    }
}
