// In-Memory Private Data Store
//
// Reference backend: partitions of raw content, a side index of
// commitments, and the public commitment log, all behind one lock so each
// write updates the three together.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use super::{Partition, PrivateDataStore, StoreError};
use crate::commitment::Commitment;
use crate::log::{CommitmentChange, CommitmentEvent, CommitmentLog};

/// Commitment index keyed by partition and record key.
pub type CommitmentIndex = BTreeMap<(Partition, String), Commitment>;

#[derive(Debug, Default)]
struct Inner {
    partitions: BTreeMap<Partition, BTreeMap<String, Vec<u8>>>,
    index: CommitmentIndex,
    log: CommitmentLog,
}

#[derive(Debug, Default)]
pub struct InMemoryPrivateDataStore {
    inner: RwLock<Inner>,
}

/// Hex-encoded content bytes, for snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredContent(#[serde(with = "hex::serde")] pub Vec<u8>);

/// Serializable image of a store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub partitions: BTreeMap<Partition, BTreeMap<String, StoredContent>>,
    #[serde(default)]
    pub log: CommitmentLog,
}

impl InMemoryPrivateDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a snapshot. The commitment index is recomputed
    /// from content, never trusted from the file.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let mut inner = Inner {
            log: snapshot.log,
            ..Inner::default()
        };

        for (partition, records) in snapshot.partitions {
            let mut content = BTreeMap::new();
            for (key, StoredContent(bytes)) in records {
                inner
                    .index
                    .insert((partition.clone(), key.clone()), Commitment::of(&bytes));
                content.insert(key, bytes);
            }
            inner.partitions.insert(partition, content);
        }

        Self {
            inner: RwLock::new(inner),
        }
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        let inner = self.inner.read().await;
        StoreSnapshot {
            partitions: inner
                .partitions
                .iter()
                .map(|(partition, records)| {
                    let records = records
                        .iter()
                        .map(|(k, v)| (k.clone(), StoredContent(v.clone())))
                        .collect();
                    (partition.clone(), records)
                })
                .collect(),
            log: inner.log.clone(),
        }
    }

    /// Current commitment index.
    pub async fn commitment_index(&self) -> CommitmentIndex {
        self.inner.read().await.index.clone()
    }

    pub async fn commitment_log(&self) -> CommitmentLog {
        self.inner.read().await.log.clone()
    }

    pub async fn history(&self, partition: &Partition, key: &str) -> Vec<CommitmentEvent> {
        let inner = self.inner.read().await;
        inner.log.history(partition, key).cloned().collect()
    }
}

#[async_trait]
impl PrivateDataStore for InMemoryPrivateDataStore {
    async fn private_data_hash(
        &self,
        partition: &Partition,
        key: &str,
    ) -> Result<Commitment, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .index
            .get(&(partition.clone(), key.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn private_data(&self, partition: &Partition, key: &str) -> Result<Vec<u8>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .partitions
            .get(partition)
            .and_then(|records| records.get(key))
            .cloned()
            .unwrap_or_default())
    }

    async fn put_private_data(
        &self,
        partition: &Partition,
        key: &str,
        content: Vec<u8>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let commitment = Commitment::of(&content);

        let event = inner.log.publish(
            partition,
            key,
            CommitmentChange::Written {
                commitment: commitment.clone(),
            },
        )?;
        debug!(%partition, key, sequence = event.sequence, %commitment, "commitment published");

        inner
            .index
            .insert((partition.clone(), key.to_string()), commitment);
        inner
            .partitions
            .entry(partition.clone())
            .or_default()
            .insert(key.to_string(), content);
        Ok(())
    }

    async fn delete_private_data(
        &self,
        partition: &Partition,
        key: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let index_key = (partition.clone(), key.to_string());

        if !inner.index.contains_key(&index_key) {
            return Ok(());
        }

        let event = inner
            .log
            .publish(partition, key, CommitmentChange::Deleted)?;
        debug!(%partition, key, sequence = event.sequence, "commitment retracted");

        inner.index.remove(&index_key);
        let drained = match inner.partitions.get_mut(partition) {
            Some(records) => {
                records.remove(key);
                records.is_empty()
            }
            None => false,
        };
        if drained {
            inner.partitions.remove(partition);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_publishes_commitment_of_content() {
        let store = InMemoryPrivateDataStore::new();
        let partition = Partition::for_org("one");

        store
            .put_private_data(&partition, "001", b"content".to_vec())
            .await
            .unwrap();

        let hash = store.private_data_hash(&partition, "001").await.unwrap();
        assert_eq!(hash, Commitment::of(b"content"));
        assert_eq!(
            store.private_data(&partition, "001").await.unwrap(),
            b"content".to_vec()
        );
    }

    #[tokio::test]
    async fn absent_key_has_empty_commitment_and_content() {
        let store = InMemoryPrivateDataStore::new();
        let partition = Partition::for_org("one");

        assert!(store
            .private_data_hash(&partition, "nope")
            .await
            .unwrap()
            .is_empty());
        assert!(store.private_data(&partition, "nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn partitions_are_isolated() {
        let store = InMemoryPrivateDataStore::new();
        let one = Partition::for_org("one");
        let two = Partition::for_org("two");

        store.put_private_data(&one, "001", b"a".to_vec()).await.unwrap();

        assert!(store.private_data_hash(&two, "001").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_content_and_commitment() {
        let store = InMemoryPrivateDataStore::new();
        let partition = Partition::for_org("one");

        store
            .put_private_data(&partition, "001", b"a".to_vec())
            .await
            .unwrap();
        store.delete_private_data(&partition, "001").await.unwrap();

        assert!(store
            .private_data_hash(&partition, "001")
            .await
            .unwrap()
            .is_empty());
        assert!(store.commitment_index().await.is_empty());

        let history = store.history(&partition, "001").await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].change, CommitmentChange::Deleted);
    }

    #[tokio::test]
    async fn deleting_absent_key_publishes_nothing() {
        let store = InMemoryPrivateDataStore::new();
        store
            .delete_private_data(&Partition::for_org("one"), "001")
            .await
            .unwrap();

        assert!(store.commitment_log().await.is_empty());
    }

    #[tokio::test]
    async fn snapshot_restores_content_and_recomputes_index() {
        let store = InMemoryPrivateDataStore::new();
        let partition = Partition::for_org("one");
        store
            .put_private_data(&partition, "001", b"a".to_vec())
            .await
            .unwrap();

        let json = serde_json::to_string(&store.snapshot().await).unwrap();
        let restored =
            InMemoryPrivateDataStore::from_snapshot(serde_json::from_str(&json).unwrap());

        assert_eq!(
            restored.private_data_hash(&partition, "001").await.unwrap(),
            Commitment::of(b"a")
        );
        assert_eq!(restored.commitment_log().await.len(), 1);
    }
}
