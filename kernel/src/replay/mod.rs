// Deterministic Replay of the Commitment Log
//
// Replays published commitment events through the record lifecycle state
// machine and derives the commitment index they imply. Comparing that with
// a store's live index exposes drift between the two.

use serde::Serialize;

use crate::commitment::Commitment;
use crate::log::{CommitmentChange, CommitmentLog, Sequence};
use crate::state::{RecordOp, RecordState, RecordStateMachine, StateError};
use crate::store::memory::CommitmentIndex;
use crate::store::Partition;

/// Errors that can occur during replay.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReplayError {
    #[error("illegal transition at sequence {sequence} for {partition}/{key}: {source}")]
    State {
        sequence: Sequence,
        partition: Partition,
        key: String,
        #[source]
        source: StateError,
    },
}

/// Replay the log and derive the commitment index it implies.
///
/// This is the only supported way to reconstruct the public index.
pub fn replay_commitment_index(log: &CommitmentLog) -> Result<CommitmentIndex, ReplayError> {
    let mut index = CommitmentIndex::new();

    for event in log.replay() {
        let index_key = (event.partition.clone(), event.key.clone());
        let current = RecordState::from_exists(index.contains_key(&index_key));

        let op = match (&event.change, current) {
            (CommitmentChange::Written { .. }, RecordState::Absent) => RecordOp::Create,
            (CommitmentChange::Written { .. }, RecordState::Present) => RecordOp::Update,
            (CommitmentChange::Deleted, _) => RecordOp::Delete,
        };

        RecordStateMachine::transition(current, op).map_err(|source| ReplayError::State {
            sequence: event.sequence,
            partition: event.partition.clone(),
            key: event.key.clone(),
            source,
        })?;

        match &event.change {
            CommitmentChange::Written { commitment } => {
                index.insert(index_key, commitment.clone());
            }
            CommitmentChange::Deleted => {
                index.remove(&index_key);
            }
        }
    }

    Ok(index)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "drift", rename_all = "snake_case")]
pub enum IndexDrift {
    /// The log implies a commitment the store does not hold.
    Missing { partition: Partition, key: String },

    /// The store holds a commitment the log never published.
    Unpublished { partition: Partition, key: String },

    /// Both hold a commitment but they differ.
    Mismatch {
        partition: Partition,
        key: String,
        published: Commitment,
        live: Commitment,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub events_replayed: usize,
    pub keys: usize,
    pub drift: Vec<IndexDrift>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.drift.is_empty()
    }
}

/// Replay `log` and compare the result with a live index.
pub fn audit_index(
    log: &CommitmentLog,
    live: &CommitmentIndex,
) -> Result<AuditReport, ReplayError> {
    let published = replay_commitment_index(log)?;
    let mut drift = Vec::new();

    for ((partition, key), expected) in &published {
        match live.get(&(partition.clone(), key.clone())) {
            None => drift.push(IndexDrift::Missing {
                partition: partition.clone(),
                key: key.clone(),
            }),
            Some(actual) if actual != expected => drift.push(IndexDrift::Mismatch {
                partition: partition.clone(),
                key: key.clone(),
                published: expected.clone(),
                live: actual.clone(),
            }),
            Some(_) => {}
        }
    }

    for (partition, key) in live.keys().filter(|k| !published.contains_key(*k)) {
        drift.push(IndexDrift::Unpublished {
            partition: partition.clone(),
            key: key.clone(),
        });
    }

    Ok(AuditReport {
        events_replayed: log.len(),
        keys: published.len(),
        drift,
    })
}
