// Public Commitment Log
//
// Append-only history of the shared commitment index. Every private write
// or delete publishes one event; content never appears here.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::commitment::Commitment;
use crate::store::Partition;

/// Position of an event in the log, starting at 1.
pub type Sequence = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommitmentChange {
    Written { commitment: Commitment },
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentEvent {
    pub tx_id: Uuid,
    pub sequence: Sequence,
    pub partition: Partition,
    pub key: String,
    #[serde(flatten)]
    pub change: CommitmentChange,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LogError {
    #[error("sequence conflict: expected {expected}, got {actual}")]
    SequenceConflict { expected: Sequence, actual: Sequence },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitmentLog {
    events: Vec<CommitmentEvent>,
}

impl CommitmentLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn next_sequence(&self) -> Sequence {
        self.current_sequence() + 1
    }

    pub fn append(&mut self, event: CommitmentEvent) -> Result<(), LogError> {
        let expected = self.next_sequence();

        if event.sequence != expected {
            return Err(LogError::SequenceConflict {
                expected,
                actual: event.sequence,
            });
        }

        self.events.push(event);
        Ok(())
    }

    /// Build and append the next event for `partition`/`key`.
    pub fn publish(
        &mut self,
        partition: &Partition,
        key: &str,
        change: CommitmentChange,
    ) -> Result<&CommitmentEvent, LogError> {
        let event = CommitmentEvent {
            tx_id: Uuid::new_v4(),
            sequence: self.next_sequence(),
            partition: partition.clone(),
            key: key.to_string(),
            change,
        };
        self.append(event)?;
        Ok(&self.events[self.events.len() - 1])
    }

    pub fn replay(&self) -> impl Iterator<Item = &CommitmentEvent> {
        self.events.iter()
    }

    /// Events touching a single key, oldest first.
    pub fn history<'a>(
        &'a self,
        partition: &'a Partition,
        key: &'a str,
    ) -> impl Iterator<Item = &'a CommitmentEvent> + 'a {
        self.events
            .iter()
            .filter(move |e| &e.partition == partition && e.key == key)
    }

    pub fn current_sequence(&self) -> Sequence {
        self.events.last().map(|e| e.sequence).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
