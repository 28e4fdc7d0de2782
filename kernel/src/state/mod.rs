// Record Lifecycle State Machine
//
// Per key, per partition: Absent -> Present (create), Present -> Present
// (update), Present -> Absent (delete). Existence checks and verification
// never transition state.
// This module is pure, deterministic, and side-effect free.

/// Lifecycle state of one key in one partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    /// No commitment is recorded for the key.
    Absent,

    /// A record and its commitment are stored.
    Present,
}

impl RecordState {
    pub fn from_exists(exists: bool) -> Self {
        if exists {
            RecordState::Present
        } else {
            RecordState::Absent
        }
    }
}

/// State-changing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOp {
    Create,
    Update,
    Delete,
}

/// Errors produced during state transitions.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StateError {
    #[error("record already exists")]
    AlreadyExists,

    #[error("record does not exist")]
    NotFound,
}

/// Stateful reducer for one key's lifecycle.
#[derive(Debug)]
pub struct RecordStateMachine {
    state: RecordState,
}

impl RecordStateMachine {
    pub fn new(state: RecordState) -> Self {
        Self { state }
    }

    /// Compute the state following `op`, without mutating anything.
    pub fn transition(state: RecordState, op: RecordOp) -> Result<RecordState, StateError> {
        use RecordOp::*;
        use RecordState::*;

        match (state, op) {
            (Absent, Create) => Ok(Present),
            (Present, Update) => Ok(Present),
            (Present, Delete) => Ok(Absent),
            (Present, Create) => Err(StateError::AlreadyExists),
            (Absent, Update | Delete) => Err(StateError::NotFound),
        }
    }

    /// Apply a single operation to the state machine.
    pub fn apply(&mut self, op: RecordOp) -> Result<(), StateError> {
        self.state = Self::transition(self.state, op)?;
        Ok(())
    }

    pub fn current_state(&self) -> RecordState {
        self.state
    }
}

impl Default for RecordStateMachine {
    fn default() -> Self {
        Self::new(RecordState::Absent)
    }
}
