// Employees Contract
//
// Lifecycle and verification operations over employee records held in the
// caller's private partition. Existence is defined by the presence of a
// published commitment, not by decodable content.
//
// Every operation validates before it writes; a failed call leaves the
// store untouched.

use tracing::{debug, info, instrument, warn};

use crate::commitment::Commitment;
use crate::identity::TransactionContext;
use crate::record::{Employee, RecordError};
use crate::state::{RecordOp, RecordState, RecordStateMachine, StateError};
use crate::store::{Partition, PrivateDataStore, StoreError};
use crate::transient::TransientError;

#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("the asset employees {key} already exists")]
    AlreadyExists { key: String },

    #[error("the asset employees {key} does not exist")]
    NotFound { key: String },

    #[error("transient data was not specified")]
    MissingInput,

    /// `position` is 1-based in validation order.
    #[error("the {field} key was not specified in transient data")]
    MissingField { field: &'static str, position: usize },

    #[error("the {field} key in transient data is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("no private data hash with the key: {key}")]
    NoCommitment { key: String },

    #[error("the asset employees {key} has malformed content: {source}")]
    Malformed {
        key: String,
        #[source]
        source: RecordError,
    },

    #[error(transparent)]
    Encoding(RecordError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<TransientError> for ContractError {
    fn from(err: TransientError) -> Self {
        match err {
            TransientError::Empty => ContractError::MissingInput,
            TransientError::MissingField { field, position } => {
                ContractError::MissingField { field, position }
            }
            TransientError::InvalidField { field, reason } => {
                ContractError::InvalidField { field, reason }
            }
        }
    }
}

/// Employee record contract over a private data store.
#[derive(Debug)]
pub struct EmployeesContract<S> {
    store: S,
}

impl<S: PrivateDataStore> EmployeesContract<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// True iff a non-empty commitment is recorded for `key` in the
    /// caller's partition.
    #[instrument(skip(self, ctx), fields(org = %ctx.caller_org()))]
    pub async fn employees_exists(
        &self,
        ctx: &TransactionContext,
        key: &str,
    ) -> Result<bool, ContractError> {
        let partition = Partition::for_org(ctx.caller_org());
        let exists = self.commitment_present(&partition, key).await?;
        debug!(exists, "existence checked");
        Ok(exists)
    }

    #[instrument(skip(self, ctx), fields(org = %ctx.caller_org()))]
    pub async fn create_employees(
        &self,
        ctx: &TransactionContext,
        key: &str,
    ) -> Result<(), ContractError> {
        let partition = self.admit(ctx, key, RecordOp::Create).await?;
        let employee = ctx.transient().to_employee()?;

        self.write(&partition, key, &employee).await?;
        info!("employee created");
        Ok(())
    }

    #[instrument(skip(self, ctx), fields(org = %ctx.caller_org()))]
    pub async fn read_employees(
        &self,
        ctx: &TransactionContext,
        key: &str,
    ) -> Result<Employee, ContractError> {
        let partition = Partition::for_org(ctx.caller_org());
        if !self.commitment_present(&partition, key).await? {
            return Err(ContractError::NotFound { key: key.into() });
        }

        let content = self.store.private_data(&partition, key).await?;
        let employee = Employee::from_bytes(&content).map_err(|source| {
            warn!(error = %source, "stored content could not be decoded");
            ContractError::Malformed {
                key: key.into(),
                source,
            }
        })?;

        debug!("employee read");
        Ok(employee)
    }

    /// Replace all four fields of an existing record.
    #[instrument(skip(self, ctx), fields(org = %ctx.caller_org()))]
    pub async fn update_employees(
        &self,
        ctx: &TransactionContext,
        key: &str,
    ) -> Result<(), ContractError> {
        let partition = self.admit(ctx, key, RecordOp::Update).await?;
        let employee = ctx.transient().to_employee()?;

        self.write(&partition, key, &employee).await?;
        info!("employee updated");
        Ok(())
    }

    #[instrument(skip(self, ctx), fields(org = %ctx.caller_org()))]
    pub async fn delete_employees(
        &self,
        ctx: &TransactionContext,
        key: &str,
    ) -> Result<(), ContractError> {
        let partition = self.admit(ctx, key, RecordOp::Delete).await?;

        self.store.delete_private_data(&partition, key).await?;
        info!("employee deleted");
        Ok(())
    }

    /// Check `candidate` against the commitment `target_org` published for
    /// `key`. A mismatch is `Ok(false)`, not an error.
    ///
    /// The target partition is queried directly so verification never
    /// assumes the caller's own organization.
    #[instrument(skip(self, ctx, candidate), fields(caller = %ctx.caller_org()))]
    pub async fn verify_employees(
        &self,
        ctx: &TransactionContext,
        target_org: &str,
        key: &str,
        candidate: &Employee,
    ) -> Result<bool, ContractError> {
        let bytes = candidate.to_bytes().map_err(ContractError::Encoding)?;
        let expected = Commitment::of(&bytes);

        let partition = Partition::for_org(target_org);
        let published = self.store.private_data_hash(&partition, key).await?;
        if published.is_empty() {
            return Err(ContractError::NoCommitment { key: key.into() });
        }

        let matches = published == expected;
        info!(matches, "employee verified");
        Ok(matches)
    }

    async fn commitment_present(
        &self,
        partition: &Partition,
        key: &str,
    ) -> Result<bool, ContractError> {
        let commitment = self.store.private_data_hash(partition, key).await?;
        Ok(!commitment.is_empty())
    }

    /// Check the lifecycle precondition of `op` in the caller's partition.
    async fn admit(
        &self,
        ctx: &TransactionContext,
        key: &str,
        op: RecordOp,
    ) -> Result<Partition, ContractError> {
        let partition = Partition::for_org(ctx.caller_org());
        let state = RecordState::from_exists(self.commitment_present(&partition, key).await?);

        RecordStateMachine::transition(state, op).map_err(|err| match err {
            StateError::AlreadyExists => ContractError::AlreadyExists { key: key.into() },
            StateError::NotFound => ContractError::NotFound { key: key.into() },
        })?;

        Ok(partition)
    }

    async fn write(
        &self,
        partition: &Partition,
        key: &str,
        employee: &Employee,
    ) -> Result<(), ContractError> {
        let bytes = employee.to_bytes().map_err(ContractError::Encoding)?;
        self.store.put_private_data(partition, key, bytes).await?;
        Ok(())
    }
}
