// Employees Kernel
//
// Confidential employee records kept in per-organization private
// partitions, with SHA-256 commitments published to a shared index for
// cross-organization verification.

pub mod commitment;
pub mod contract;
pub mod identity;
pub mod log;
pub mod record;
pub mod replay;
pub mod state;
pub mod store;
pub mod transient;

pub use commitment::Commitment;
pub use contract::{ContractError, EmployeesContract};
pub use identity::{CallerIdentity, StaticIdentity, TransactionContext};
pub use record::Employee;
pub use store::{InMemoryPrivateDataStore, Partition, PrivateDataStore};
pub use transient::TransientInput;
