// Caller Identity
//
// Resolves the invoking client to an organization (MSP) identifier and
// bundles it with the call's transient input into a transaction context.

use crate::transient::TransientInput;

/// Maps the current caller to its organization identifier.
pub trait CallerIdentity: Send + Sync {
    fn msp_id(&self) -> String;
}

/// Identity fixed at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIdentity {
    msp_id: String,
}

impl StaticIdentity {
    pub fn new(msp_id: impl Into<String>) -> Self {
        Self {
            msp_id: msp_id.into(),
        }
    }
}

impl CallerIdentity for StaticIdentity {
    fn msp_id(&self) -> String {
        self.msp_id.clone()
    }
}

/// Everything a single contract invocation knows about its caller.
#[derive(Debug, Clone)]
pub struct TransactionContext {
    caller_org: String,
    transient: TransientInput,
}

impl TransactionContext {
    /// Resolve the caller and attach this invocation's transient input.
    pub fn resolve(identity: &dyn CallerIdentity, transient: TransientInput) -> Self {
        Self {
            caller_org: identity.msp_id(),
            transient,
        }
    }

    /// Context with no transient input, for read-only calls.
    pub fn for_org(caller_org: impl Into<String>) -> Self {
        Self {
            caller_org: caller_org.into(),
            transient: TransientInput::new(),
        }
    }

    pub fn with_transient(mut self, transient: TransientInput) -> Self {
        self.transient = transient;
        self
    }

    pub fn caller_org(&self) -> &str {
        &self.caller_org
    }

    pub fn transient(&self) -> &TransientInput {
        &self.transient
    }
}
