//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from repositories, the consumption engine, and runtime
//! wiring so clients can bubble them up with consistent context.
use ledger_core::{
    ActivityId, ActorId, ConsumptionError, ErrorSeverity, FormulaError, ItemId, LedgerError,
    PatchError, ResolveError,
};
use thiserror::Error;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("actor `{actor}` owns no item `{item}`")]
    UnknownItem { actor: ActorId, item: ItemId },

    #[error("item `{item}` has no activity `{activity}`")]
    UnknownActivity { item: ItemId, activity: ActivityId },

    /// A commit pass could not pay for the use. Nothing was written.
    #[error(transparent)]
    Consumption(ConsumptionError),

    #[error(transparent)]
    Formula(#[from] FormulaError),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("runtime requires a repository to be configured before building")]
    MissingRepository,
}

impl From<ResolveError> for RuntimeError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Consumption(err) => Self::Consumption(err),
            ResolveError::Formula(err) => Self::Formula(err),
        }
    }
}

impl RuntimeError {
    /// Severity of the underlying failure, for logging and UI treatment.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Consumption(err) => err.severity(),
            Self::Formula(err) => err.severity(),
            Self::Patch(err) => err.severity(),
            Self::UnknownItem { .. } | Self::UnknownActivity { .. } => ErrorSeverity::Validation,
            Self::Repository(_) | Self::MissingRepository => ErrorSeverity::Internal,
        }
    }
}
