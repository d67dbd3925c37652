//! Error types raised by repository implementations.

use ledger_core::{ActorId, ItemId, PatchError};
use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("actor `{0}` not found")]
    UnknownActor(ActorId),

    #[error("actor `{actor}` owns no item `{item}`")]
    UnknownItem { actor: ActorId, item: ItemId },

    #[error("actor id `{0}` cannot be stored")]
    InvalidId(ActorId),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
