//! Repository layer for actor and item state.
//!
//! Repositories hold the data a use reads and writes:
//! - Actor attributes, currency, spell slots
//! - Owned items and their activities
//!
//! Rules are not stored here; they are injected as a `RulesConfig`.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileRepository;
pub use memory::{InMemoryRepository, RecordedWrite};
pub use traits::EntityRepository;
