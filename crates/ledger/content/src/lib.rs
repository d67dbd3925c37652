//! Data-driven rules and actor fixtures.
//!
//! This crate provides loaders for the files a ledger deployment is configured
//! with:
//! - Rules catalogue (currencies, hit dice, use periods) from TOML
//! - Actors with their owned items and activities from RON
//!
//! All loaders deserialize ledger-core types directly through its `serde`
//! feature; nothing here adds state of its own.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ActorLoader, ConfigLoader, ContentFactory, LoadResult};
