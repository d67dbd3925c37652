//! Repository contract for reading and writing actors and their items.

use async_trait::async_trait;
use ledger_core::{ActorId, ActorPatch, ActorState, ItemId, ItemPatch, ItemState};

use super::{RepositoryError, Result};

/// Storage for actors and the items they own.
///
/// Reads return owned snapshots; every write is independent and awaited on its
/// own. Nothing here is transactional: a failed write leaves earlier writes in
/// place.
#[async_trait]
pub trait EntityRepository: Send + Sync {
    /// Load an actor with all of its items.
    async fn actor(&self, id: &ActorId) -> Result<ActorState>;

    /// Store a whole actor, replacing any previous version.
    async fn save_actor(&self, actor: &ActorState) -> Result<()>;

    /// Write attribute values on an actor.
    async fn update_actor(&self, id: &ActorId, patch: &ActorPatch) -> Result<()>;

    /// Write fields on one owned item.
    async fn update_item(&self, actor: &ActorId, patch: &ItemPatch) -> Result<()>;

    /// Remove owned items.
    async fn delete_items(&self, actor: &ActorId, items: &[ItemId]) -> Result<()>;

    /// Load a single owned item.
    async fn item(&self, actor: &ActorId, item: &ItemId) -> Result<ItemState> {
        self.actor(actor)
            .await?
            .item(item)
            .cloned()
            .ok_or_else(|| RepositoryError::UnknownItem {
                actor: actor.clone(),
                item: item.clone(),
            })
    }

    /// Read a numeric value at an attribute path.
    async fn attribute(&self, actor: &ActorId, path: &str) -> Result<Option<i64>> {
        Ok(self.actor(actor).await?.attribute(path))
    }

    /// Write a numeric value at an attribute path.
    async fn set_attribute(&self, actor: &ActorId, path: &str, value: i64) -> Result<()> {
        let mut patch = ActorPatch::new();
        patch.set(path, value);
        self.update_actor(actor, &patch).await
    }

    /// Write several item patches, one independent write each.
    async fn update_items(&self, actor: &ActorId, patches: &[ItemPatch]) -> Result<()> {
        for patch in patches {
            self.update_item(actor, patch).await?;
        }
        Ok(())
    }
}
