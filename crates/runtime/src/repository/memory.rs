//! In-memory EntityRepository implementation for tests and local runs.

use std::collections::HashMap;

use async_trait::async_trait;
use ledger_core::{ActorId, ActorPatch, ActorState, ItemId, ItemPatch};
use tokio::sync::RwLock;

use super::{EntityRepository, RepositoryError, Result};

/// One write accepted by [`InMemoryRepository`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedWrite {
    Actor(ActorId),
    Item { actor: ActorId, item: ItemId },
    Delete { actor: ActorId, items: Vec<ItemId> },
}

/// In-memory implementation of EntityRepository.
///
/// Patches go through the same [`ActorState`] application code the engine
/// tests use. Every accepted write is journaled so callers can inspect the
/// order writes arrived in.
#[derive(Default)]
pub struct InMemoryRepository {
    actors: RwLock<HashMap<ActorId, ActorState>>,
    journal: RwLock<Vec<RecordedWrite>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with an initial set of actors.
    pub fn with_actors(actors: impl IntoIterator<Item = ActorState>) -> Self {
        Self {
            actors: RwLock::new(
                actors
                    .into_iter()
                    .map(|actor| (actor.id.clone(), actor))
                    .collect(),
            ),
            journal: RwLock::new(Vec::new()),
        }
    }

    /// Writes accepted so far.
    pub async fn journal(&self) -> Vec<RecordedWrite> {
        self.journal.read().await.clone()
    }

    async fn record(&self, write: RecordedWrite) {
        self.journal.write().await.push(write);
    }
}

#[async_trait]
impl EntityRepository for InMemoryRepository {
    async fn actor(&self, id: &ActorId) -> Result<ActorState> {
        self.actors
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::UnknownActor(id.clone()))
    }

    async fn save_actor(&self, actor: &ActorState) -> Result<()> {
        self.actors
            .write()
            .await
            .insert(actor.id.clone(), actor.clone());
        self.record(RecordedWrite::Actor(actor.id.clone())).await;
        Ok(())
    }

    async fn update_actor(&self, id: &ActorId, patch: &ActorPatch) -> Result<()> {
        {
            let mut actors = self.actors.write().await;
            let actor = actors
                .get_mut(id)
                .ok_or_else(|| RepositoryError::UnknownActor(id.clone()))?;
            actor.apply_changes(patch)?;
        }
        self.record(RecordedWrite::Actor(id.clone())).await;
        Ok(())
    }

    async fn update_item(&self, actor: &ActorId, patch: &ItemPatch) -> Result<()> {
        {
            let mut actors = self.actors.write().await;
            let state = actors
                .get_mut(actor)
                .ok_or_else(|| RepositoryError::UnknownActor(actor.clone()))?;
            state.apply_item_patch(patch)?;
        }
        self.record(RecordedWrite::Item {
            actor: actor.clone(),
            item: patch.id.clone(),
        })
        .await;
        Ok(())
    }

    async fn delete_items(&self, actor: &ActorId, items: &[ItemId]) -> Result<()> {
        {
            let mut actors = self.actors.write().await;
            let state = actors
                .get_mut(actor)
                .ok_or_else(|| RepositoryError::UnknownActor(actor.clone()))?;
            for item in items {
                state.remove_item(item)?;
            }
        }
        self.record(RecordedWrite::Delete {
            actor: actor.clone(),
            items: items.to_vec(),
        })
        .await;
        Ok(())
    }
}
