//! File-based EntityRepository implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ledger_core::{ActorId, ActorPatch, ActorState, ItemId, ItemPatch};
use tokio::fs;
use tokio::sync::Mutex;

use super::{EntityRepository, RepositoryError, Result};

/// File-based implementation of EntityRepository.
///
/// Each actor is stored as `actor_{id}.json`. Every write is a
/// read-modify-write of that file followed by an atomic rename; a process-wide
/// lock serialises writers within this repository instance.
pub struct FileRepository {
    base_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileRepository {
    /// Create a new file-based repository rooted at `base_dir`.
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).await?;
        Ok(Self {
            base_dir,
            write_lock: Mutex::new(()),
        })
    }

    fn actor_path(&self, id: &ActorId) -> Result<PathBuf> {
        let valid = !id.0.is_empty()
            && id
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(RepositoryError::InvalidId(id.clone()));
        }
        Ok(self.base_dir.join(format!("actor_{}.json", id.0)))
    }

    async fn read(&self, id: &ActorId) -> Result<ActorState> {
        let path = self.actor_path(id)?;
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(RepositoryError::UnknownActor(id.clone()));
            }
            Err(err) => return Err(err.into()),
        };
        serde_json::from_slice(&bytes).map_err(|e| RepositoryError::Json(e.to_string()))
    }

    async fn write(&self, actor: &ActorState) -> Result<()> {
        let path = self.actor_path(&actor.id)?;
        let temp_path = path.with_extension("json.tmp");

        let bytes =
            serde_json::to_vec_pretty(actor).map_err(|e| RepositoryError::Json(e.to_string()))?;
        fs::write(&temp_path, bytes).await?;
        fs::rename(&temp_path, &path).await?;

        tracing::debug!("Saved actor[{}] to {}", actor.id, path.display());
        Ok(())
    }

    async fn modify(
        &self,
        id: &ActorId,
        change: impl FnOnce(&mut ActorState) -> Result<()> + Send,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut actor = self.read(id).await?;
        change(&mut actor)?;
        self.write(&actor).await
    }
}

#[async_trait]
impl EntityRepository for FileRepository {
    async fn actor(&self, id: &ActorId) -> Result<ActorState> {
        self.read(id).await
    }

    async fn save_actor(&self, actor: &ActorState) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write(actor).await
    }

    async fn update_actor(&self, id: &ActorId, patch: &ActorPatch) -> Result<()> {
        self.modify(id, |actor| Ok(actor.apply_changes(patch)?)).await
    }

    async fn update_item(&self, actor: &ActorId, patch: &ItemPatch) -> Result<()> {
        self.modify(actor, |state| Ok(state.apply_item_patch(patch)?)).await
    }

    async fn delete_items(&self, actor: &ActorId, items: &[ItemId]) -> Result<()> {
        self.modify(actor, |state| {
            for item in items {
                state.remove_item(item)?;
            }
            Ok(())
        })
        .await
    }
}
