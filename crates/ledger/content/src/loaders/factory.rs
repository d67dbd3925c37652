//! Content factory for loading rules and actors from a data directory.

use std::path::{Path, PathBuf};

use ledger_core::{ActorState, RulesConfig};

use crate::loaders::{ActorLoader, ConfigLoader, LoadResult};

/// Content factory that loads ledger content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── rules.toml
/// ├── party.ron
/// └── actors/
///     ├── hero.ron
///     └── quartermaster.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load the rules catalogue from `rules.toml`, or the defaults when the
    /// file does not exist.
    pub fn load_rules(&self) -> LoadResult<RulesConfig> {
        let path = self.data_dir.join("rules.toml");
        if !path.exists() {
            return Ok(RulesConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load one actor from `actors/{name}.ron`.
    pub fn load_actor(&self, name: &str) -> LoadResult<ActorState> {
        let path = self.data_dir.join("actors").join(format!("{}.ron", name));
        ActorLoader::load(&path)
    }

    /// Load the actor list from `party.ron`.
    pub fn load_party(&self) -> LoadResult<Vec<ActorState>> {
        let path = self.data_dir.join("party.ron");
        ActorLoader::load_all(&path)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn missing_rules_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let factory = ContentFactory::new(dir.path());
        assert_eq!(factory.load_rules().unwrap(), RulesConfig::default());
        assert!(factory.load_actor("nobody").is_err());
    }

    #[test]
    fn actors_are_read_from_the_actor_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("actors")).unwrap();
        std::fs::write(
            dir.path().join("actors").join("hero.ron"),
            r#"(id: "hero", name: "Hero", currency: { "gp": 3 })"#,
        )
        .unwrap();

        let actor = ContentFactory::new(dir.path()).load_actor("hero").unwrap();
        assert_eq!(actor.name, "Hero");
        assert_eq!(actor.currency.get("gp"), 3);
    }
}
