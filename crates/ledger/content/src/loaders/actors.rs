//! Actor fixture loader.
//!
//! Loads actors together with the items and activities they own from RON files.

use std::collections::BTreeSet;
use std::path::Path;

use ledger_core::ActorState;

use crate::loaders::{LoadResult, read_file};

/// Loader for actor fixtures from RON files.
pub struct ActorLoader;

impl ActorLoader {
    /// Load a single actor from a RON file.
    pub fn load(path: &Path) -> LoadResult<ActorState> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Load a list of actors (a party, an encounter) from a RON file.
    ///
    /// RON format: `Vec<ActorState>`. Actor ids must be unique across the list.
    pub fn load_all(path: &Path) -> LoadResult<Vec<ActorState>> {
        let content = read_file(path)?;
        let actors: Vec<ActorState> = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse actor list RON: {}", e))?;

        let mut seen = BTreeSet::new();
        for actor in &actors {
            anyhow::ensure!(
                seen.insert(actor.id.clone()),
                "Actor '{}' is defined twice",
                actor.id
            );
            validate(actor)?;
        }
        Ok(actors)
    }

    /// Parse and validate one actor from RON text.
    pub fn parse(content: &str) -> LoadResult<ActorState> {
        let actor: ActorState = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse actor RON: {}", e))?;
        validate(&actor)?;
        Ok(actor)
    }
}

/// Item ids must be unique per actor, activity ids unique per item.
fn validate(actor: &ActorState) -> LoadResult<()> {
    anyhow::ensure!(!actor.id.0.is_empty(), "Actor '{}' has no id", actor.name);

    let mut items = BTreeSet::new();
    for item in &actor.items {
        anyhow::ensure!(
            items.insert(&item.id),
            "Actor '{}' owns item '{}' twice",
            actor.id,
            item.id
        );

        let mut activities = BTreeSet::new();
        for activity in &item.activities {
            anyhow::ensure!(
                activities.insert(&activity.id),
                "Item '{}' on actor '{}' has activity '{}' twice",
                item.id,
                actor.id,
                activity.id
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::{ActorKind, ConsumptionType, ItemId, ItemKind};

    const HERO: &str = r#"
        (
            id: "hero",
            name: "Hero",
            kind: character,
            xp: 300,
            currency: { "gp": 12, "sp": 4 },
            attributes: { "resources.ki.max": 3, "resources.ki.spent": 1 },
            spells: { "spell1": (level: 1, value: 2, max: 4) },
            items: [
                (
                    id: "wand",
                    name: "Wand of Sparks",
                    kind: equipment,
                    quantity: 1,
                    uses: Some((spent: 1, max: 3, recovery: [(period: "dawn")])),
                    activities: [
                        (
                            id: "zap",
                            name: "Zap",
                            consumption: (
                                targets: [(type: itemUses, target: "", value: "1")],
                            ),
                        ),
                    ],
                ),
                (
                    id: "fighter",
                    name: "Fighter",
                    kind: class,
                    class: Some((levels: 3, hit_die: 10)),
                ),
            ],
        )
    "#;

    #[test]
    fn actor_with_items_is_parsed() {
        let actor = ActorLoader::parse(HERO).unwrap();

        assert_eq!(actor.kind, ActorKind::Character);
        assert_eq!(actor.currency.get("gp"), 12);
        assert_eq!(actor.attribute("resources.ki.value"), Some(2));
        assert_eq!(actor.attribute("spells.spell1.value"), Some(2));
        assert_eq!(actor.level(), 3);

        let wand = actor.item(&ItemId::new("wand")).unwrap();
        assert_eq!(wand.kind, ItemKind::Equipment);
        assert_eq!(wand.uses.as_ref().map(|uses| uses.value()), Some(2));
        let targets = &wand.activities[0].consumption.targets;
        assert_eq!(targets[0].kind, ConsumptionType::ItemUses);
        assert!(wand.activities[0].consumption.spell_slot);
    }

    #[test]
    fn duplicate_items_are_rejected() {
        let content = r#"
            (
                id: "hero",
                name: "Hero",
                items: [
                    (id: "torch", name: "Torch", kind: consumable, quantity: 2),
                    (id: "torch", name: "Torch", kind: consumable, quantity: 1),
                ],
            )
        "#;
        let err = ActorLoader::parse(content).unwrap_err();
        assert!(err.to_string().contains("owns item 'torch' twice"));
    }

    #[test]
    fn party_file_is_loaded_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("party.ron");
        std::fs::write(
            &path,
            r#"[
                (id: "a", name: "Aria", kind: character),
                (id: "b", name: "Brann", kind: character, xp: 50),
                (id: "party", name: "Party", kind: group),
            ]"#,
        )
        .unwrap();

        let party = ActorLoader::load_all(&path).unwrap();
        assert_eq!(party.len(), 3);
        assert_eq!(party[1].xp, 50);
        assert_eq!(party[2].kind, ActorKind::Group);

        std::fs::write(&path, r#"[(id: "a", name: "A"), (id: "a", name: "B")]"#).unwrap();
        assert!(ActorLoader::load_all(&path).is_err());
    }
}
