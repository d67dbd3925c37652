//! Accumulated changes for one use, and the order they are written in.

use crate::dice::RolledValue;
use crate::state::{ActivityId, ActorPatch, ActorState, ItemId, ItemPatch, PatchError};

/// Changes accumulated while resolving one use.
///
/// At most one [`ItemPatch`] exists per item; touching an item twice merges
/// into the existing patch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UsageUpdates {
    /// New `uses.spent` of the acting activity, folded into the acting item's
    /// patch before commit.
    pub activity_uses_spent: Option<u32>,
    pub actor: ActorPatch,
    pub items: Vec<ItemPatch>,
    pub delete: Vec<ItemId>,
    /// Non-deterministic rolls made while resolving costs.
    pub rolls: Vec<RolledValue>,
}

/// One independent write, in commit order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UsageWrite {
    /// Patch to the item being used.
    ActingItem(ItemPatch),
    DeleteItems(Vec<ItemId>),
    Actor(ActorPatch),
    /// Patches to other items (ammunition, materials, class hit dice, ...).
    OtherItems(Vec<ItemPatch>),
}

impl UsageWrite {
    /// Apply this write to an in-memory actor.
    pub fn apply_to(&self, actor: &mut ActorState) -> Result<(), PatchError> {
        match self {
            Self::ActingItem(patch) => actor.apply_item_patch(patch),
            Self::DeleteItems(ids) => ids
                .iter()
                .try_for_each(|id| actor.remove_item(id).map(drop)),
            Self::Actor(patch) => actor.apply_changes(patch),
            Self::OtherItems(patches) => patches
                .iter()
                .try_for_each(|patch| actor.apply_item_patch(patch)),
        }
    }
}

impl UsageUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.activity_uses_spent.is_none()
            && self.actor.is_empty()
            && self.items.iter().all(ItemPatch::is_empty)
            && self.delete.is_empty()
    }

    pub fn item_patch(&self, id: &ItemId) -> Option<&ItemPatch> {
        self.items.iter().find(|patch| &patch.id == id)
    }

    /// Patch for `id`, created empty on first touch.
    pub fn item_patch_mut(&mut self, id: &ItemId) -> &mut ItemPatch {
        let index = match self.items.iter().position(|patch| &patch.id == id) {
            Some(index) => index,
            None => {
                self.items.push(ItemPatch::new(id.clone()));
                self.items.len() - 1
            }
        };
        &mut self.items[index]
    }

    pub fn delete_item(&mut self, id: ItemId) {
        if !self.delete.contains(&id) {
            self.delete.push(id);
        }
    }

    pub fn is_deleted(&self, id: &ItemId) -> bool {
        self.delete.contains(id)
    }

    /// Move the pending activity uses change into the acting item's patch.
    pub fn fold_activity(&mut self, item: &ItemId, activity: &ActivityId) {
        if let Some(spent) = self.activity_uses_spent.take() {
            self.item_patch_mut(item)
                .activity_uses_spent
                .insert(activity.clone(), spent);
        }
    }

    /// Writes in commit order: acting item, deletions, actor, other items.
    ///
    /// Empty groups are skipped and patches for deleted items are dropped.
    pub fn write_plan(&self, acting_item: &ItemId) -> Vec<UsageWrite> {
        let mut plan = Vec::new();
        let live = |patch: &&ItemPatch| !patch.is_empty() && !self.is_deleted(&patch.id);

        if let Some(patch) = self
            .items
            .iter()
            .filter(live)
            .find(|patch| &patch.id == acting_item)
        {
            plan.push(UsageWrite::ActingItem(patch.clone()));
        }
        if !self.delete.is_empty() {
            plan.push(UsageWrite::DeleteItems(self.delete.clone()));
        }
        if !self.actor.is_empty() {
            plan.push(UsageWrite::Actor(self.actor.clone()));
        }
        let others: Vec<ItemPatch> = self
            .items
            .iter()
            .filter(live)
            .filter(|patch| &patch.id != acting_item)
            .cloned()
            .collect();
        if !others.is_empty() {
            plan.push(UsageWrite::OtherItems(others));
        }
        plan
    }
}
