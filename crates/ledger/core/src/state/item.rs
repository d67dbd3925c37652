//! Owned items: limited uses, recharge, class hit dice, spell data.

use std::fmt;

use super::{
    ActivityId, ActivityState, CurrencyBag, ItemPatch, PatchError, SpellData, SpellScroll,
    to_count,
};

/// Item identifier, unique within the owning actor.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ItemKind {
    Weapon,
    #[default]
    Equipment,
    Consumable,
    Tool,
    Loot,
    Container,
    Class,
    Spell,
    Feat,
}

impl ItemKind {
    /// Kinds that can be spent as material components or ammunition.
    pub const fn is_material(self) -> bool {
        matches!(self, Self::Consumable | Self::Loot)
    }
}

// ============================================================================
// Limited Uses
// ============================================================================

/// One way limited uses come back.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UsesRecovery {
    /// Key into `RulesConfig::use_periods` (`"lr"`, `"turnStart"`, ...).
    pub period: String,
    /// Recovery formula; `None` recovers all uses.
    #[cfg_attr(feature = "serde", serde(default))]
    pub formula: Option<String>,
}

impl UsesRecovery {
    pub fn all(period: impl Into<String>) -> Self {
        Self {
            period: period.into(),
            formula: None,
        }
    }
}

/// Limited uses tracked as a spent counter against a maximum.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UsesData {
    pub spent: u32,
    pub max: u32,
    pub recovery: Vec<UsesRecovery>,
    /// Exhausting the uses consumes one unit of quantity.
    pub auto_destroy: bool,
}

impl UsesData {
    pub fn new(spent: u32, max: u32) -> Self {
        Self {
            spent,
            max,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_recovery(mut self, recovery: UsesRecovery) -> Self {
        self.recovery.push(recovery);
        self
    }

    #[must_use]
    pub fn auto_destroy(mut self) -> Self {
        self.auto_destroy = true;
        self
    }

    /// Remaining uses.
    pub fn value(&self) -> u32 {
        self.max.saturating_sub(self.spent)
    }
}

/// Recharge roll threshold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RechargeData {
    /// Minimum die result that recharges the item.
    pub value: u32,
    pub charged: bool,
}

/// Class levels and the hit dice they provide.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClassData {
    pub levels: u32,
    /// Hit die faces (8 for `d8`).
    pub hit_die: u32,
    pub hit_dice_spent: u32,
}

impl ClassData {
    pub const fn new(levels: u32, hit_die: u32, hit_dice_spent: u32) -> Self {
        Self {
            levels,
            hit_die,
            hit_dice_spent,
        }
    }

    pub const fn available(&self) -> u32 {
        self.levels.saturating_sub(self.hit_dice_spent)
    }

    pub fn denomination(&self) -> String {
        format!("d{}", self.hit_die)
    }
}

// ============================================================================
// Item State
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ItemState {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    pub quantity: u32,
    pub uses: Option<UsesData>,
    pub recharge: Option<RechargeData>,
    pub class: Option<ClassData>,
    pub spell: Option<SpellData>,
    /// Present on spell scrolls, which cast at a fixed level.
    pub scroll: Option<SpellScroll>,
    /// Coins held by container items.
    pub currency: CurrencyBag,
    pub activities: Vec<ActivityState>,
}

impl ItemState {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: ItemId(id.into()),
            name: name.into(),
            kind,
            quantity: 1,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    #[must_use]
    pub fn with_uses(mut self, uses: UsesData) -> Self {
        self.uses = Some(uses);
        self
    }

    #[must_use]
    pub fn with_recharge(mut self, threshold: u32) -> Self {
        self.recharge = Some(RechargeData {
            value: threshold,
            charged: false,
        });
        self
    }

    #[must_use]
    pub fn with_class(mut self, class: ClassData) -> Self {
        self.class = Some(class);
        self
    }

    #[must_use]
    pub fn with_spell(mut self, spell: SpellData) -> Self {
        self.spell = Some(spell);
        self
    }

    #[must_use]
    pub fn with_scroll(mut self, scroll: SpellScroll) -> Self {
        self.scroll = Some(scroll);
        self
    }

    #[must_use]
    pub fn with_activity(mut self, activity: ActivityState) -> Self {
        self.activities.push(activity);
        self
    }

    pub fn activity(&self, id: &ActivityId) -> Option<&ActivityState> {
        self.activities.iter().find(|activity| &activity.id == id)
    }

    pub fn is_spell(&self) -> bool {
        self.spell.is_some()
    }

    /// Spell level, 0 for cantrips and non-spells.
    pub fn spell_level(&self) -> u8 {
        self.spell.map_or(0, |spell| spell.level)
    }

    pub fn auto_destroys(&self) -> bool {
        self.uses.as_ref().is_some_and(|uses| uses.auto_destroy)
    }

    /// Apply a field patch to this item.
    pub fn apply_patch(&mut self, patch: &ItemPatch) -> Result<(), PatchError> {
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(spent) = patch.uses_spent {
            self.uses
                .as_mut()
                .ok_or_else(|| missing(&self.id, "uses"))?
                .spent = spent;
        }
        if let Some(spent) = patch.hit_dice_spent {
            self.class
                .as_mut()
                .ok_or_else(|| missing(&self.id, "class"))?
                .hit_dice_spent = spent;
        }
        if let Some(charged) = patch.recharge_charged {
            self.recharge
                .as_mut()
                .ok_or_else(|| missing(&self.id, "recharge"))?
                .charged = charged;
        }
        for (activity_id, spent) in &patch.activity_uses_spent {
            let activity = self
                .activities
                .iter_mut()
                .find(|activity| &activity.id == activity_id)
                .ok_or_else(|| PatchError::UnknownActivity {
                    item: self.id.clone(),
                    activity: activity_id.clone(),
                })?;
            activity
                .uses
                .as_mut()
                .ok_or_else(|| missing(&self.id, "activity uses"))?
                .spent = *spent;
        }
        for (key, amount) in patch.currency.iter() {
            self.currency.set(key, amount);
        }
        Ok(())
    }
}

fn missing(item: &ItemId, field: &'static str) -> PatchError {
    PatchError::MissingField {
        item: item.clone(),
        field,
    }
}

/// Remaining quantity after spending `cost`, clamped at zero.
pub(crate) fn remaining_after(quantity: u32, cost: i64) -> u32 {
    to_count(i64::from(quantity) - cost)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_value_is_max_minus_spent() {
        assert_eq!(UsesData::new(2, 3).value(), 1);
        assert_eq!(UsesData::new(5, 3).value(), 0);
    }

    #[test]
    fn patch_updates_present_fields_only() {
        let mut item = ItemState::new("wand", "Wand", ItemKind::Equipment)
            .with_quantity(2)
            .with_uses(UsesData::new(0, 7));
        let mut patch = ItemPatch::new(item.id.clone());
        patch.uses_spent = Some(3);
        item.apply_patch(&patch).unwrap();

        assert_eq!(item.uses.as_ref().map(|u| u.spent), Some(3));
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn patching_missing_data_fails() {
        let mut item = ItemState::new("rope", "Rope", ItemKind::Loot);
        let mut patch = ItemPatch::new(item.id.clone());
        patch.hit_dice_spent = Some(1);
        assert_eq!(
            item.apply_patch(&patch),
            Err(PatchError::MissingField {
                item: item.id.clone(),
                field: "class",
            })
        );
    }

    #[test]
    fn remaining_quantity_never_goes_negative() {
        assert_eq!(remaining_after(3, 2), 1);
        assert_eq!(remaining_after(3, 5), 0);
        assert_eq!(remaining_after(3, -2), 5);
    }
}
