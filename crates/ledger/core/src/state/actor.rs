//! Actors: characters, NPCs, groups, and vehicles with their owned items.

use std::collections::BTreeMap;
use std::fmt;

use crate::dice::RollData;

use super::{ActorPatch, ItemId, ItemPatch, ItemState, PatchError, SpellSlots, to_count};

/// Actor identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ActorId(pub String);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Actor category.
///
/// Only some kinds track experience; see `RulesConfig::experience_kinds`.
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
pub enum ActorKind {
    #[default]
    Character,
    Npc,
    Group,
    Vehicle,
}

// ============================================================================
// Currency
// ============================================================================

/// Coins held per denomination key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CurrencyBag {
    coins: BTreeMap<String, i64>,
}

impl CurrencyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coins of `key`; denominations never seen count as zero.
    pub fn get(&self, key: &str) -> i64 {
        self.coins.get(key).copied().unwrap_or(0)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.coins.contains_key(key)
    }

    pub fn set(&mut self, key: impl Into<String>, amount: i64) {
        self.coins.insert(key.into(), amount);
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, amount: i64) -> Self {
        self.set(key, amount);
        self
    }

    pub fn add(&mut self, key: &str, amount: i64) {
        let current = self.get(key);
        self.set(key, current.saturating_add(amount));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.coins.iter().map(|(key, amount)| (key.as_str(), *amount))
    }

    /// True if every denomination is zero.
    pub fn is_empty(&self) -> bool {
        self.coins.values().all(|&amount| amount == 0)
    }
}

impl<K: Into<String>> FromIterator<(K, i64)> for CurrencyBag {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        Self {
            coins: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

// ============================================================================
// Actor State
// ============================================================================

/// An actor and the items it owns.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ActorState {
    pub id: ActorId,
    pub name: String,
    pub kind: ActorKind,
    pub currency: CurrencyBag,
    /// `details.xp.value`
    pub xp: i64,
    pub spells: SpellSlots,
    /// Free-form numeric attributes keyed by dotted path (`attributes.hp.value`,
    /// `resources.primary.spent`, ...).
    ///
    /// A `.value` path that is absent but has stored `.max` and `.spent` siblings
    /// is derived as `max - spent`.
    pub attributes: BTreeMap<String, i64>,
    pub items: Vec<ItemState>,
}

impl ActorState {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ActorKind) -> Self {
        Self {
            id: ActorId(id.into()),
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, path: impl Into<String>, value: i64) -> Self {
        self.attributes.insert(path.into(), value);
        self
    }

    #[must_use]
    pub fn with_item(mut self, item: ItemState) -> Self {
        self.items.push(item);
        self
    }

    pub fn item(&self, id: &ItemId) -> Option<&ItemState> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn item_mut(&mut self, id: &ItemId) -> Option<&mut ItemState> {
        self.items.iter_mut().find(|item| &item.id == id)
    }

    /// Items carrying class data, in owned order.
    pub fn classes(&self) -> impl Iterator<Item = &ItemState> {
        self.items.iter().filter(|item| item.class.is_some())
    }

    /// Total character level across classes.
    pub fn level(&self) -> u32 {
        self.classes()
            .filter_map(|item| item.class.as_ref())
            .map(|class| class.levels)
            .sum()
    }

    /// Remaining hit dice, optionally restricted to one die size.
    pub fn hit_dice_available(&self, faces: Option<u32>) -> i64 {
        self.classes()
            .filter_map(|item| item.class.as_ref())
            .filter(|class| faces.is_none_or(|f| class.hit_die == f))
            .map(|class| i64::from(class.available()))
            .sum()
    }

    // ------------------------------------------------------------------------
    // Attribute paths
    // ------------------------------------------------------------------------

    /// Current numeric value at a dotted attribute path.
    ///
    /// `currency.<key>`, `spells.<slot>.(value|max|level)`, and `details.xp.value`
    /// route to the typed fields; everything else reads the attribute map.
    pub fn attribute(&self, path: &str) -> Option<i64> {
        if let Some(key) = path.strip_prefix("currency.") {
            return self.currency.contains(key).then(|| self.currency.get(key));
        }
        if let Some(rest) = path.strip_prefix("spells.") {
            let (slot, field) = rest.split_once('.')?;
            let pool = self.spells.get(slot)?;
            return match field {
                "value" => Some(i64::from(pool.value)),
                "max" => Some(i64::from(pool.max)),
                "level" => Some(i64::from(pool.level)),
                _ => None,
            };
        }
        if path == "details.xp.value" {
            return Some(self.xp);
        }
        if let Some(value) = self.attributes.get(path) {
            return Some(*value);
        }
        let prefix = path.strip_suffix(".value")?;
        let max = self.attributes.get(&format!("{prefix}.max"))?;
        let spent = self.attributes.get(&format!("{prefix}.spent"))?;
        Some(max - spent)
    }

    /// True if `path` is a derived `.value` whose stored counterpart is `.spent`.
    pub fn is_spent_counter(&self, path: &str) -> bool {
        path.strip_suffix(".value").is_some_and(|prefix| {
            !self.attributes.contains_key(path)
                && self.attributes.contains_key(&format!("{prefix}.spent"))
        })
    }

    /// True if [`ActorState::set_attribute`] accepts `path`.
    pub fn is_writable(&self, path: &str) -> bool {
        if path.starts_with("currency.") || path == "details.xp.value" {
            return true;
        }
        if let Some(rest) = path.strip_prefix("spells.") {
            return matches!(rest.split_once('.'), Some((slot, "value")) if self.spells.contains(slot));
        }
        self.attributes.contains_key(path)
    }

    /// Every path [`ActorState::attribute`] can resolve, in a stable order.
    pub fn attribute_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.attributes.keys().cloned().collect();
        for key in self.attributes.keys() {
            if let Some(prefix) = key.strip_suffix(".spent") {
                let value = format!("{prefix}.value");
                if self.attribute(&value).is_some() && !paths.contains(&value) {
                    paths.push(value);
                }
            }
        }
        paths.extend(self.currency.iter().map(|(key, _)| format!("currency.{key}")));
        paths.extend(self.spells.iter().map(|(slot, _)| format!("spells.{slot}.value")));
        paths.push("details.xp.value".to_string());
        paths.sort();
        paths
    }

    /// Write a value at a dotted attribute path.
    pub fn set_attribute(&mut self, path: &str, value: i64) -> Result<(), PatchError> {
        if let Some(key) = path.strip_prefix("currency.") {
            self.currency.set(key, value);
            return Ok(());
        }
        if let Some(rest) = path.strip_prefix("spells.") {
            let Some((slot, "value")) = rest.split_once('.') else {
                return Err(PatchError::UnknownAttribute(path.to_string()));
            };
            if value < 0 {
                return Err(PatchError::NegativeValue {
                    path: path.to_string(),
                    value,
                });
            }
            let pool = self
                .spells
                .get_mut(slot)
                .ok_or_else(|| PatchError::UnknownSpellSlot(slot.to_string()))?;
            pool.value = to_count(value);
            return Ok(());
        }
        if path == "details.xp.value" {
            self.xp = value;
            return Ok(());
        }
        match self.attributes.get_mut(path) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(PatchError::UnknownAttribute(path.to_string())),
        }
    }

    /// Apply an actor patch produced by a use or an award.
    pub fn apply_changes(&mut self, patch: &ActorPatch) -> Result<(), PatchError> {
        for (path, value) in patch.iter() {
            self.set_attribute(path, value)?;
        }
        Ok(())
    }

    /// Apply a patch to one owned item.
    pub fn apply_item_patch(&mut self, patch: &ItemPatch) -> Result<(), PatchError> {
        self.item_mut(&patch.id)
            .ok_or_else(|| PatchError::UnknownItem(patch.id.clone()))?
            .apply_patch(patch)
    }

    /// Remove an owned item, returning it.
    pub fn remove_item(&mut self, id: &ItemId) -> Result<ItemState, PatchError> {
        let index = self
            .items
            .iter()
            .position(|item| &item.id == id)
            .ok_or_else(|| PatchError::UnknownItem(id.clone()))?;
        Ok(self.items.remove(index))
    }

    /// Values formulas may reference with `@path`.
    pub fn roll_data(&self) -> RollData {
        let mut data: RollData = self
            .attribute_paths()
            .into_iter()
            .filter_map(|path| self.attribute(&path).map(|value| (path, value)))
            .collect();
        for (slot, pool) in self.spells.iter() {
            data.insert(format!("spells.{slot}.max"), i64::from(pool.max));
            data.insert(format!("spells.{slot}.level"), i64::from(pool.level));
        }
        data.insert("details.level", i64::from(self.level()));
        data
    }
}
