//! Patch vocabulary shared by usage updates, awards, and repositories.

use std::collections::BTreeMap;

use super::{ActivityId, CurrencyBag, ItemId};

/// New values for actor attribute paths.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ActorPatch {
    values: BTreeMap<String, i64>,
}

impl ActorPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, path: impl Into<String>, value: i64) {
        self.values.insert(path.into(), value);
    }

    pub fn get(&self, path: &str) -> Option<i64> {
        self.values.get(path).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.values.iter().map(|(path, value)| (path.as_str(), *value))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Later values win.
    pub fn merge(&mut self, other: ActorPatch) {
        self.values.extend(other.values);
    }

    /// Patch writing every denomination of `bag` under `currency.`.
    pub fn currency(bag: &CurrencyBag) -> Self {
        bag.iter()
            .map(|(key, amount)| (format!("currency.{key}"), amount))
            .collect()
    }
}

impl FromIterator<(String, i64)> for ActorPatch {
    fn from_iter<I: IntoIterator<Item = (String, i64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Field changes for one item. `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ItemPatch {
    pub id: ItemId,
    pub quantity: Option<u32>,
    pub uses_spent: Option<u32>,
    pub hit_dice_spent: Option<u32>,
    pub recharge_charged: Option<bool>,
    /// `activities.<id>.uses.spent`
    pub activity_uses_spent: BTreeMap<ActivityId, u32>,
    pub currency: CurrencyBag,
}

impl ItemPatch {
    pub fn new(id: ItemId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.quantity.is_none()
            && self.uses_spent.is_none()
            && self.hit_dice_spent.is_none()
            && self.recharge_charged.is_none()
            && self.activity_uses_spent.is_empty()
            && self.currency.iter().next().is_none()
    }

    /// Overlay `other` onto this patch; fields set in `other` win.
    pub fn merge(&mut self, other: ItemPatch) {
        self.quantity = other.quantity.or(self.quantity);
        self.uses_spent = other.uses_spent.or(self.uses_spent);
        self.hit_dice_spent = other.hit_dice_spent.or(self.hit_dice_spent);
        self.recharge_charged = other.recharge_charged.or(self.recharge_charged);
        self.activity_uses_spent.extend(other.activity_uses_spent);
        for (key, amount) in other.currency.iter() {
            self.currency.set(key, amount);
        }
    }
}
