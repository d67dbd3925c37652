//! Currency and experience awards against stored actors.
//!
//! The split itself is computed by `ledger_core::award`; this service reads
//! balances from the repository and writes the results back, destinations
//! first and the origin last.

use std::sync::Arc;

use ledger_core::{
    ActorId, ActorPatch, ActorState, CurrencyAward, CurrencyBag, CurrencyHolder,
    ExperienceHolder, ItemId, ItemPatch, RulesConfig, XpAward,
};
use tracing::{debug, info};

use crate::api::{Result, RuntimeError};
use crate::repository::EntityRepository;

const XP_PATH: &str = "details.xp.value";

/// Something that holds currency: an actor or one of its items.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AwardTarget {
    Actor(ActorId),
    Item { actor: ActorId, item: ItemId },
}

impl AwardTarget {
    pub fn actor(id: impl Into<ActorId>) -> Self {
        Self::Actor(id.into())
    }

    pub fn item(actor: impl Into<ActorId>, item: impl Into<ItemId>) -> Self {
        Self::Item {
            actor: actor.into(),
            item: item.into(),
        }
    }

    fn owner(&self) -> &ActorId {
        match self {
            Self::Actor(actor) | Self::Item { actor, .. } => actor,
        }
    }
}

/// Reads balances, splits awards, and writes the new balances.
///
/// Each target is read once before the split. Listing the same target twice
/// credits it from the same starting balance, so the later write wins.
#[derive(Clone)]
pub struct AwardService {
    repository: Arc<dyn EntityRepository>,
    rules: Arc<RulesConfig>,
}

impl AwardService {
    pub fn new(repository: Arc<dyn EntityRepository>, rules: Arc<RulesConfig>) -> Self {
        Self { repository, rules }
    }

    /// Split `amounts` across `destinations`, optionally drawing from `origin`.
    pub async fn award_currency(
        &self,
        amounts: &CurrencyBag,
        destinations: &[AwardTarget],
        each: bool,
        origin: Option<&AwardTarget>,
    ) -> Result<CurrencyAward> {
        let mut bags = Vec::with_capacity(destinations.len());
        for target in destinations {
            bags.push(self.currency(target).await?);
        }
        let origin_bag = match origin {
            Some(target) => Some(self.currency(target).await?),
            None => None,
        };

        let holders: Vec<&dyn CurrencyHolder> =
            bags.iter().map(|bag| bag as &dyn CurrencyHolder).collect();
        let award = ledger_core::award_currency(
            amounts,
            &holders,
            each,
            origin_bag.as_ref().map(|bag| bag as &dyn CurrencyHolder),
        );

        for (target, balance) in destinations.iter().zip(&award.balances) {
            self.write_currency(target, balance).await?;
        }
        if let (Some(target), Some(balance)) = (origin, &award.origin) {
            self.write_currency(target, &awarded_keys(balance, amounts))
                .await?;
        }

        info!(
            target: "runtime::award",
            destinations = destinations.len(),
            each,
            from_origin = origin.is_some(),
            "Currency awarded"
        );
        Ok(award)
    }

    /// Move `amounts` out of `origin` into `destinations`.
    pub async fn transfer_currency(
        &self,
        origin: &AwardTarget,
        destinations: &[AwardTarget],
        amounts: &CurrencyBag,
    ) -> Result<CurrencyAward> {
        self.award_currency(amounts, destinations, false, Some(origin))
            .await
    }

    /// Re-issue the target's coins in the fewest pieces.
    pub async fn convert_currency(&self, target: &AwardTarget) -> Result<CurrencyBag> {
        let bag = self.currency(target).await?;
        let converted = ledger_core::convert_currency(&bag, &self.rules);
        self.write_currency(target, &converted).await?;
        debug!(target: "runtime::award", owner = %target.owner(), "Currency converted");
        Ok(converted)
    }

    /// Split `amount` experience across `destinations`, optionally drawing
    /// from `origin`. Actors whose kind does not track experience are skipped.
    pub async fn award_xp(
        &self,
        amount: i64,
        destinations: &[ActorId],
        each: bool,
        origin: Option<&ActorId>,
    ) -> Result<XpAward> {
        let mut actors: Vec<ActorState> = Vec::with_capacity(destinations.len());
        for id in destinations {
            actors.push(self.repository.actor(id).await?);
        }
        let origin_actor = match origin {
            Some(id) => Some(self.repository.actor(id).await?),
            None => None,
        };

        let holders: Vec<&dyn ExperienceHolder> = actors
            .iter()
            .map(|actor| actor as &dyn ExperienceHolder)
            .collect();
        let award = ledger_core::award_xp(
            amount,
            &holders,
            each,
            origin_actor.as_ref().map(|actor| actor as &dyn ExperienceHolder),
            &self.rules,
        );
        if award.balances.is_empty() {
            return Ok(award);
        }

        for &(index, xp) in &award.balances {
            self.repository
                .set_attribute(&destinations[index], XP_PATH, xp)
                .await?;
        }
        if let (Some(id), Some(xp)) = (origin, award.origin) {
            self.repository.set_attribute(id, XP_PATH, xp).await?;
        }

        info!(
            target: "runtime::award",
            credited = award.balances.len(),
            per_destination = award.per_destination,
            "Experience awarded"
        );
        Ok(award)
    }

    async fn currency(&self, target: &AwardTarget) -> Result<CurrencyBag> {
        Ok(match target {
            AwardTarget::Actor(actor) => self.repository.actor(actor).await?.currency,
            AwardTarget::Item { actor, item } => self.repository.item(actor, item).await?.currency,
        })
    }

    async fn write_currency(&self, target: &AwardTarget, bag: &CurrencyBag) -> Result<()> {
        if bag.iter().next().is_none() {
            return Ok(());
        }
        match target {
            AwardTarget::Actor(actor) => self
                .repository
                .update_actor(actor, &ActorPatch::currency(bag))
                .await
                .map_err(RuntimeError::from),
            AwardTarget::Item { actor, item } => {
                let patch = ItemPatch {
                    currency: bag.clone(),
                    ..ItemPatch::new(item.clone())
                };
                self.repository
                    .update_item(actor, &patch)
                    .await
                    .map_err(RuntimeError::from)
            }
        }
    }
}

/// The denominations of `balance` that `amounts` touched.
fn awarded_keys(balance: &CurrencyBag, amounts: &CurrencyBag) -> CurrencyBag {
    amounts
        .iter()
        .filter(|&(key, amount)| amount != 0 && balance.contains(key))
        .fold(CurrencyBag::new(), |bag, (key, _)| {
            bag.with(key, balance.get(key))
        })
}
