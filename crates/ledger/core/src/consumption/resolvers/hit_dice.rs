use crate::consumption::{
    ConsumptionContext, ConsumptionError, ConsumptionTarget, ConsumptionType, MissingResource,
    ResolveError, UsageUpdates,
};
use crate::state::{ClassData, ItemState, to_count};
use crate::usage::UsageConfiguration;

use super::{missing, unset};

/// Which classes a hit dice target draws from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::consumption) enum HitDieSelector {
    Smallest,
    Largest,
    Faces(u32),
}

impl HitDieSelector {
    pub(in crate::consumption) fn parse(target: &str) -> Option<Self> {
        match target.trim() {
            "smallest" => Some(Self::Smallest),
            "largest" => Some(Self::Largest),
            other => other
                .strip_prefix(['d', 'D'])
                .and_then(|faces| faces.parse().ok())
                .map(Self::Faces),
        }
    }

    /// Matching classes in consumption order.
    pub(in crate::consumption) fn classes<'a>(
        self,
        ctx: &ConsumptionContext<'a>,
    ) -> Vec<(&'a ItemState, ClassData)> {
        let actor = ctx.actor;
        let mut classes: Vec<_> = actor
            .classes()
            .filter_map(|item| item.class.map(|class| (item, class)))
            .filter(|(_, class)| match self {
                Self::Faces(faces) => class.hit_die == faces,
                Self::Smallest | Self::Largest => true,
            })
            .collect();
        match self {
            Self::Smallest => classes.sort_by_key(|(_, class)| class.hit_die),
            Self::Largest => classes.sort_by_key(|(_, class)| std::cmp::Reverse(class.hit_die)),
            Self::Faces(_) => {}
        }
        classes
    }
}

pub(in crate::consumption) fn consume(
    target: &ConsumptionTarget,
    config: &UsageConfiguration,
    ctx: &mut ConsumptionContext<'_>,
    updates: &mut UsageUpdates,
) -> Result<(), ResolveError> {
    let Some(selector) = HitDieSelector::parse(&target.target) else {
        return Err(unset(ConsumptionType::HitDice).into());
    };
    let cost = target.resolve_cost(config, ctx, &mut updates.rolls)?.total;

    let classes: Vec<(&ItemState, u32, u32)> = selector
        .classes(ctx)
        .into_iter()
        .map(|(item, class)| (item, class.levels, pending_spent(item, &class, updates)))
        .collect();
    if classes.is_empty() {
        return Err(missing(MissingResource::HitDice, ConsumptionType::HitDice, &target.target, cost).into());
    }
    let total: i64 = classes
        .iter()
        .map(|(_, levels, spent)| i64::from(levels.saturating_sub(*spent)))
        .sum();
    ConsumptionError::check(ConsumptionType::HitDice, &target.target, cost, total)?;

    let mut remaining = cost;
    for (item, levels, spent) in classes {
        if remaining == 0 {
            break;
        }
        let delta = if remaining > 0 {
            remaining.min(i64::from(levels.saturating_sub(spent)))
        } else {
            remaining.max(-i64::from(spent))
        };
        if delta != 0 {
            updates.item_patch_mut(&item.id).hit_dice_spent =
                Some(to_count(i64::from(spent) + delta));
            remaining -= delta;
        }
    }
    Ok(())
}

fn pending_spent(item: &ItemState, class: &ClassData, updates: &UsageUpdates) -> u32 {
    updates
        .item_patch(&item.id)
        .and_then(|patch| patch.hit_dice_spent)
        .unwrap_or(class.hit_dice_spent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::consumption::ConsumptionErrorKind;
    use crate::dice::{EvaluationMode, ScriptedDice};
    use crate::state::{ActivityState, ActorKind, ActorState, ItemId, ItemKind};

    fn actor() -> ActorState {
        ActorState::new("a", "A", ActorKind::Character)
            .with_item(
                ItemState::new("fighter", "Fighter", ItemKind::Class)
                    .with_class(ClassData::new(2, 10, 0)),
            )
            .with_item(
                ItemState::new("rogue", "Rogue", ItemKind::Class).with_class(ClassData::new(3, 8, 1)),
            )
    }

    fn run(
        actor: &ActorState,
        target: &ConsumptionTarget,
        updates: &mut UsageUpdates,
    ) -> Result<(), ResolveError> {
        let rules = RulesConfig::default();
        let item = ItemState::new("feat", "Second Wind", ItemKind::Feat);
        let activity = ActivityState::new("heal", "Heal");
        let mut dice = ScriptedDice::default();
        let mut ctx = ConsumptionContext::new(
            &rules,
            actor,
            &item,
            &activity,
            EvaluationMode::Stochastic,
            &mut dice,
        );
        target.consume(&UsageConfiguration::default(), &mut ctx, updates)
    }

    fn spent(updates: &UsageUpdates, id: &str) -> Option<u32> {
        updates
            .item_patch(&ItemId::new(id))
            .and_then(|patch| patch.hit_dice_spent)
    }

    #[test]
    fn smallest_drains_smaller_die_first() {
        let target = ConsumptionTarget::new(ConsumptionType::HitDice, "smallest", "3");
        let mut updates = UsageUpdates::new();
        run(&actor(), &target, &mut updates).unwrap();
        assert_eq!(spent(&updates, "rogue"), Some(3));
        assert_eq!(spent(&updates, "fighter"), Some(1));
    }

    #[test]
    fn largest_drains_larger_die_first() {
        let target = ConsumptionTarget::new(ConsumptionType::HitDice, "largest", "1");
        let mut updates = UsageUpdates::new();
        run(&actor(), &target, &mut updates).unwrap();
        assert_eq!(spent(&updates, "fighter"), Some(1));
        assert_eq!(spent(&updates, "rogue"), None);
    }

    #[test]
    fn denomination_restricts_classes() {
        let target = ConsumptionTarget::new(ConsumptionType::HitDice, "d8", "3");
        let err = run(&actor(), &target, &mut UsageUpdates::new()).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Consumption(ConsumptionError {
                kind: ConsumptionErrorKind::NotEnough,
                available: 2,
                ..
            })
        ));

        let target = ConsumptionTarget::new(ConsumptionType::HitDice, "d12", "1");
        let err = run(&actor(), &target, &mut UsageUpdates::new()).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Consumption(ConsumptionError {
                kind: ConsumptionErrorKind::MissingResource(MissingResource::HitDice),
                ..
            })
        ));
    }

    #[test]
    fn negative_cost_recovers_spent_dice() {
        let target = ConsumptionTarget::new(ConsumptionType::HitDice, "smallest", "-2");
        let mut updates = UsageUpdates::new();
        run(&actor(), &target, &mut updates).unwrap();
        assert_eq!(spent(&updates, "rogue"), Some(0));
        assert_eq!(spent(&updates, "fighter"), None);
    }

    #[test]
    fn unset_target_is_rejected() {
        let target = ConsumptionTarget::new(ConsumptionType::HitDice, "", "1");
        let err = run(&actor(), &target, &mut UsageUpdates::new()).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Consumption(ConsumptionError {
                kind: ConsumptionErrorKind::ResourceUnset,
                ..
            })
        ));
    }
}
