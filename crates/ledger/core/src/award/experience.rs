use crate::config::RulesConfig;

use super::ExperienceHolder;

/// Result of an experience award.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct XpAward {
    pub per_destination: i64,
    /// `(destination index, new experience)` for every credited destination.
    pub balances: Vec<(usize, i64)>,
    /// New experience of the origin, when there is one.
    pub origin: Option<i64>,
}

impl XpAward {
    pub fn total(&self) -> i64 {
        self.per_destination * self.balances.len() as i64
    }
}

/// Award `amount` experience split evenly across eligible destinations.
///
/// Only actor kinds that track experience are credited. The origin, if any,
/// bounds the total and loses exactly what was handed out.
pub fn award_xp(
    amount: i64,
    destinations: &[&dyn ExperienceHolder],
    each: bool,
    origin: Option<&dyn ExperienceHolder>,
    rules: &RulesConfig,
) -> XpAward {
    let eligible: Vec<usize> = destinations
        .iter()
        .enumerate()
        .filter(|(_, destination)| rules.tracks_experience(destination.experience_kind()))
        .map(|(index, _)| index)
        .collect();
    let origin_xp = origin.map(|origin| origin.experience());
    if amount == 0 || eligible.is_empty() {
        return XpAward {
            origin: origin_xp,
            ..XpAward::default()
        };
    }

    let count = eligible.len() as i64;
    let mut total = if each { amount.saturating_mul(count) } else { amount };
    if let Some(available) = origin_xp {
        total = total.min(available);
    }
    let per_destination = total.div_euclid(count);

    XpAward {
        per_destination,
        balances: eligible
            .into_iter()
            .map(|index| (index, destinations[index].experience() + per_destination))
            .collect(),
        origin: origin_xp.map(|xp| xp - per_destination * count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ActorKind, ActorState};

    fn actor(kind: ActorKind, xp: i64) -> ActorState {
        let mut actor = ActorState::new("a", "A", kind);
        actor.xp = xp;
        actor
    }

    #[test]
    fn xp_skips_kinds_without_experience() {
        let rules = RulesConfig::default();
        let hero = actor(ActorKind::Character, 100);
        let wolf = actor(ActorKind::Npc, 0);
        let party = actor(ActorKind::Group, 0);
        let award = award_xp(301, &[&hero, &wolf, &party], false, None, &rules);

        assert_eq!(award.per_destination, 150);
        assert_eq!(award.balances, vec![(0, 250), (2, 150)]);
        assert_eq!(award.total(), 300);
    }

    #[test]
    fn each_multiplies_before_the_origin_bound() {
        let rules = RulesConfig::default();
        let (a, b) = (actor(ActorKind::Character, 0), actor(ActorKind::Character, 0));
        let pool = actor(ActorKind::Group, 150);
        let award = award_xp(100, &[&a, &b], true, Some(&pool), &rules);

        assert_eq!(award.per_destination, 75);
        assert_eq!(award.origin, Some(0));
    }

    #[test]
    fn zero_amount_is_skipped() {
        let rules = RulesConfig::default();
        let hero = actor(ActorKind::Character, 10);
        let award = award_xp(0, &[&hero], false, None, &rules);
        assert!(award.balances.is_empty());
        assert_eq!(award.per_destination, 0);
    }
}
