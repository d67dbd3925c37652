use crate::consumption::{
    ConsumptionContext, ConsumptionError, ConsumptionTarget, ConsumptionType, MissingResource,
    ResolveError, UsageUpdates,
};
use crate::usage::UsageConfiguration;

use super::{missing, unset};

pub(in crate::consumption) fn consume(
    target: &ConsumptionTarget,
    config: &UsageConfiguration,
    ctx: &mut ConsumptionContext<'_>,
    updates: &mut UsageUpdates,
) -> Result<(), ResolveError> {
    let cost = target.resolve_cost(config, ctx, &mut updates.rolls)?.total;
    let path = target.target.trim();
    if path.is_empty() {
        return Err(unset(ConsumptionType::Attribute).into());
    }

    let spent_path = spent_path(ctx, path);
    let writable = ctx.actor.is_writable(spent_path.as_deref().unwrap_or(path));
    let Some(current) = current_value(ctx, updates, path).filter(|_| writable) else {
        return Err(missing(MissingResource::Attribute, ConsumptionType::Attribute, path, cost).into());
    };
    ConsumptionError::check(ConsumptionType::Attribute, path, cost, current)?;

    match spent_path {
        Some(spent_path) => {
            let spent = pending(ctx, updates, &spent_path).unwrap_or(0);
            updates.actor.set(spent_path, spent + cost);
        }
        None => updates.actor.set(path, current - cost),
    }
    Ok(())
}

/// Current value of `path`, reading pending changes first.
pub(in crate::consumption) fn current_value(
    ctx: &ConsumptionContext<'_>,
    updates: &UsageUpdates,
    path: &str,
) -> Option<i64> {
    if let Some(spent_path) = spent_path(ctx, path) {
        if let Some(spent) = updates.actor.get(&spent_path) {
            let prefix = path.strip_suffix(".value")?;
            let max = ctx.actor.attribute(&format!("{prefix}.max"))?;
            return Some(max - spent);
        }
    }
    pending(ctx, updates, path)
}

fn pending(ctx: &ConsumptionContext<'_>, updates: &UsageUpdates, path: &str) -> Option<i64> {
    updates.actor.get(path).or_else(|| ctx.actor.attribute(path))
}

/// `.spent` sibling to write instead of a derived `.value`.
fn spent_path(ctx: &ConsumptionContext<'_>, path: &str) -> Option<String> {
    if !ctx.actor.is_spent_counter(path) {
        return None;
    }
    path.strip_suffix(".value")
        .map(|prefix| format!("{prefix}.spent"))
}
