//! Logs a one-line summary of every completed use.

use tracing::info;

use super::{HookCriticality, HookError, UsageHook, UsageHookContext};
use crate::usage::UsageReport;

/// Post-use hook that records what a use consumed.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsageSummaryHook;

impl UsageHook for UsageSummaryHook {
    fn name(&self) -> &'static str {
        "usage_summary"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn criticality(&self) -> HookCriticality {
        HookCriticality::Optional
    }

    fn post_use(&self, ctx: &UsageHookContext<'_>, report: &UsageReport) -> Result<(), HookError> {
        let updates = &report.updates;
        info!(
            target: "runtime::hooks",
            actor = %ctx.actor.id,
            item = %ctx.item.id,
            activity = %ctx.activity.id,
            actor_fields = updates.actor.len(),
            item_patches = updates.items.len(),
            deleted = updates.delete.len(),
            rolls = updates.rolls.len(),
            warnings = report.warnings.len(),
            scaling = report.config.scaling.unwrap_or(0),
            template = report.config.create_template,
            "Activity used"
        );
        Ok(())
    }
}
