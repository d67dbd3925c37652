//! Activity use orchestration.
//!
//! [`UsageOrchestrator`] drives one use from configuration to committed
//! writes:
//!
//! 1. derive the [`UsageConfiguration`] and run pre-use hooks
//! 2. dry-run the consumption and surface warnings
//! 3. confirm with the [`ConfirmationPrompt`] when the use has choices, then
//!    clamp the confirmed scaling
//! 4. settle scaling and compute the real updates (first failure aborts)
//! 5. run consumption hooks, then write the plan in order
//! 6. run post-use hooks
//!
//! Nothing is written before step 5. Writes are independent: a failing write
//! leaves the earlier ones in place.

use std::sync::Arc;

use ledger_core::{
    ActivityId, ActivityState, ActorId, ActorState, ConsumptionContext, ConsumptionHint,
    ConsumptionWarning, EvaluationMode, ItemId, ItemState, PcgDice, RulesConfig, ScriptedDice,
    UsageConfiguration, UsagePlanner, UsageRequest, UsageUpdates, UsageWrite, bound_usage_scaling,
    prepare_usage_config, prepare_usage_scaling, requires_configuration,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::{
    ConfirmationPrompt, NotificationSink, PromptDecision, PromptRequest, Result, RuntimeError,
};
use crate::hooks::{UsageHookContext, UsageHookRegistry};
use crate::repository::EntityRepository;
use crate::runtime::RuntimeConfig;

/// What a completed use did.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageReport {
    /// Configuration the use was committed with.
    pub config: UsageConfiguration,
    /// Changes that were written.
    pub updates: UsageUpdates,
    /// Problems the dry run found before the invoker confirmed.
    pub warnings: Vec<ConsumptionWarning>,
}

/// Why a use stopped without writing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The confirmation prompt was dismissed.
    Prompt,
    /// A hook vetoed the use.
    Hook(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UsageOutcome {
    Completed(UsageReport),
    Cancelled(CancelReason),
}

impl UsageOutcome {
    pub fn report(&self) -> Option<&UsageReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Cancelled(_) => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Drives activity uses against a repository.
#[derive(Clone)]
pub struct UsageOrchestrator {
    repository: Arc<dyn EntityRepository>,
    rules: Arc<RulesConfig>,
    prompt: Option<Arc<dyn ConfirmationPrompt>>,
    notifier: Arc<dyn NotificationSink>,
    hooks: UsageHookRegistry,
    dice: Arc<Mutex<PcgDice>>,
    config: RuntimeConfig,
}

impl UsageOrchestrator {
    pub(crate) fn new(
        repository: Arc<dyn EntityRepository>,
        rules: Arc<RulesConfig>,
        prompt: Option<Arc<dyn ConfirmationPrompt>>,
        notifier: Arc<dyn NotificationSink>,
        hooks: UsageHookRegistry,
        dice: Arc<Mutex<PcgDice>>,
        config: RuntimeConfig,
    ) -> Self {
        Self {
            repository,
            rules,
            prompt,
            notifier,
            hooks,
            dice,
            config,
        }
    }

    /// Use `activity` of `item` owned by `actor`.
    ///
    /// Returns [`UsageOutcome::Cancelled`] when the prompt or a hook stops the
    /// use, and [`RuntimeError::Consumption`] when the actor cannot pay. In
    /// both cases nothing is written.
    pub async fn use_activity(
        &self,
        actor_id: &ActorId,
        item_id: &ItemId,
        activity_id: &ActivityId,
        request: &UsageRequest,
    ) -> Result<UsageOutcome> {
        let actor = self.repository.actor(actor_id).await?;
        let (item, activity) = resolve(&actor, item_id, activity_id)?;
        let ctx = UsageHookContext {
            rules: &self.rules,
            actor: &actor,
            item,
            activity,
        };

        debug!(
            target: "runtime::usage",
            actor = %actor_id,
            item = %item_id,
            activity = %activity_id,
            "Starting activity use"
        );

        let mut config = prepare_usage_config(&self.rules, &actor, item, activity, request)?;
        if let Some(hook) = self.hooks.pre_use(&ctx, &mut config) {
            return Ok(UsageOutcome::Cancelled(CancelReason::Hook(hook)));
        }

        let planner = UsagePlanner::new(&self.rules);
        let dry_run = planner.dry_run(&actor, item, activity, &config)?;
        if self.config.notify_warnings {
            for warning in &dry_run.warnings {
                self.notifier.consumption_warning(&actor, item, warning).await;
            }
        }

        if let Some(prompt) = self.prompt.as_ref().filter(|_| self.config.prompt) {
            if requires_configuration(&config) {
                let request = PromptRequest {
                    actor: &actor,
                    item,
                    activity,
                    config: &config,
                    warnings: &dry_run.warnings,
                };
                match prompt.confirm(request).await {
                    PromptDecision::Confirm(confirmed) => {
                        config = confirmed;
                        let chosen = config.scaling;
                        bound_usage_scaling(&self.rules, &actor, item, activity, &mut config)?;
                        if config.scaling != chosen {
                            debug!(
                                target: "runtime::usage",
                                chosen = ?chosen,
                                allowed = ?config.scaling,
                                "Clamped confirmed scaling"
                            );
                        }
                    }
                    PromptDecision::Cancel => {
                        info!(
                            target: "runtime::usage",
                            actor = %actor_id,
                            item = %item_id,
                            "Use cancelled at confirmation"
                        );
                        return Ok(UsageOutcome::Cancelled(CancelReason::Prompt));
                    }
                }
            }
        }

        prepare_usage_scaling(&mut config, &actor, item);

        let computed = {
            let mut dice = self.dice.lock().await;
            planner.compute_updates(&actor, item, activity, &config, &mut *dice)
        };
        let mut updates = match computed.map_err(RuntimeError::from) {
            Ok(updates) => updates,
            Err(RuntimeError::Consumption(error)) => {
                self.notifier.consumption_failed(&actor, item, &error).await;
                return Err(RuntimeError::Consumption(error));
            }
            Err(err) => return Err(err),
        };

        if let Some(hook) = self.hooks.consume(&ctx, &config, &mut updates) {
            return Ok(UsageOutcome::Cancelled(CancelReason::Hook(hook)));
        }

        for write in updates.write_plan(item_id) {
            self.apply(actor_id, &write).await?;
        }

        let report = UsageReport {
            config,
            updates,
            warnings: dry_run.warnings,
        };
        self.hooks.post_use(&ctx, &report);
        Ok(UsageOutcome::Completed(report))
    }

    /// Cost hints for every consumption target of an activity, in target order.
    pub async fn consumption_hints(
        &self,
        actor_id: &ActorId,
        item_id: &ItemId,
        activity_id: &ActivityId,
        request: &UsageRequest,
    ) -> Result<Vec<ConsumptionHint>> {
        let actor = self.repository.actor(actor_id).await?;
        let (item, activity) = resolve(&actor, item_id, activity_id)?;
        let config = prepare_usage_config(&self.rules, &actor, item, activity, request)?;

        let mut dice = ScriptedDice::default();
        let ctx = ConsumptionContext::new(
            &self.rules,
            &actor,
            item,
            activity,
            EvaluationMode::Deterministic,
            &mut dice,
        );
        let hints = activity
            .consumption
            .targets
            .iter()
            .map(|target| target.hint(&config, &ctx))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(hints)
    }

    async fn apply(&self, actor: &ActorId, write: &UsageWrite) -> Result<()> {
        let outcome = match write {
            UsageWrite::ActingItem(patch) => {
                debug!(
                    target: "runtime::usage",
                    actor = %actor,
                    item = %patch.id,
                    "Writing acting item"
                );
                self.repository.update_item(actor, patch).await
            }
            UsageWrite::DeleteItems(items) => {
                debug!(
                    target: "runtime::usage",
                    actor = %actor,
                    count = items.len(),
                    "Deleting exhausted items"
                );
                self.repository.delete_items(actor, items).await
            }
            UsageWrite::Actor(patch) => {
                debug!(
                    target: "runtime::usage",
                    actor = %actor,
                    fields = patch.len(),
                    "Writing actor attributes"
                );
                self.repository.update_actor(actor, patch).await
            }
            UsageWrite::OtherItems(patches) => {
                debug!(
                    target: "runtime::usage",
                    actor = %actor,
                    count = patches.len(),
                    "Writing consumed items"
                );
                self.repository.update_items(actor, patches).await
            }
        };
        outcome.map_err(|err| {
            warn!(
                target: "runtime::usage",
                actor = %actor,
                error = %err,
                "Write failed, earlier writes are kept"
            );
            RuntimeError::from(err)
        })
    }
}

fn resolve<'a>(
    actor: &'a ActorState,
    item_id: &ItemId,
    activity_id: &ActivityId,
) -> Result<(&'a ItemState, &'a ActivityState)> {
    let item = actor.item(item_id).ok_or_else(|| RuntimeError::UnknownItem {
        actor: actor.id.clone(),
        item: item_id.clone(),
    })?;
    let activity = item
        .activity(activity_id)
        .ok_or_else(|| RuntimeError::UnknownActivity {
            item: item_id.clone(),
            activity: activity_id.clone(),
        })?;
    Ok((item, activity))
}
