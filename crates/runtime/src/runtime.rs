//! High-level runtime facade.
//!
//! The runtime owns the shared collaborators (repository, rules, dice, hooks)
//! and exposes a builder-based API for hosts that drive activity uses and
//! awards.

use std::sync::Arc;

use ledger_content::{ContentFactory, LoadResult};
use ledger_core::{
    ActivityId, ActorId, ConsumptionHint, ItemId, PcgDice, RechargeOutcome, RulesConfig,
    UsageRequest, roll_recharge,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use crate::api::{ConfirmationPrompt, NotificationSink, Result, RuntimeError, TracingNotifier};
use crate::award::AwardService;
use crate::hooks::{UsageHook, UsageHookRegistry, UsageSummaryHook};
use crate::repository::{EntityRepository, InMemoryRepository};
use crate::usage::{UsageOrchestrator, UsageOutcome};

/// Runtime configuration shared across the orchestrator and services.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Seed for the runtime's dice roller.
    pub seed: u64,
    /// Ask the confirmation prompt before committing uses that have choices.
    pub prompt: bool,
    /// Forward dry-run warnings to the notification sink.
    pub notify_warnings: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            prompt: true,
            notify_warnings: true,
        }
    }
}

/// Main runtime that resolves activity uses and awards.
///
/// Cheap to clone; clones share the repository and dice stream.
#[derive(Clone)]
pub struct LedgerRuntime {
    usage: UsageOrchestrator,
    awards: AwardService,
    repository: Arc<dyn EntityRepository>,
    rules: Arc<RulesConfig>,
    dice: Arc<Mutex<PcgDice>>,
}

impl LedgerRuntime {
    /// Create a new runtime builder
    pub fn builder() -> LedgerRuntimeBuilder {
        LedgerRuntimeBuilder::new()
    }

    /// Use an activity. See [`UsageOrchestrator::use_activity`].
    pub async fn use_activity(
        &self,
        actor: &ActorId,
        item: &ItemId,
        activity: &ActivityId,
        request: &UsageRequest,
    ) -> Result<UsageOutcome> {
        self.usage
            .use_activity(actor, item, activity, request)
            .await
    }

    /// Cost hints for an activity's consumption targets.
    pub async fn consumption_hints(
        &self,
        actor: &ActorId,
        item: &ItemId,
        activity: &ActivityId,
        request: &UsageRequest,
    ) -> Result<Vec<ConsumptionHint>> {
        self.usage
            .consumption_hints(actor, item, activity, request)
            .await
    }

    /// Roll recharge for an item and store the result when it recharged.
    ///
    /// Returns `None` when the item has no recharge threshold or is already
    /// charged.
    pub async fn roll_recharge(
        &self,
        actor: &ActorId,
        item: &ItemId,
    ) -> Result<Option<RechargeOutcome>> {
        let state = self.repository.item(actor, item).await?;
        let outcome = {
            let mut dice = self.dice.lock().await;
            roll_recharge(&state, &self.rules, &mut *dice)?
        };

        if let Some(outcome) = &outcome {
            info!(
                target: "runtime::recharge",
                actor = %actor,
                item = %item,
                roll = outcome.roll.total,
                charged = outcome.charged,
                "Recharge rolled"
            );
            if let Some(patch) = &outcome.patch {
                self.repository.update_item(actor, patch).await?;
            }
        }
        Ok(outcome)
    }

    pub fn usage(&self) -> &UsageOrchestrator {
        &self.usage
    }

    pub fn awards(&self) -> &AwardService {
        &self.awards
    }

    pub fn repository(&self) -> &Arc<dyn EntityRepository> {
        &self.repository
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }
}

/// Builder for [`LedgerRuntime`] with flexible configuration.
pub struct LedgerRuntimeBuilder {
    config: RuntimeConfig,
    rules: Option<RulesConfig>,
    repository: Option<Arc<dyn EntityRepository>>,
    prompt: Option<Arc<dyn ConfirmationPrompt>>,
    notifier: Option<Arc<dyn NotificationSink>>,
    hooks: Option<UsageHookRegistry>,
}

impl LedgerRuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            rules: None,
            repository: None,
            prompt: None,
            notifier: None,
            hooks: None,
        }
    }

    /// Override runtime configuration
    #[must_use]
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Rules catalogue. Defaults to [`RulesConfig::default`].
    #[must_use]
    pub fn rules(mut self, rules: RulesConfig) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Load rules and the party from a content directory.
    ///
    /// The party seeds an [`InMemoryRepository`] unless a repository was
    /// already set.
    pub fn load_content(mut self, factory: &ContentFactory) -> LoadResult<Self> {
        self.rules = Some(factory.load_rules()?);
        if self.repository.is_none() {
            let party = factory.load_party()?;
            self.repository = Some(Arc::new(InMemoryRepository::with_actors(party)));
        }
        Ok(self)
    }

    /// Set required entity repository
    #[must_use]
    pub fn repository(mut self, repository: Arc<dyn EntityRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Set confirmation prompt (optional). Without one, uses commit with the
    /// derived configuration.
    #[must_use]
    pub fn prompt(mut self, prompt: impl ConfirmationPrompt + 'static) -> Self {
        self.prompt = Some(Arc::new(prompt));
        self
    }

    /// Set notification sink (optional). Defaults to [`TracingNotifier`].
    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Set custom usage hooks.
    ///
    /// If not provided, the default hooks (UsageSummary) are used. Use this to
    /// replace the default set entirely.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use std::sync::Arc;
    ///
    /// let runtime = LedgerRuntime::builder()
    ///     .repository(repo)
    ///     .with_hooks(UsageHookRegistry::new(vec![
    ///         Arc::new(CombatOnlyGuard) as Arc<dyn UsageHook>,
    ///     ]))
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn with_hooks(mut self, hooks: UsageHookRegistry) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Adds hooks to the default hook set.
    ///
    /// Note: If you've already called `with_hooks()`, calling this will discard
    /// those hooks and rebuild from the default set plus your new hooks.
    #[must_use]
    pub fn add_hooks(mut self, additional: Vec<Arc<dyn UsageHook>>) -> Self {
        let mut hooks: Vec<Arc<dyn UsageHook>> = vec![Arc::new(UsageSummaryHook)];
        hooks.extend(additional);
        self.hooks = Some(UsageHookRegistry::new(hooks));
        self
    }

    /// Build the runtime
    pub fn build(self) -> Result<LedgerRuntime> {
        let repository = self.repository.ok_or(RuntimeError::MissingRepository)?;
        let rules = Arc::new(self.rules.unwrap_or_default());
        let notifier = self
            .notifier
            .unwrap_or_else(|| Arc::new(TracingNotifier) as Arc<dyn NotificationSink>);
        let hooks = self.hooks.unwrap_or_default();
        let dice = Arc::new(Mutex::new(PcgDice::new(self.config.seed)));

        let usage = UsageOrchestrator::new(
            Arc::clone(&repository),
            Arc::clone(&rules),
            self.prompt,
            notifier,
            hooks,
            Arc::clone(&dice),
            self.config,
        );
        let awards = AwardService::new(Arc::clone(&repository), Arc::clone(&rules));

        Ok(LedgerRuntime {
            usage,
            awards,
            repository,
            rules,
            dice,
        })
    }
}
