//! Hook registry for managing and executing usage hooks.

use std::sync::Arc;

use ledger_core::{UsageConfiguration, UsageUpdates};
use tracing::{debug, error, info};

use super::{HookCriticality, HookDecision, UsageHook, UsageHookContext};
use crate::usage::UsageReport;

/// Registry that runs usage hooks in priority order.
#[derive(Clone)]
pub struct UsageHookRegistry {
    hooks: Arc<[Arc<dyn UsageHook>]>,
}

impl UsageHookRegistry {
    /// Creates a registry; hooks are sorted by priority (lower values first).
    pub fn new(mut hooks: Vec<Arc<dyn UsageHook>>) -> Self {
        hooks.sort_by_key(|h| h.priority());
        Self {
            hooks: hooks.into(),
        }
    }

    /// Creates a registry with the default set of hooks.
    ///
    /// Default hooks include:
    /// - UsageSummaryHook: logs a summary of every completed use
    pub fn default_hooks() -> Self {
        use super::UsageSummaryHook;

        Self::new(vec![Arc::new(UsageSummaryHook) as Arc<dyn UsageHook>])
    }

    /// Run pre-use hooks. Returns the name of the vetoing hook, if any.
    pub fn pre_use(
        &self,
        ctx: &UsageHookContext<'_>,
        config: &mut UsageConfiguration,
    ) -> Option<&'static str> {
        self.first_abort(|hook| hook.pre_use(ctx, config), "pre-use")
    }

    /// Run consumption hooks. Returns the name of the vetoing hook, if any.
    pub fn consume(
        &self,
        ctx: &UsageHookContext<'_>,
        config: &UsageConfiguration,
        updates: &mut UsageUpdates,
    ) -> Option<&'static str> {
        self.first_abort(|hook| hook.consume(ctx, config, updates), "consumption")
    }

    /// Run post-use hooks. Failures are logged per criticality and never
    /// propagate.
    pub fn post_use(&self, ctx: &UsageHookContext<'_>, report: &UsageReport) {
        for hook in self.hooks.iter() {
            let Err(err) = hook.post_use(ctx, report) else {
                continue;
            };
            match hook.criticality() {
                HookCriticality::Important => error!(
                    target: "runtime::hooks",
                    hook = hook.name(),
                    criticality = "important",
                    error = %err,
                    "Post-use hook failed, continuing"
                ),
                HookCriticality::Optional => debug!(
                    target: "runtime::hooks",
                    hook = hook.name(),
                    criticality = "optional",
                    error = %err,
                    "Optional post-use hook failed"
                ),
            }
        }
    }

    fn first_abort(
        &self,
        mut run: impl FnMut(&dyn UsageHook) -> HookDecision,
        stage: &'static str,
    ) -> Option<&'static str> {
        for hook in self.hooks.iter() {
            if run(hook.as_ref()) == HookDecision::Abort {
                info!(
                    target: "runtime::hooks",
                    hook = hook.name(),
                    stage,
                    "Hook vetoed the use"
                );
                return Some(hook.name());
            }
        }
        None
    }

    /// Returns the number of hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns true if no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Returns an iterator over hook names and priorities (for debugging).
    pub fn hooks(&self) -> impl Iterator<Item = (&'static str, i32)> + '_ {
        self.hooks.iter().map(|h| (h.name(), h.priority()))
    }
}

impl Default for UsageHookRegistry {
    fn default() -> Self {
        Self::default_hooks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::{ActivityState, ActorKind, ActorState, ItemKind, ItemState, RulesConfig};
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        priority: i32,
        veto: bool,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl UsageHook for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn pre_use(
            &self,
            _ctx: &UsageHookContext<'_>,
            config: &mut UsageConfiguration,
        ) -> HookDecision {
            self.log.lock().unwrap().push(self.name);
            config.create_template = true;
            if self.veto {
                HookDecision::Abort
            } else {
                HookDecision::Continue
            }
        }
    }

    #[test]
    fn hooks_run_by_priority_until_a_veto() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let hook = |name, priority, veto| {
            Arc::new(Recorder {
                name,
                priority,
                veto,
                log: Arc::clone(&log),
            }) as Arc<dyn UsageHook>
        };
        let registry = UsageHookRegistry::new(vec![
            hook("late", 10, false),
            hook("veto", 0, true),
            hook("early", -5, false),
        ]);

        let rules = RulesConfig::default();
        let actor = ActorState::new("a", "A", ActorKind::Character);
        let item = ItemState::new("i", "I", ItemKind::Equipment);
        let activity = ActivityState::new("x", "X");
        let ctx = UsageHookContext {
            rules: &rules,
            actor: &actor,
            item: &item,
            activity: &activity,
        };
        let mut config = UsageConfiguration::default();

        assert_eq!(registry.pre_use(&ctx, &mut config), Some("veto"));
        assert_eq!(*log.lock().unwrap(), vec!["early", "veto"]);
        assert!(config.create_template);
        assert_eq!(
            registry.hooks().map(|(name, _)| name).collect::<Vec<_>>(),
            vec!["early", "veto", "late"]
        );
    }
}
