//! Execution context provided to usage hooks.

use ledger_core::{ActivityState, ActorState, ItemState, RulesConfig};

/// Read-only view of the use a hook is running for.
///
/// The actor snapshot is the one read at the start of the use; post-use hooks
/// see the state before the writes were applied.
#[derive(Debug, Clone, Copy)]
pub struct UsageHookContext<'a> {
    pub rules: &'a RulesConfig,
    pub actor: &'a ActorState,
    pub item: &'a ItemState,
    pub activity: &'a ActivityState,
}
