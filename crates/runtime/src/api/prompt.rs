//! Asynchronous abstraction for confirming a use before it is committed.
//!
//! Runtime users plug in [`ConfirmationPrompt`] implementations so a use can be
//! confirmed by a human dialog, a scripted fixture, or nothing at all.
use async_trait::async_trait;
use ledger_core::{ActivityState, ActorState, ConsumptionWarning, ItemState, UsageConfiguration};

/// Everything a prompt needs to show the pending use.
#[derive(Debug, Clone, Copy)]
pub struct PromptRequest<'a> {
    pub actor: &'a ActorState,
    pub item: &'a ItemState,
    pub activity: &'a ActivityState,
    /// Configuration derived for this use; the prompt may return an adjusted copy.
    pub config: &'a UsageConfiguration,
    /// Consumption failures found by the dry run.
    pub warnings: &'a [ConsumptionWarning],
}

/// What the invoker decided.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptDecision {
    Confirm(UsageConfiguration),
    Cancel,
}

/// Trait for confirming or adjusting a use before commit.
#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    /// Return the configuration to commit with, or cancel the use.
    async fn confirm(&self, request: PromptRequest<'_>) -> PromptDecision;
}

/// A prompt that accepts the derived configuration unchanged.
pub struct AutoConfirm;

#[async_trait]
impl ConfirmationPrompt for AutoConfirm {
    async fn confirm(&self, request: PromptRequest<'_>) -> PromptDecision {
        PromptDecision::Confirm(request.config.clone())
    }
}
