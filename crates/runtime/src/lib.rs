//! Async orchestration for the resource ledger.
//!
//! This crate wires the pure `ledger-core` engine to storage, confirmation
//! prompts, and notifications. Consumers embed [`LedgerRuntime`] to use
//! activities, roll recharges, and hand out awards.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the facade and builder
//! - [`usage`] drives a single activity use from configuration to writes
//! - [`award`] applies currency and experience awards to stored actors
//! - [`api`] exposes the collaborator traits and error types
//! - [`hooks`] lets integrators observe and veto uses
//! - [`repository`] provides the storage contract and its adapters
pub mod api;
pub mod award;
pub mod hooks;
pub mod repository;
pub mod runtime;
pub mod usage;

pub use api::{
    AutoConfirm, ConfirmationPrompt, NotificationSink, PromptDecision, PromptRequest, Result,
    RuntimeError, TracingNotifier, describe,
};
pub use award::{AwardService, AwardTarget};
pub use hooks::{
    HookCriticality, HookDecision, HookError, UsageHook, UsageHookContext, UsageHookRegistry,
    UsageSummaryHook,
};
pub use repository::{
    EntityRepository, FileRepository, InMemoryRepository, RecordedWrite, RepositoryError,
};
pub use runtime::{LedgerRuntime, LedgerRuntimeBuilder, RuntimeConfig};
pub use usage::{CancelReason, UsageOrchestrator, UsageOutcome, UsageReport};
