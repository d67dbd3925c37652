//! Public runtime API surface.
//!
//! This module gathers the collaborator contracts and error types exposed to
//! consumers of the runtime crate so orchestration code can stay focused on the
//! use sequence itself.

pub mod errors;
pub mod notify;
pub mod prompt;

pub use errors::{Result, RuntimeError};
pub use notify::{NotificationSink, TracingNotifier, describe};
pub use prompt::{AutoConfirm, ConfirmationPrompt, PromptDecision, PromptRequest};
