//! Usage hook system for extending the use sequence.
//!
//! Hooks let integrators observe and steer a use at three points:
//!
//! - **Pre-use**: after the configuration is derived, before the dry run. May
//!   adjust the configuration or veto the use.
//! - **Consumption**: after the commit pass computed its updates, before any
//!   write. May edit the updates or veto the use.
//! - **Post-use**: after every write succeeded. Failures are logged and never
//!   undo the writes.
//!
//! Hooks are registered on the runtime builder and run in priority order
//! (lower first). A veto stops the remaining hooks of that stage.

mod context;
mod registry;
mod summary;

pub use context::UsageHookContext;
pub use registry::UsageHookRegistry;
pub use summary::UsageSummaryHook;

use ledger_core::{UsageConfiguration, UsageUpdates};
use thiserror::Error;

use crate::usage::UsageReport;

/// Whether the use should go on after a hook ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookDecision {
    Continue,
    Abort,
}

/// How loudly a post-use hook failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookCriticality {
    /// Logged at `error` level. The default.
    Important,

    /// Logged at `debug` level.
    Optional,
}

/// Failure raised by a post-use hook.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HookError {
    message: String,
}

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Extension point around a single activity use.
///
/// Every stage defaults to a no-op, so hooks implement only the stages they
/// care about.
pub trait UsageHook: Send + Sync {
    /// Returns a human-readable name for this hook (used in logging and debugging).
    fn name(&self) -> &'static str;

    /// Returns the execution priority. Lower values execute first.
    fn priority(&self) -> i32 {
        0
    }

    fn criticality(&self) -> HookCriticality {
        HookCriticality::Important
    }

    fn pre_use(
        &self,
        _ctx: &UsageHookContext<'_>,
        _config: &mut UsageConfiguration,
    ) -> HookDecision {
        HookDecision::Continue
    }

    fn consume(
        &self,
        _ctx: &UsageHookContext<'_>,
        _config: &UsageConfiguration,
        _updates: &mut UsageUpdates,
    ) -> HookDecision {
        HookDecision::Continue
    }

    fn post_use(
        &self,
        _ctx: &UsageHookContext<'_>,
        _report: &UsageReport,
    ) -> Result<(), HookError> {
        Ok(())
    }
}
